//! In-process service doubles
//!
//! Deterministic stand-ins for the job template service and the parameter
//! store. Both record every call, honor the run deadline, and accept
//! per-operation failure injection; the store also fails on named entries.

mod failure;
mod service;
mod store;

pub use failure::{FailureConfig, FailureInjector};
pub use service::MockJobTemplateService;
pub use store::MockParameterStore;
