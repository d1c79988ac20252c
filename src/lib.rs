//! EMRC Template Lane - provision EMR on EKS job templates
//!
//! This crate reads declarative job template descriptions, creates each
//! template in EMR on EKS, verifies it by fetching it back, and publishes the
//! new template id into SSM Parameter Store entries for downstream consumers.

pub mod client;
pub mod config;
pub mod mock;
pub mod pipeline;
pub mod publish;
pub mod request;
pub mod summary;
pub mod template;
pub mod timeout;

pub use client::{ClientError, JobTemplateService, Operation, ParameterStore};
pub use config::{ConfigError, EntryAssignment, Settings};
pub use pipeline::{BatchOutcome, Pipeline, PipelineError, Stage, StageError, TemplateState};
pub use publish::{IdentifierPublisher, PublishError};
pub use request::{prepare_request, RequestError};
pub use summary::{RunSummary, TemplateOutcome};
pub use template::{JobTemplateConfig, LoadedTemplates, TemplateFile};
pub use timeout::{Deadline, DeadlineExceeded};
