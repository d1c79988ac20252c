//! Run summary
//!
//! Records what a batch did: where its input came from, which templates were
//! provisioned, the identifiers they received and the entries written.

mod outcome;
mod run_summary;

pub use outcome::TemplateOutcome;
pub use run_summary::{RunStatus, RunSummary, RUN_SUMMARY_SCHEMA_ID, RUN_SUMMARY_SCHEMA_VERSION};
