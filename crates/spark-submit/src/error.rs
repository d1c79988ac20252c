//! Validation errors for spark-submit parameters.

use thiserror::Error;

/// Reason a spark-submit argument string could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitCommandError {
    /// A required field is empty. Carries the declarative field name.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// One of the conf directives is an empty string.
    #[error("conf contains an empty value")]
    EmptyConf,
}
