//! Structured spark-submit parameters.

use serde::{Deserialize, Serialize};

/// spark-submit fields as declared in a job template.
///
/// Missing keys deserialize as empty values; [`crate::build_command`] is
/// where emptiness is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkSubmitParameters {
    /// Cluster manager URL (`--master`).
    pub master: String,
    /// `client` or `cluster` (`--deploy-mode`).
    pub deploy_mode: String,
    /// Main class (`--class`).
    pub class: String,
    /// Ordered `key=value` directives, each emitted as `--conf`.
    pub conf: Vec<String>,
    /// Comma-separated maven coordinates (`--packages`).
    pub packages: String,
}
