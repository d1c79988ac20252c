//! Submit-command synthesis seam

use spark_submit::{SparkSubmitParameters, SubmitCommandError};

/// Flattens spark-submit fields into the driver argument string
pub trait SparkSubmitCommandBuilder {
    fn build_command(&self, params: &SparkSubmitParameters) -> Result<String, SubmitCommandError>;
}

/// Production synthesizer, backed by [`spark_submit::build_command`]
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSparkSubmitCommandBuilder;

impl SparkSubmitCommandBuilder for RealSparkSubmitCommandBuilder {
    fn build_command(&self, params: &SparkSubmitParameters) -> Result<String, SubmitCommandError> {
        spark_submit::build_command(params)
    }
}
