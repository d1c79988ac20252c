//! Job template request builder
//!
//! Composes a [`CreateJobTemplateRequest`] from one declared template:
//! 1. force the `Name` tag to the template name
//! 2. normalize parameter types
//! 3. synthesize the spark-submit argument string
//! 4. translate application configuration blocks
//! 5. draw an idempotency token
//!
//! Each step depends on the previous one; the first failure aborts and no
//! request is returned.

pub mod parameters;
pub mod submit;
pub mod token;

use std::collections::BTreeMap;

use emrc_protocol::{
    Configuration, CreateJobTemplateRequest, JobDriver, JobTemplateData, ParseDataTypeError,
    ParametricCloudWatchMonitoringConfiguration, ParametricConfigurationOverrides,
    ParametricMonitoringConfiguration, SparkSubmitJobDriver, CLIENT_TOKEN_BOUND, NAME_TAG,
};
use spark_submit::SubmitCommandError;
use thiserror::Error;

use crate::template::JobTemplateConfig;

pub use parameters::{ParameterConfigurator, RealParameterConfigurator};
pub use submit::{RealSparkSubmitCommandBuilder, SparkSubmitCommandBuilder};
pub use token::TokenSource;

/// Request build errors
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("parameter configuration block failed: {0}")]
    Parameters(#[source] ParseDataTypeError),

    #[error("sparkSubmitParameters configuration block failed: {0}")]
    SparkSubmit(#[source] SubmitCommandError),
}

/// Build the create request for `config`
///
/// Mutates `config.tags` in place: the mapping is created if absent and its
/// `Name` entry is overwritten with the template name.
pub fn prepare_request(
    config: &mut JobTemplateConfig,
    parameters: &dyn ParameterConfigurator,
    submit: &dyn SparkSubmitCommandBuilder,
    next_token: &mut dyn FnMut(u32) -> u32,
) -> Result<CreateJobTemplateRequest, RequestError> {
    let tags = config.tags.get_or_insert_with(BTreeMap::new);
    tags.insert(NAME_TAG.to_string(), config.name.clone());
    let tags = tags.clone();

    let parameter_configuration = parameters
        .configure(&config.parameter_configuration)
        .map_err(RequestError::Parameters)?;

    let spark_submit_parameters = submit
        .build_command(&config.spark_submit_parameters)
        .map_err(RequestError::SparkSubmit)?;

    let application_configuration = config
        .application_configurations
        .iter()
        .map(|c| Configuration {
            classification: c.classification.clone(),
            properties: c.properties.clone(),
        })
        .collect();

    let client_token = next_token(CLIENT_TOKEN_BOUND).to_string();

    Ok(CreateJobTemplateRequest {
        name: config.name.clone(),
        client_token,
        job_template_data: JobTemplateData {
            execution_role_arn: config.execution_role_arn.clone(),
            release_label: config.release_label.clone(),
            job_driver: JobDriver {
                spark_submit_job_driver: SparkSubmitJobDriver {
                    entry_point: config.entry_point.clone(),
                    entry_point_arguments: config.entry_point_arguments.clone(),
                    spark_submit_parameters,
                },
            },
            configuration_overrides: ParametricConfigurationOverrides {
                application_configuration,
                monitoring_configuration: ParametricMonitoringConfiguration {
                    persistent_app_ui: config.persistent_app_ui.clone(),
                    cloud_watch_monitoring_configuration:
                        ParametricCloudWatchMonitoringConfiguration {
                            log_group_name: config.log_group_name.clone(),
                            log_stream_name_prefix: config.name.clone(),
                        },
                },
            },
            parameter_configuration,
            job_tags: tags.clone(),
        },
        tags,
    })
}
