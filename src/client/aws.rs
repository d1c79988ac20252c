//! AWS SDK clients
//!
//! Adapts the async `aws-sdk-emrcontainers` and `aws-sdk-ssm` clients to the
//! synchronous service traits. Both clients share one current-thread tokio
//! runtime, and every call is bounded by the remaining run deadline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_emrcontainers::types as emr;
use emrc_protocol::{
    Configuration, CreateJobTemplateRequest, JobDriver, JobTemplateData, JobTemplateDetails,
    ParameterType, ParametricCloudWatchMonitoringConfiguration, ParametricConfigurationOverrides,
    ParametricMonitoringConfiguration, PutParameterRequest, SparkSubmitJobDriver,
    TemplateParameterConfiguration, TemplateParameterDataType,
};
use tokio::runtime::Runtime;
use tracing::debug;

use super::{ClientError, JobTemplateService, Operation, ParameterStore};
use crate::timeout::Deadline;

/// Production clients for one region
pub struct AwsClients {
    pub job_templates: EmrContainersClient,
    pub parameters: SsmParameterStore,
}

impl AwsClients {
    /// Load shared SDK configuration for `region` and build both clients
    ///
    /// Credentials come from the default provider chain.
    pub fn connect(region: &str, deadline: &Deadline) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;
        let runtime = Arc::new(runtime);

        let loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load();
        let shared = runtime
            .block_on(async { tokio::time::timeout(deadline.remaining(), loader).await })
            .map_err(|_| ClientError::from(deadline.exceeded("LoadAwsConfig")))?;

        debug!(region, "aws clients initialized");

        Ok(Self {
            job_templates: EmrContainersClient {
                client: aws_sdk_emrcontainers::Client::new(&shared),
                runtime: Arc::clone(&runtime),
            },
            parameters: SsmParameterStore {
                client: aws_sdk_ssm::Client::new(&shared),
                runtime,
            },
        })
    }
}

/// Drive `call` to completion within the remaining deadline
fn block_on_with_deadline<T, F>(
    runtime: &Runtime,
    deadline: &Deadline,
    operation: Operation,
    call: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    deadline.check(operation.as_str())?;
    runtime
        .block_on(async { tokio::time::timeout(deadline.remaining(), call).await })
        .map_err(|_| ClientError::from(deadline.exceeded(operation.as_str())))?
}

fn invalid(operation: Operation) -> impl Fn(aws_sdk_emrcontainers::error::BuildError) -> ClientError {
    move |e| ClientError::InvalidRequest {
        operation,
        message: e.to_string(),
    }
}

fn service_error(operation: Operation, err: impl fmt::Display) -> ClientError {
    ClientError::service(operation, err.to_string())
}

fn to_hash_map(map: &BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn to_btree_map(map: Option<&HashMap<String, String>>) -> BTreeMap<String, String> {
    map.map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn owned(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_default()
}

/// EMR on EKS ("emr-containers") job template client
pub struct EmrContainersClient {
    client: aws_sdk_emrcontainers::Client,
    runtime: Arc<Runtime>,
}

impl EmrContainersClient {
    fn template_data(data: &JobTemplateData) -> Result<emr::JobTemplateData, ClientError> {
        let op = Operation::CreateJobTemplate;
        let driver = &data.job_driver.spark_submit_job_driver;
        let spark_submit = emr::SparkSubmitJobDriver::builder()
            .entry_point(&driver.entry_point)
            .set_entry_point_arguments(Some(driver.entry_point_arguments.clone()))
            .spark_submit_parameters(&driver.spark_submit_parameters)
            .build()
            .map_err(invalid(op))?;

        let overrides = &data.configuration_overrides;
        let application_configuration = overrides
            .application_configuration
            .iter()
            .map(|c| {
                emr::Configuration::builder()
                    .classification(&c.classification)
                    .set_properties(Some(to_hash_map(&c.properties)))
                    .build()
                    .map_err(invalid(op))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let monitoring = &overrides.monitoring_configuration;
        let cloud_watch = &monitoring.cloud_watch_monitoring_configuration;
        let monitoring_configuration = emr::ParametricMonitoringConfiguration::builder()
            .persistent_app_ui(&monitoring.persistent_app_ui)
            .cloud_watch_monitoring_configuration(
                emr::ParametricCloudWatchMonitoringConfiguration::builder()
                    .log_group_name(&cloud_watch.log_group_name)
                    .log_stream_name_prefix(&cloud_watch.log_stream_name_prefix)
                    .build(),
            )
            .build();

        let parameter_configuration = data
            .parameter_configuration
            .iter()
            .map(|(name, param)| {
                let data_type = match param.data_type {
                    TemplateParameterDataType::String => emr::TemplateParameterDataType::String,
                    TemplateParameterDataType::Number => emr::TemplateParameterDataType::Number,
                };
                let config = emr::TemplateParameterConfiguration::builder()
                    .r#type(data_type)
                    .set_default_value(param.default_value.clone())
                    .build();
                (name.clone(), config)
            })
            .collect::<HashMap<_, _>>();

        emr::JobTemplateData::builder()
            .execution_role_arn(&data.execution_role_arn)
            .release_label(&data.release_label)
            .job_driver(
                emr::JobDriver::builder()
                    .spark_submit_job_driver(spark_submit)
                    .build(),
            )
            .configuration_overrides(
                emr::ParametricConfigurationOverrides::builder()
                    .set_application_configuration(Some(application_configuration))
                    .monitoring_configuration(monitoring_configuration)
                    .build(),
            )
            .set_parameter_configuration(Some(parameter_configuration))
            .set_job_tags(Some(to_hash_map(&data.job_tags)))
            .build()
            .map_err(invalid(op))
    }

    /// Map a described template body back onto the protocol shape
    fn describe_data(data: &emr::JobTemplateData) -> Result<JobTemplateData, ClientError> {
        let op = Operation::DescribeJobTemplate;
        let driver = data
            .job_driver()
            .and_then(|d| d.spark_submit_job_driver())
            .ok_or(ClientError::EmptyResponse {
                operation: op,
                field: "jobDriver.sparkSubmitJobDriver",
            })?;

        let overrides = data.configuration_overrides();
        let application_configuration = overrides
            .map(|o| {
                o.application_configuration()
                    .iter()
                    .map(|c| Configuration {
                        classification: c.classification().to_string(),
                        properties: to_btree_map(c.properties()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let monitoring = overrides.and_then(|o| o.monitoring_configuration());
        let cloud_watch = monitoring.and_then(|m| m.cloud_watch_monitoring_configuration());

        let mut parameter_configuration = BTreeMap::new();
        for (name, param) in data.parameter_configuration().into_iter().flatten() {
            let declared = param.r#type().ok_or(ClientError::EmptyResponse {
                operation: op,
                field: "parameterConfiguration.type",
            })?;
            let data_type: TemplateParameterDataType = declared
                .as_str()
                .parse()
                .map_err(|e| service_error(op, e))?;
            parameter_configuration.insert(
                name.clone(),
                TemplateParameterConfiguration {
                    data_type,
                    default_value: param.default_value().map(str::to_string),
                },
            );
        }

        Ok(JobTemplateData {
            execution_role_arn: data.execution_role_arn().to_string(),
            release_label: data.release_label().to_string(),
            job_driver: JobDriver {
                spark_submit_job_driver: SparkSubmitJobDriver {
                    entry_point: driver.entry_point().to_string(),
                    entry_point_arguments: driver.entry_point_arguments().to_vec(),
                    spark_submit_parameters: owned(driver.spark_submit_parameters()),
                },
            },
            configuration_overrides: ParametricConfigurationOverrides {
                application_configuration,
                monitoring_configuration: ParametricMonitoringConfiguration {
                    persistent_app_ui: owned(monitoring.and_then(|m| m.persistent_app_ui())),
                    cloud_watch_monitoring_configuration:
                        ParametricCloudWatchMonitoringConfiguration {
                            log_group_name: owned(cloud_watch.and_then(|c| c.log_group_name())),
                            log_stream_name_prefix: owned(
                                cloud_watch.and_then(|c| c.log_stream_name_prefix()),
                            ),
                        },
                },
            },
            parameter_configuration,
            job_tags: to_btree_map(data.job_tags()),
        })
    }

    fn details(id: &str, template: &emr::JobTemplate) -> Result<JobTemplateDetails, ClientError> {
        let mut details = JobTemplateDetails::new(id);
        details.name = template.name().map(str::to_string);
        details.arn = template.arn().map(str::to_string);
        details.created_by = template.created_by().map(str::to_string);
        details.created_at = template
            .created_at()
            .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos()));
        details.tags = to_btree_map(template.tags());
        details.job_template_data = template
            .job_template_data()
            .map(Self::describe_data)
            .transpose()?;
        Ok(details)
    }
}

impl JobTemplateService for EmrContainersClient {
    fn create_job_template(
        &self,
        request: &CreateJobTemplateRequest,
        deadline: &Deadline,
    ) -> Result<String, ClientError> {
        let op = Operation::CreateJobTemplate;
        let data = Self::template_data(&request.job_template_data)?;
        let call = self
            .client
            .create_job_template()
            .name(&request.name)
            .client_token(&request.client_token)
            .job_template_data(data)
            .set_tags(Some(to_hash_map(&request.tags)))
            .send();

        let output = block_on_with_deadline(&self.runtime, deadline, op, async move {
            call.await.map_err(|e| {
                service_error(op, aws_sdk_emrcontainers::error::DisplayErrorContext(&e))
            })
        })?;

        output
            .id()
            .map(str::to_string)
            .ok_or(ClientError::EmptyResponse {
                operation: op,
                field: "id",
            })
    }

    fn describe_job_template(
        &self,
        id: &str,
        deadline: &Deadline,
    ) -> Result<JobTemplateDetails, ClientError> {
        let op = Operation::DescribeJobTemplate;
        let call = self.client.describe_job_template().id(id).send();

        let output = block_on_with_deadline(&self.runtime, deadline, op, async move {
            call.await.map_err(|e| {
                service_error(op, aws_sdk_emrcontainers::error::DisplayErrorContext(&e))
            })
        })?;

        let template = output.job_template().ok_or(ClientError::EmptyResponse {
            operation: op,
            field: "jobTemplate",
        })?;
        Self::details(id, template)
    }
}

/// SSM Parameter Store client
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
    runtime: Arc<Runtime>,
}

impl ParameterStore for SsmParameterStore {
    fn put_parameter(
        &self,
        request: &PutParameterRequest,
        deadline: &Deadline,
    ) -> Result<(), ClientError> {
        let op = Operation::PutParameter;
        let parameter_type = match request.parameter_type {
            ParameterType::String => aws_sdk_ssm::types::ParameterType::String,
        };
        let call = self
            .client
            .put_parameter()
            .name(&request.name)
            .value(&request.value)
            .r#type(parameter_type)
            .overwrite(request.overwrite)
            .send();

        let output = block_on_with_deadline(&self.runtime, deadline, op, async move {
            call.await
                .map_err(|e| service_error(op, aws_sdk_ssm::error::DisplayErrorContext(&e)))
        })?;

        debug!(entry = %request.name, version = output.version(), "parameter written");
        Ok(())
    }
}
