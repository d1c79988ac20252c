//! CreateJobTemplate request payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parameter::TemplateParameterConfiguration;

/// Fully composed request for creating a job template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobTemplateRequest {
    /// Template name.
    pub name: String,
    /// Idempotency token; retried submissions carrying it are not duplicated.
    pub client_token: String,
    /// The job template body.
    pub job_template_data: JobTemplateData,
    /// Resource tags for the template itself.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Body of a job template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateData {
    pub execution_role_arn: String,
    pub release_label: String,
    pub job_driver: JobDriver,
    pub configuration_overrides: ParametricConfigurationOverrides,
    #[serde(default)]
    pub parameter_configuration: BTreeMap<String, TemplateParameterConfiguration>,
    /// Tags applied to every job run started from this template.
    #[serde(default)]
    pub job_tags: BTreeMap<String, String>,
}

/// Job driver; only spark-submit is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDriver {
    pub spark_submit_job_driver: SparkSubmitJobDriver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkSubmitJobDriver {
    pub entry_point: String,
    #[serde(default)]
    pub entry_point_arguments: Vec<String>,
    /// Flattened spark-submit argument string.
    pub spark_submit_parameters: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametricConfigurationOverrides {
    #[serde(default)]
    pub application_configuration: Vec<Configuration>,
    pub monitoring_configuration: ParametricMonitoringConfiguration,
}

/// Application configuration block (classification plus flat properties).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub classification: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametricMonitoringConfiguration {
    /// `ENABLED` or `DISABLED`, passed through as declared.
    #[serde(rename = "persistentAppUI")]
    pub persistent_app_ui: String,
    pub cloud_watch_monitoring_configuration: ParametricCloudWatchMonitoringConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametricCloudWatchMonitoringConfiguration {
    pub log_group_name: String,
    pub log_stream_name_prefix: String,
}

impl CreateJobTemplateRequest {
    /// The spark-submit argument string carried by this request.
    pub fn spark_submit_parameters(&self) -> &str {
        &self
            .job_template_data
            .job_driver
            .spark_submit_job_driver
            .spark_submit_parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::TemplateParameterDataType;

    fn sample() -> CreateJobTemplateRequest {
        let tags: BTreeMap<String, String> =
            [("Name".to_string(), "nightly".to_string())].into_iter().collect();
        CreateJobTemplateRequest {
            name: "nightly".to_string(),
            client_token: "4242".to_string(),
            job_template_data: JobTemplateData {
                execution_role_arn: "arn:aws:iam::123456789012:role/emr".to_string(),
                release_label: "emr-6.10.0-latest".to_string(),
                job_driver: JobDriver {
                    spark_submit_job_driver: SparkSubmitJobDriver {
                        entry_point: "s3://bucket/job.py".to_string(),
                        entry_point_arguments: vec![],
                        spark_submit_parameters: "--master yarn".to_string(),
                    },
                },
                configuration_overrides: ParametricConfigurationOverrides {
                    application_configuration: vec![],
                    monitoring_configuration: ParametricMonitoringConfiguration {
                        persistent_app_ui: "ENABLED".to_string(),
                        cloud_watch_monitoring_configuration:
                            ParametricCloudWatchMonitoringConfiguration {
                                log_group_name: "/emr/jobs".to_string(),
                                log_stream_name_prefix: "nightly".to_string(),
                            },
                    },
                },
                parameter_configuration: [(
                    "date".to_string(),
                    TemplateParameterConfiguration {
                        data_type: TemplateParameterDataType::String,
                        default_value: None,
                    },
                )]
                .into_iter()
                .collect(),
                job_tags: tags.clone(),
            },
            tags,
        }
    }

    #[test]
    fn test_request_uses_service_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let data = &json["jobTemplateData"];

        assert_eq!(json["clientToken"], "4242");
        assert_eq!(data["executionRoleArn"], "arn:aws:iam::123456789012:role/emr");
        assert_eq!(
            data["jobDriver"]["sparkSubmitJobDriver"]["sparkSubmitParameters"],
            "--master yarn"
        );
        let monitoring = &data["configurationOverrides"]["monitoringConfiguration"];
        assert_eq!(monitoring["persistentAppUI"], "ENABLED");
        assert_eq!(
            monitoring["cloudWatchMonitoringConfiguration"]["logStreamNamePrefix"],
            "nightly"
        );
        assert_eq!(data["parameterConfiguration"]["date"]["type"], "STRING");
        assert_eq!(data["jobTags"]["Name"], "nightly");
    }

    #[test]
    fn test_spark_submit_parameters_accessor() {
        assert_eq!(sample().spark_submit_parameters(), "--master yarn");
    }
}
