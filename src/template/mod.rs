//! Declarative job template input
//!
//! Loads the YAML document listing the job templates to provision. The
//! document is parsed as-is: emptiness and parameter types are validated
//! later, when a request is built from each template.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub use spark_submit::SparkSubmitParameters;

/// Errors loading the declarative input
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse job templates: {0}")]
    ParseStr(#[from] serde_yaml::Error),
}

/// A declared template parameter
///
/// `parameter_type` is kept as the raw symbolic name; mapping it onto the
/// service data type happens in [`crate::request::parameters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParameterConfiguration {
    /// Default value, if any
    #[serde(default)]
    pub default_value: Option<String>,

    /// `STRING` or `NUMBER`
    #[serde(rename = "type", default)]
    pub parameter_type: String,
}

/// Application configuration block (classification + flat properties)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfiguration {
    pub classification: String,
    pub properties: BTreeMap<String, String>,
}

/// One job template description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobTemplateConfig {
    /// Template name; also becomes the `Name` tag and log stream prefix
    pub name: String,

    /// IAM role the job runs as
    pub execution_role_arn: String,

    /// EMR release label (e.g. `emr-6.10.0-latest`)
    pub release_label: String,

    /// Spark entry point
    pub entry_point: String,

    pub entry_point_arguments: Vec<String>,

    /// Free-form tags; `None` when the document declares none
    pub tags: Option<BTreeMap<String, String>>,

    /// spark-submit fields (the document key is spelled `pararmeters`)
    #[serde(rename = "spark_submit_pararmeters", alias = "spark_submit_parameters")]
    pub spark_submit_parameters: SparkSubmitParameters,

    /// `ENABLED` or `DISABLED`
    pub persistent_app_ui: String,

    /// CloudWatch log group for job output
    pub log_group_name: String,

    pub parameter_configuration: BTreeMap<String, TemplateParameterConfiguration>,

    pub application_configurations: Vec<ApplicationConfiguration>,
}

/// Top-level document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    #[serde(default)]
    pub job_templates: Vec<JobTemplateConfig>,
}

impl TemplateFile {
    /// Load and parse the document at `path`
    pub fn from_file(path: &Path) -> Result<LoadedTemplates, TemplateError> {
        let bytes = fs::read(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let file: TemplateFile =
            serde_yaml::from_slice(&bytes).map_err(|source| TemplateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(LoadedTemplates {
            path: path.to_path_buf(),
            digest,
            file,
        })
    }
}

impl FromStr for TemplateFile {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_yaml::from_str(s)?)
    }
}

/// A parsed document together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedTemplates {
    /// Path the document was read from
    pub path: PathBuf,

    /// SHA-256 of the raw file bytes
    pub digest: String,

    pub file: TemplateFile,
}

impl LoadedTemplates {
    /// Number of templates in the document
    pub fn len(&self) -> usize {
        self.file.job_templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.job_templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"
job_templates:
  - name: nightly-etl
    execution_role_arn: arn:aws:iam::123456789012:role/emr-job
    release_label: emr-6.10.0-latest
    entry_point: s3://bucket/jobs/etl.py
    entry_point_arguments: ["--date", "${Date}"]
    tags:
      Environment: test
    spark_submit_pararmeters:
      master: yarn
      deploy_mode: cluster
      class: org.example.Etl
      conf:
        - spark.executor.memory=2g
      packages: org.apache.spark:spark-sql_2.12:3.0.1
    persistent_app_ui: ENABLED
    log_group_name: /emr/jobs
    parameter_configuration:
      Date:
        type: STRING
        default_value: "2024-01-01"
      Executors:
        type: NUMBER
    application_configurations:
      - classification: spark-defaults
        properties:
          spark.dynamicAllocation.enabled: "false"
"#;

    #[test]
    fn test_parse_full_template() {
        let file = DOC.parse::<TemplateFile>().unwrap();
        assert_eq!(file.job_templates.len(), 1);

        let t = &file.job_templates[0];
        assert_eq!(t.name, "nightly-etl");
        assert_eq!(t.entry_point_arguments, vec!["--date", "${Date}"]);
        assert_eq!(t.tags.as_ref().unwrap()["Environment"], "test");
        assert_eq!(t.spark_submit_parameters.deploy_mode, "cluster");
        assert_eq!(t.spark_submit_parameters.conf.len(), 1);
        assert_eq!(t.parameter_configuration["Date"].parameter_type, "STRING");
        assert_eq!(
            t.parameter_configuration["Date"].default_value.as_deref(),
            Some("2024-01-01")
        );
        assert_eq!(t.parameter_configuration["Executors"].default_value, None);
        assert_eq!(t.application_configurations[0].classification, "spark-defaults");
    }

    #[test]
    fn test_absent_tags_stay_absent() {
        let file = "job_templates:\n  - name: bare\n".parse::<TemplateFile>().unwrap();
        let t = &file.job_templates[0];
        assert!(t.tags.is_none());
        assert!(t.spark_submit_parameters.master.is_empty());
        assert!(t.parameter_configuration.is_empty());
    }

    #[test]
    fn test_correctly_spelled_key_accepted() {
        let doc = "job_templates:\n  - name: a\n    spark_submit_parameters:\n      master: yarn\n";
        let file = doc.parse::<TemplateFile>().unwrap();
        assert_eq!(file.job_templates[0].spark_submit_parameters.master, "yarn");
    }

    #[test]
    fn test_unknown_type_survives_parsing() {
        let doc = "job_templates:\n  - name: a\n    parameter_configuration:\n      X:\n        type: BOOLEAN\n";
        let file = doc.parse::<TemplateFile>().unwrap();
        assert_eq!(
            file.job_templates[0].parameter_configuration["X"].parameter_type,
            "BOOLEAN"
        );
    }

    #[test]
    fn test_malformed_document_fails_to_parse() {
        let err = "job_templates: [".parse::<TemplateFile>().unwrap_err();
        assert!(matches!(err, TemplateError::ParseStr(_)));
        assert!(err.to_string().starts_with("failed to parse job templates: "));
    }

    #[test]
    fn test_from_file_records_digest() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(DOC.as_bytes()).unwrap();

        let loaded = TemplateFile::from_file(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.digest.len(), 64);
        assert_eq!(loaded.path, tmp.path());
    }

    #[test]
    fn test_from_file_missing_names_path() {
        let err = TemplateFile::from_file(Path::new("/nonexistent/templates.yaml")).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/templates.yaml"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"job_templates: [unclosed").unwrap();
        let err = TemplateFile::from_file(tmp.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
    }
}
