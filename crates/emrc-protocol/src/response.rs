//! DescribeJobTemplate response payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::request::JobTemplateData;

/// A job template as reported back by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateDetails {
    /// Identifier the template was looked up by.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Template body, when the service returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_template_data: Option<JobTemplateData>,
}

impl JobTemplateDetails {
    /// Details carrying only the identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            arn: None,
            created_at: None,
            created_by: None,
            tags: BTreeMap::new(),
            job_template_data: None,
        }
    }
}
