//! Remote service boundary
//!
//! The orchestrator only sees these traits:
//! - [`JobTemplateService`]: create and describe job templates
//! - [`ParameterStore`]: write parameter store entries
//!
//! Transport, credentials and retries belong to the implementations
//! ([`aws`] for production, [`crate::mock`] for tests). Every call takes the
//! run [`Deadline`].

pub mod aws;

use std::fmt;

use emrc_protocol::{CreateJobTemplateRequest, JobTemplateDetails, PutParameterRequest};

use crate::timeout::{Deadline, DeadlineExceeded};

/// Remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateJobTemplate,
    DescribeJobTemplate,
    PutParameter,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateJobTemplate => "CreateJobTemplate",
            Operation::DescribeJobTemplate => "DescribeJobTemplate",
            Operation::PutParameter => "PutParameter",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{operation} failed: {message}")]
    Service {
        operation: Operation,
        message: String,
    },

    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    #[error("{operation} response is missing {field}")]
    EmptyResponse {
        operation: Operation,
        field: &'static str,
    },

    #[error("invalid {operation} request: {message}")]
    InvalidRequest {
        operation: Operation,
        message: String,
    },

    #[error("client initialization failed: {0}")]
    Init(String),
}

impl ClientError {
    pub fn service(operation: Operation, message: impl Into<String>) -> Self {
        ClientError::Service {
            operation,
            message: message.into(),
        }
    }

    /// True when the run deadline expired during the call
    pub fn is_deadline(&self) -> bool {
        matches!(self, ClientError::Deadline(_))
    }
}

/// Job template provisioning service
pub trait JobTemplateService: Send + Sync {
    /// Create a template and return its identifier
    fn create_job_template(
        &self,
        request: &CreateJobTemplateRequest,
        deadline: &Deadline,
    ) -> Result<String, ClientError>;

    /// Fetch a template by identifier
    fn describe_job_template(
        &self,
        id: &str,
        deadline: &Deadline,
    ) -> Result<JobTemplateDetails, ClientError>;
}

/// Shared configuration store
pub trait ParameterStore: Send + Sync {
    fn put_parameter(
        &self,
        request: &PutParameterRequest,
        deadline: &Deadline,
    ) -> Result<(), ClientError>;
}
