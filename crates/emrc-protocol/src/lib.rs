//! EMR on EKS Protocol Types
//!
//! Defines the payloads exchanged with the job template service and the
//! parameter store. Field names follow the services' JSON shape so a request
//! can be logged exactly as it is submitted.

pub mod parameter;
pub mod request;
pub mod response;
pub mod store;

pub use parameter::{ParseDataTypeError, TemplateParameterConfiguration, TemplateParameterDataType};
pub use request::{
    Configuration, CreateJobTemplateRequest, JobDriver, JobTemplateData,
    ParametricCloudWatchMonitoringConfiguration, ParametricConfigurationOverrides,
    ParametricMonitoringConfiguration, SparkSubmitJobDriver,
};
pub use response::JobTemplateDetails;
pub use store::{ParameterType, PutParameterRequest};

/// Exclusive upper bound for generated client tokens.
pub const CLIENT_TOKEN_BOUND: u32 = 100_000;

/// Tag key that always carries the template name.
pub const NAME_TAG: &str = "Name";
