//! In-process job template service

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use emrc_protocol::{CreateJobTemplateRequest, JobTemplateDetails};

use super::failure::FailureInjector;
use crate::client::{ClientError, JobTemplateService, Operation};
use crate::timeout::Deadline;

#[derive(Debug, Default)]
struct ServiceState {
    templates: HashMap<String, CreateJobTemplateRequest>,
    tokens: HashMap<String, String>,
    next_id: u32,
    calls: usize,
    created: Vec<CreateJobTemplateRequest>,
    described: Vec<String>,
}

/// Job template service double
///
/// Assigns ids `jt0001`, `jt0002`, ... in creation order. A repeated client
/// token returns the id created for it the first time.
#[derive(Debug, Default)]
pub struct MockJobTemplateService {
    state: Mutex<ServiceState>,
    failures: Mutex<FailureInjector>,
}

impl MockJobTemplateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the failure injector
    pub fn failures(&self) -> std::sync::MutexGuard<'_, FailureInjector> {
        self.failures.lock().unwrap()
    }

    /// Create requests that passed failure injection, in order (repeats included)
    pub fn created(&self) -> Vec<CreateJobTemplateRequest> {
        self.state.lock().unwrap().created.clone()
    }

    /// Ids of describe calls that passed failure injection, in order
    pub fn described(&self) -> Vec<String> {
        self.state.lock().unwrap().described.clone()
    }

    /// Number of distinct templates stored
    pub fn template_count(&self) -> usize {
        self.state.lock().unwrap().templates.len()
    }

    /// Total remote calls received, injected failures included
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

impl JobTemplateService for MockJobTemplateService {
    fn create_job_template(
        &self,
        request: &CreateJobTemplateRequest,
        deadline: &Deadline,
    ) -> Result<String, ClientError> {
        let op = Operation::CreateJobTemplate;
        deadline.check(op.as_str())?;
        self.state.lock().unwrap().calls += 1;
        self.failures.lock().unwrap().apply(op)?;
        deadline.check(op.as_str())?;

        let mut state = self.state.lock().unwrap();
        state.created.push(request.clone());

        if let Some(id) = state.tokens.get(&request.client_token) {
            return Ok(id.clone());
        }

        state.next_id += 1;
        let id = format!("jt{:04}", state.next_id);
        state.tokens.insert(request.client_token.clone(), id.clone());
        state.templates.insert(id.clone(), request.clone());
        Ok(id)
    }

    fn describe_job_template(
        &self,
        id: &str,
        deadline: &Deadline,
    ) -> Result<JobTemplateDetails, ClientError> {
        let op = Operation::DescribeJobTemplate;
        deadline.check(op.as_str())?;
        self.state.lock().unwrap().calls += 1;
        self.failures.lock().unwrap().apply(op)?;
        deadline.check(op.as_str())?;

        let mut state = self.state.lock().unwrap();
        state.described.push(id.to_string());

        let request = state.templates.get(id).ok_or_else(|| {
            ClientError::service(op, format!("ResourceNotFoundException: template {id} not found"))
        })?;

        let mut details = JobTemplateDetails::new(id);
        details.name = Some(request.name.clone());
        details.arn = Some(format!(
            "arn:aws:emr-containers:us-east-1:000000000000:/jobtemplates/{id}"
        ));
        details.created_at = Some(Utc::now());
        details.created_by = Some("mock".to_string());
        details.tags = request.tags.clone();
        details.job_template_data = Some(request.job_template_data.clone());
        Ok(details)
    }
}
