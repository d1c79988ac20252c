//! Provisioning orchestration
//!
//! Runs each job template through build → create → describe → publish,
//! strictly in order, one template at a time. The first failure halts the
//! batch; nothing already created or written is undone.
//!
//! Before any remote call the template count must equal the number of
//! configured parameter store entries.

pub mod stage;

use std::sync::Arc;

use emrc_protocol::CreateJobTemplateRequest;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::client::{ClientError, JobTemplateService, ParameterStore};
use crate::config::{ConfigError, EntryAssignment};
use crate::publish::{IdentifierPublisher, PublishError};
use crate::request::{
    prepare_request, token, ParameterConfigurator, RealParameterConfigurator,
    RealSparkSubmitCommandBuilder, RequestError, SparkSubmitCommandBuilder, TokenSource,
};
use crate::summary::TemplateOutcome;
use crate::template::{JobTemplateConfig, TemplateError};
use crate::timeout::Deadline;

pub use stage::{InvalidTransition, Stage, TemplateProgress, TemplateState, Transition};

/// Failure of a single template
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Build(#[from] RequestError),

    #[error("create job template returned error: {0}")]
    Create(#[source] ClientError),

    #[error("failed to describe job template: {0}")]
    Describe(#[source] ClientError),

    #[error("failed to marshal job template: {0}")]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl StageError {
    /// True when the run deadline expired during a remote call
    pub fn is_deadline(&self) -> bool {
        match self {
            StageError::Create(e) | StageError::Describe(e) => e.is_deadline(),
            StageError::Publish(e) => e.source.is_deadline(),
            StageError::Build(_) | StageError::Render(_) | StageError::State(_) => false,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_deadline() {
            return 80;
        }
        match self {
            StageError::Build(_) => 10,
            StageError::Create(_) => 20,
            StageError::Describe(_) | StageError::Render(_) => 30,
            StageError::Publish(_) => 40,
            StageError::State(_) => 1,
        }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] TemplateError),

    #[error("failed to initialize clients: {0}")]
    Client(#[source] ClientError),

    #[error("number of job templates ({templates}) does not match number of SSM parameter names ({entries})")]
    CountMismatch { templates: usize, entries: usize },

    #[error("job template '{name}' failed at {stage}: {source}")]
    Template {
        name: String,
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 1,
            PipelineError::Input(_) => 1,
            PipelineError::Client(e) if e.is_deadline() => 80,
            PipelineError::Client(_) => 1,
            PipelineError::CountMismatch { .. } => 2,
            PipelineError::Template { source, .. } => source.exit_code(),
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result of a batch: outcomes of every template attempted, then the verdict
#[derive(Debug)]
pub struct BatchOutcome {
    pub templates: Vec<TemplateOutcome>,
    pub result: PipelineResult<()>,
}

/// Fail unless every template has a matching entry name
pub fn check_counts(templates: usize, entries: usize) -> PipelineResult<()> {
    if templates != entries {
        return Err(PipelineError::CountMismatch { templates, entries });
    }
    Ok(())
}

/// Build every request without contacting any service
///
/// Enforces the count precondition first, then stops at the first template
/// that fails to build.
pub fn prepare_batch(
    templates: &mut [JobTemplateConfig],
    entries: &[String],
    next_token: &mut dyn FnMut(u32) -> u32,
) -> PipelineResult<Vec<CreateJobTemplateRequest>> {
    check_counts(templates.len(), entries.len())?;
    templates
        .iter_mut()
        .map(|config| {
            prepare_request(
                config,
                &RealParameterConfigurator,
                &RealSparkSubmitCommandBuilder,
                &mut *next_token,
            )
            .map_err(|e| PipelineError::Template {
                name: config.name.clone(),
                stage: Stage::Build,
                source: e.into(),
            })
        })
        .collect()
}

/// Sequential provisioning pipeline
pub struct Pipeline {
    service: Arc<dyn JobTemplateService>,
    publisher: IdentifierPublisher,
    parameters: Box<dyn ParameterConfigurator + Send>,
    submit: Box<dyn SparkSubmitCommandBuilder + Send>,
    next_token: TokenSource,
    entries: Vec<String>,
    assignment: EntryAssignment,
}

impl Pipeline {
    /// Create a pipeline with the production normalizer, synthesizer and a
    /// time-seeded token source
    pub fn new(
        service: Arc<dyn JobTemplateService>,
        store: Arc<dyn ParameterStore>,
        entries: Vec<String>,
        assignment: EntryAssignment,
    ) -> Self {
        Self {
            service,
            publisher: IdentifierPublisher::new(store),
            parameters: Box::new(RealParameterConfigurator),
            submit: Box::new(RealSparkSubmitCommandBuilder),
            next_token: token::time_seeded(),
            entries,
            assignment,
        }
    }

    pub fn with_token_source(mut self, next_token: TokenSource) -> Self {
        self.next_token = next_token;
        self
    }

    pub fn with_parameter_configurator(
        mut self,
        parameters: Box<dyn ParameterConfigurator + Send>,
    ) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_submit_builder(mut self, submit: Box<dyn SparkSubmitCommandBuilder + Send>) -> Self {
        self.submit = submit;
        self
    }

    /// Entries template `index` publishes to
    fn entries_for(&self, index: usize) -> &[String] {
        match self.assignment {
            EntryAssignment::Broadcast => &self.entries,
            EntryAssignment::Positional => {
                let end = (index + 1).min(self.entries.len());
                &self.entries[index.min(end)..end]
            }
        }
    }

    /// Run the whole batch
    ///
    /// Tags of each template are updated in place as its request is built.
    pub fn run(&mut self, templates: &mut [JobTemplateConfig], deadline: &Deadline) -> BatchOutcome {
        let mut outcomes = Vec::with_capacity(templates.len());

        if let Err(e) = check_counts(templates.len(), self.entries.len()) {
            return BatchOutcome {
                templates: outcomes,
                result: Err(e),
            };
        }

        for (index, config) in templates.iter_mut().enumerate() {
            let mut progress = TemplateProgress::new(config.name.clone());

            match self.process(index, config, deadline, &mut progress) {
                Ok(()) => {
                    info!(
                        template = %progress.name,
                        elapsed_ms = progress.elapsed_ms(),
                        "job template done"
                    );
                    outcomes.push(TemplateOutcome::from_progress(&progress, None));
                }
                Err(source) => {
                    let stage = progress.fail().unwrap_or(Stage::Build);
                    error!(template = %progress.name, %stage, error = %source, "job template failed");
                    outcomes.push(TemplateOutcome::from_progress(&progress, Some(source.to_string())));
                    return BatchOutcome {
                        templates: outcomes,
                        result: Err(PipelineError::Template {
                            name: progress.name,
                            stage,
                            source,
                        }),
                    };
                }
            }
        }

        info!(templates = outcomes.len(), "batch complete");
        BatchOutcome {
            templates: outcomes,
            result: Ok(()),
        }
    }

    fn process(
        &mut self,
        index: usize,
        config: &mut JobTemplateConfig,
        deadline: &Deadline,
        progress: &mut TemplateProgress,
    ) -> Result<(), StageError> {
        let request = prepare_request(
            config,
            &*self.parameters,
            &*self.submit,
            &mut *self.next_token,
        )?;
        progress.advance(TemplateState::Built)?;
        debug!(
            template = %request.name,
            client_token = %request.client_token,
            spark_submit = request.spark_submit_parameters(),
            "request prepared"
        );

        let id = self
            .service
            .create_job_template(&request, deadline)
            .map_err(StageError::Create)?;
        progress.id = Some(id.clone());
        progress.advance(TemplateState::Created)?;
        info!(template = %request.name, %id, "job template created");

        let details = self
            .service
            .describe_job_template(&id, deadline)
            .map_err(StageError::Describe)?;
        let json = serde_json::to_string_pretty(&details)?;
        info!(template = %request.name, %id, "job template described:\n{json}");
        progress.advance(TemplateState::Verified)?;

        for entry in self.entries_for(index) {
            self.publisher.publish(&id, entry, deadline)?;
            progress.entries_written.push(entry.clone());
        }
        progress.advance(TemplateState::Published)?;
        progress.advance(TemplateState::Done)?;
        Ok(())
    }
}
