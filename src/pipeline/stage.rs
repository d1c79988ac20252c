//! Per-template state machine
//!
//! Template states: PENDING → BUILT → CREATED → VERIFIED → PUBLISHED → DONE
//! with FAILED reachable from any non-terminal state. The failed stage is
//! the one that was running when the failure happened.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing stage of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Build,
    Create,
    Describe,
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Build => "build",
            Stage::Create => "create",
            Stage::Describe => "describe",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateState {
    /// Not yet built
    Pending,
    /// Request composed
    Built,
    /// Accepted by the service
    Created,
    /// Fetched back by identifier
    Verified,
    /// Identifier written to every assigned entry
    Published,
    Done,
    Failed { stage: Stage },
}

impl TemplateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TemplateState::Done | TemplateState::Failed { .. })
    }

    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: TemplateState) -> bool {
        match (self, target) {
            (TemplateState::Pending, TemplateState::Built) => true,
            (TemplateState::Built, TemplateState::Created) => true,
            (TemplateState::Created, TemplateState::Verified) => true,
            (TemplateState::Verified, TemplateState::Published) => true,
            (TemplateState::Published, TemplateState::Done) => true,
            (from, TemplateState::Failed { .. }) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Stage that runs while in this state
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            TemplateState::Pending => Some(Stage::Build),
            TemplateState::Built => Some(Stage::Create),
            TemplateState::Created => Some(Stage::Describe),
            TemplateState::Verified | TemplateState::Published => Some(Stage::Publish),
            TemplateState::Done | TemplateState::Failed { .. } => None,
        }
    }
}

/// Errors for state operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state transition from {from:?} to {to:?}")]
pub struct InvalidTransition {
    pub from: TemplateState,
    pub to: TemplateState,
}

/// One recorded transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: TemplateState,
    pub to: TemplateState,
    pub at: DateTime<Utc>,
}

/// Progress of one template through the pipeline
#[derive(Debug, Clone)]
pub struct TemplateProgress {
    pub name: String,
    pub state: TemplateState,
    pub transitions: Vec<Transition>,
    /// Identifier returned by the service, once created
    pub id: Option<String>,
    /// Entries written so far, in order
    pub entries_written: Vec<String>,
    started: Instant,
}

impl TemplateProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: TemplateState::Pending,
            transitions: Vec::new(),
            id: None,
            entries_written: Vec::new(),
            started: Instant::now(),
        }
    }

    /// Move to `to`, recording the transition
    pub fn advance(&mut self, to: TemplateState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(to) {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.transitions.push(Transition {
            from: self.state,
            to,
            at: Utc::now(),
        });
        self.state = to;
        Ok(())
    }

    /// Mark the running stage as failed and return it
    ///
    /// Returns `None` when already terminal.
    pub fn fail(&mut self) -> Option<Stage> {
        let stage = self.state.next_stage()?;
        self.advance(TemplateState::Failed { stage }).ok()?;
        Some(stage)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
