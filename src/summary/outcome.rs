//! Per-template outcome

use serde::{Deserialize, Serialize};

use crate::pipeline::{TemplateProgress, TemplateState, Transition};

/// What happened to one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutcome {
    /// Template name
    pub name: String,

    /// Identifier assigned by the service, if it got that far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Final state
    pub state: TemplateState,

    /// Entries written, in order
    pub entries_written: Vec<String>,

    pub transitions: Vec<Transition>,

    /// Wall-clock time spent on this template in milliseconds
    pub duration_ms: u64,

    /// Error message when the template failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateOutcome {
    pub fn from_progress(progress: &TemplateProgress, error: Option<String>) -> Self {
        Self {
            name: progress.name.clone(),
            id: progress.id.clone(),
            state: progress.state,
            entries_written: progress.entries_written.clone(),
            transitions: progress.transitions.clone(),
            duration_ms: progress.elapsed_ms(),
            error,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == TemplateState::Done
    }

    /// One-line rendering for terminal output
    pub fn human_line(&self) -> String {
        match (&self.id, &self.error) {
            (_, Some(error)) => format!("{}: FAILED ({})", self.name, error),
            (Some(id), None) => format!(
                "{}: {} -> {}",
                self.name,
                id,
                if self.entries_written.is_empty() {
                    "(no entries)".to_string()
                } else {
                    self.entries_written.join(", ")
                }
            ),
            (None, None) => format!("{}: {:?}", self.name, self.state),
        }
    }
}
