//! Run summary (printed by `emrc-template run`)

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::TemplateOutcome;
use crate::config::{EntryAssignment, Settings};
use crate::pipeline::BatchOutcome;
use crate::template::LoadedTemplates;

/// Schema version for the run summary
pub const RUN_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the run summary
pub const RUN_SUMMARY_SCHEMA_ID: &str = "emrc-template/run_summary@1";

/// Aggregated run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Run summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Run identifier
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the summary was finalized
    pub finished_at: DateTime<Utc>,

    pub region: String,

    /// Declarative input path
    pub input_path: PathBuf,

    /// SHA-256 of the declarative input
    pub input_digest: String,

    pub assignment: EntryAssignment,

    /// Configured parameter store entries
    pub parameter_names: Vec<String>,

    pub status: RunStatus,

    /// Process exit code
    pub exit_code: i32,

    /// Fatal error, if the run failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Templates attempted, in order
    pub templates: Vec<TemplateOutcome>,

    /// Templates never attempted because an earlier one failed
    pub templates_skipped: usize,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl RunSummary {
    /// Build the summary of a finished batch
    pub fn from_batch(
        run_id: String,
        started_at: DateTime<Utc>,
        settings: &Settings,
        input: &LoadedTemplates,
        batch: &BatchOutcome,
    ) -> Self {
        let finished_at = Utc::now();
        let (status, exit_code, error) = match &batch.result {
            Ok(()) => (RunStatus::Success, 0, None),
            Err(e) => (RunStatus::Failed, e.exit_code(), Some(e.to_string())),
        };
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION,
            schema_id: RUN_SUMMARY_SCHEMA_ID.to_string(),
            run_id,
            started_at,
            finished_at,
            region: settings.region.clone(),
            input_path: input.path.clone(),
            input_digest: input.digest.clone(),
            assignment: settings.assignment,
            parameter_names: settings.parameter_names.clone(),
            status,
            exit_code,
            error,
            templates: batch.templates.clone(),
            templates_skipped: input.len().saturating_sub(batch.templates.len()),
            duration_ms,
        }
    }

    /// Generate a human-readable summary
    pub fn human_summary(&self) -> String {
        let succeeded = self.templates.iter().filter(|t| t.succeeded()).count();
        match self.status {
            RunStatus::Success => format!(
                "Run {} succeeded: {} job template(s) provisioned",
                self.run_id, succeeded
            ),
            RunStatus::Failed => format!(
                "Run {} failed: {} provisioned, {} failed, {} skipped",
                self.run_id,
                succeeded,
                self.templates.len() - succeeded,
                self.templates_skipped
            ),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineError, TemplateProgress};
    use crate::template::TemplateFile;

    fn settings() -> Settings {
        Settings::resolve(
            None,
            |key| match key {
                "SSM_PM_NAMES" => Some("/a,/b".to_string()),
                _ => None,
            },
            None,
        )
        .unwrap()
    }

    fn input(count: usize) -> LoadedTemplates {
        let file = TemplateFile {
            job_templates: (0..count).map(|_| Default::default()).collect(),
        };
        LoadedTemplates {
            path: PathBuf::from("example.yaml"),
            digest: "ab".repeat(32),
            file,
        }
    }

    #[test]
    fn test_success_summary() {
        let batch = BatchOutcome {
            templates: vec![TemplateOutcome::from_progress(&TemplateProgress::new("one"), None)],
            result: Ok(()),
        };
        let summary = RunSummary::from_batch(
            "run-1".to_string(),
            Utc::now(),
            &settings(),
            &input(1),
            &batch,
        );

        assert_eq!(summary.status, RunStatus::Success);
        assert_eq!(summary.exit_code, 0);
        assert_eq!(summary.region, "us-east-1");
        assert_eq!(summary.parameter_names, vec!["/a", "/b"]);
        assert_eq!(summary.templates_skipped, 0);
        assert!(summary.human_summary().contains("succeeded"));

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["schema_id"], RUN_SUMMARY_SCHEMA_ID);
        assert_eq!(json["assignment"], "broadcast");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failed_summary_counts_skipped() {
        let mut progress = TemplateProgress::new("one");
        progress.fail();
        let batch = BatchOutcome {
            templates: vec![TemplateOutcome::from_progress(&progress, Some("boom".to_string()))],
            result: Err(PipelineError::CountMismatch {
                templates: 3,
                entries: 2,
            }),
        };
        let summary = RunSummary::from_batch(
            "run-2".to_string(),
            Utc::now(),
            &settings(),
            &input(3),
            &batch,
        );

        assert_eq!(summary.status, RunStatus::Failed);
        assert_eq!(summary.exit_code, 2);
        assert_eq!(summary.templates_skipped, 2);
        assert!(summary.error.as_deref().unwrap().contains("does not match"));
        assert_eq!(
            summary.human_summary(),
            "Run run-2 failed: 0 provisioned, 1 failed, 2 skipped"
        );
    }
}
