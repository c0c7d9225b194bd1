//! GitHub Actions webhook payloads.
//!
//! Only the fields needed to build traces are modelled; everything else in
//! the payload is ignored. Identifying fields (`id`, `run_id`, `run_attempt`,
//! `name`, `status`) are mandatory. Fields GitHub sends as `null` while a job
//! is still running decode to empty strings or `None`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status value GitHub reports once a job, step or run has finished.
pub const STATUS_COMPLETED: &str = "completed";

/// The two webhook event kinds runtrace understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WorkflowJob,
    WorkflowRun,
}

impl EventKind {
    /// Top-level payload key whose presence identifies this kind.
    pub fn payload_key(&self) -> &'static str {
        match self {
            EventKind::WorkflowJob => "workflow_job",
            EventKind::WorkflowRun => "workflow_run",
        }
    }
}

/// A decoded webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifiedEvent {
    Job(WorkflowJobEvent),
    Run(WorkflowRunEvent),
}

impl ClassifiedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClassifiedEvent::Job(_) => EventKind::WorkflowJob,
            ClassifiedEvent::Run(_) => EventKind::WorkflowRun,
        }
    }

    pub fn repository(&self) -> &Repository {
        match self {
            ClassifiedEvent::Job(e) => &e.repository,
            ClassifiedEvent::Run(e) => &e.repository,
        }
    }
}

/// `workflow_job` webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJobEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    pub workflow_job: WorkflowJob,
    pub repository: Repository,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowJob {
    pub id: i64,
    pub run_id: i64,
    pub run_attempt: i64,
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conclusion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_sha: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runner_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflow_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowJob {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

/// A single step of a job. Steps arrive in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conclusion: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Step {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

/// `workflow_run` webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRunEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    pub workflow_run: WorkflowRun,
    pub repository: Repository,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: i64,
    pub run_attempt: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conclusion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_sha: String,
    #[serde(default)]
    pub run_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: Repository,
}

impl WorkflowRun {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: Owner,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_job_with_nulls() {
        let json = r#"{
            "action": "in_progress",
            "workflow_job": {
                "id": 1, "run_id": 2, "run_attempt": 1, "name": "build",
                "status": "in_progress", "conclusion": null,
                "steps": [{"name": "checkout", "status": "in_progress", "conclusion": null,
                           "number": 1, "started_at": "2024-01-01T00:00:00Z", "completed_at": null}],
                "head_branch": null, "runner_name": null, "completed_at": null
            },
            "repository": {"full_name": "octo/repo", "owner": {"login": "octo"}}
        }"#;

        let event: WorkflowJobEvent = serde_json::from_str(json).unwrap();
        assert!(!event.workflow_job.is_completed());
        assert_eq!(event.workflow_job.conclusion, "");
        assert_eq!(event.workflow_job.head_branch, "");
        assert_eq!(event.workflow_job.steps.len(), 1);
        assert!(event.workflow_job.steps[0].completed_at.is_none());
        assert!(event.workflow_job.steps[0].started_at.is_some());
    }

    #[test]
    fn test_job_missing_run_id_is_rejected() {
        let json = r#"{
            "workflow_job": {"id": 1, "run_attempt": 1, "name": "build", "status": "queued"},
            "repository": {"full_name": "octo/repo", "owner": {"login": "octo"}}
        }"#;

        assert!(serde_json::from_str::<WorkflowJobEvent>(json).is_err());
    }

    #[test]
    fn test_run_repository_defaults() {
        let json = r#"{
            "workflow_run": {"id": 9, "run_attempt": 2, "name": "CI", "status": "completed",
                             "conclusion": "success", "repository": null},
            "repository": {"full_name": "octo/repo", "owner": {"login": "octo"}}
        }"#;

        let event: WorkflowRunEvent = serde_json::from_str(json).unwrap();
        assert!(event.workflow_run.is_completed());
        assert_eq!(event.workflow_run.repository.owner.login, "");
        assert_eq!(event.repository.full_name, "octo/repo");
    }

    #[test]
    fn test_event_kind_keys() {
        assert_eq!(EventKind::WorkflowJob.payload_key(), "workflow_job");
        assert_eq!(EventKind::WorkflowRun.payload_key(), "workflow_run");
    }
}
