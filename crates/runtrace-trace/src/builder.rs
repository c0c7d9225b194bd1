//! Span-tree assembly for workflow job and workflow run events.
//!
//! A run attempt maps to one trace. The run-level span is the root; each job
//! span hangs off it and each step span hangs off its job:
//!
//! ```text
//! run (id = run_parent_span_id(run, attempt))       <- workflow_run event
//! └── job (id = job_span_id(run, attempt, name))    <- workflow_job event
//!     ├── step 1 (random id)
//!     └── step 2 (random id)
//! ```
//!
//! Job events reference the run span only as a parent id; the run span itself
//! is emitted when the `workflow_run` event completes.

use crate::ids::IdDeriver;
use crate::service_name::ServiceNameConfig;
use chrono::{DateTime, Utc};
use runtrace_core::events::{Step, WorkflowJobEvent, WorkflowRunEvent};
use runtrace_core::ports::{DiagnosticEvent, Diagnostics, RandomSource};
use runtrace_core::{
    ClassifiedEvent, Error, EventKind, Resource, Result, Span, SpanId, SpanKind, Status,
    StatusCode, Trace, TraceId,
};
use std::sync::Arc;

/// Converts decoded events into trace documents.
///
/// Holds only immutable configuration and shared ports, so one builder can
/// serve any number of concurrent conversions.
#[derive(Clone)]
pub struct TraceBuilder {
    service_names: ServiceNameConfig,
    ids: IdDeriver,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TraceBuilder {
    pub fn new(
        service_names: ServiceNameConfig,
        random: Arc<dyn RandomSource>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            service_names,
            ids: IdDeriver::new(random),
            diagnostics,
        }
    }

    /// Build the trace for one event.
    ///
    /// Events that are not `completed` yield a trace with its resource set
    /// and no spans. Identifier failures abort the whole conversion.
    pub fn build(&self, event: &ClassifiedEvent) -> Result<Trace> {
        match event {
            ClassifiedEvent::Job(e) => self.build_job(e),
            ClassifiedEvent::Run(e) => self.build_run(e),
        }
    }

    fn build_job(&self, event: &WorkflowJobEvent) -> Result<Trace> {
        let job = &event.workflow_job;
        self.diagnostics.record(DiagnosticEvent::Converting {
            kind: EventKind::WorkflowJob,
            run_id: job.run_id,
            run_attempt: job.run_attempt,
        });

        let mut trace = Trace::new(self.job_resource(event));
        let trace_id = self.derive("trace id", || self.ids.trace_id(job.run_id, job.run_attempt))?;

        if !job.is_completed() {
            self.diagnostics.record(DiagnosticEvent::NotCompleted {
                kind: EventKind::WorkflowJob,
                status: &job.status,
            });
            return Ok(trace);
        }

        let parent_span_id = self.derive("run span id", || {
            self.ids.run_parent_span_id(job.run_id, job.run_attempt)
        })?;
        let job_span_id = self.derive("job span id", || {
            self.ids.job_span_id(job.run_id, job.run_attempt, &job.name)
        })?;

        let (start, end) = match (job.steps.first(), job.steps.last()) {
            (Some(first), Some(last)) => (first.started_at, last.completed_at),
            _ => {
                self.diagnostics
                    .record(DiagnosticEvent::NoSteps { job: &job.name });
                (job.created_at, job.completed_at)
            }
        };

        let job_span = Span {
            trace_id,
            span_id: job_span_id,
            parent_span_id: Some(parent_span_id),
            name: job.name.clone(),
            kind: SpanKind::Server,
            start_time: timestamp(start),
            end_time: timestamp(end),
            status: Status::new(aggregate_step_status(&job.steps), ""),
        };
        self.push(&mut trace, job_span);

        for step in &job.steps {
            let span = self.step_span(step, trace_id, job_span_id);
            self.push(&mut trace, span);
        }

        Ok(trace)
    }

    fn step_span(&self, step: &Step, trace_id: TraceId, job_span_id: SpanId) -> Span {
        Span {
            trace_id,
            span_id: self.ids.step_span_id(),
            parent_span_id: Some(job_span_id),
            name: step.name.clone(),
            kind: SpanKind::Server,
            start_time: timestamp(step.started_at),
            end_time: timestamp(step.completed_at),
            status: Status::from_conclusion(&step.conclusion),
        }
    }

    fn build_run(&self, event: &WorkflowRunEvent) -> Result<Trace> {
        let run = &event.workflow_run;
        self.diagnostics.record(DiagnosticEvent::Converting {
            kind: EventKind::WorkflowRun,
            run_id: run.id,
            run_attempt: run.run_attempt,
        });

        let trace_id = self.derive("trace id", || self.ids.trace_id(run.id, run.run_attempt))?;

        if !run.is_completed() {
            self.diagnostics.record(DiagnosticEvent::NotCompleted {
                kind: EventKind::WorkflowRun,
                status: &run.status,
            });
            return Ok(Trace::new(Resource::default()));
        }

        let mut trace = Trace::new(self.run_resource(event));

        let root_span_id = self.derive("run span id", || {
            self.ids.run_parent_span_id(run.id, run.run_attempt)
        })?;

        let root = Span {
            trace_id,
            span_id: root_span_id,
            parent_span_id: None,
            name: run.name.clone(),
            kind: SpanKind::Server,
            start_time: timestamp(run.run_started_at),
            end_time: timestamp(run.updated_at),
            status: Status::from_conclusion(&run.conclusion),
        };
        self.push(&mut trace, root);

        Ok(trace)
    }

    fn job_resource(&self, event: &WorkflowJobEvent) -> Resource {
        let job = &event.workflow_job;
        let mut resource = Resource::default();

        resource.insert("service.name", self.service_names.resolve(&event.repository.full_name));

        resource.insert("ci.system", "github");
        resource.insert("ci.actor", event.repository.owner.login.as_str());

        resource.insert("ci.github.job", job.name.as_str());
        resource.insert("ci.github.run_id", job.run_id);
        resource.insert("ci.github.run_attempt", job.run_attempt);
        resource.insert("ci.github.runner.name", job.runner_name.as_str());
        resource.insert("ci.github.workflow", job.workflow_name.as_str());

        resource.insert("scm.system", "git");
        resource.insert("scm.git.branch", job.head_branch.as_str());
        resource.insert("scm.git.sha", job.head_sha.as_str());
        resource.insert("scm.git.repo", event.repository.full_name.as_str());

        resource
    }

    fn run_resource(&self, event: &WorkflowRunEvent) -> Resource {
        let run = &event.workflow_run;
        let mut resource = Resource::default();

        resource.insert("service.name", self.service_names.resolve(&event.repository.full_name));

        resource.insert("ci.system", "github");
        resource.insert("ci.actor", run.repository.owner.login.as_str());

        resource.insert("ci.github.run_id", run.id);
        resource.insert("ci.github.run_attempt", run.run_attempt);
        resource.insert("ci.github.workflow", run.name.as_str());
        resource.insert("ci.github.workflow_path", run.path.as_str());

        resource.insert("scm.system", "git");
        resource.insert("scm.git.branch", run.head_branch.as_str());
        resource.insert("scm.git.sha", run.head_sha.as_str());
        resource.insert("scm.git.repo", event.repository.full_name.as_str());

        resource
    }

    fn derive<T>(&self, what: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        f().inspect_err(|e| {
            let reason = match e {
                Error::IdentifierDerivation(reason) => reason.clone(),
                other => other.to_string(),
            };
            self.diagnostics
                .record(DiagnosticEvent::IdentifierFailed { what, reason });
        })
    }

    fn push(&self, trace: &mut Trace, span: Span) {
        self.diagnostics.record(DiagnosticEvent::SpanCreated {
            name: &span.name,
            span_id: span.span_id,
            parent_span_id: span.parent_span_id,
        });
        trace.spans.push(span);
    }
}

/// Job status from its steps, evaluated in order.
///
/// Any `failure` conclusion short-circuits to `Error`. Otherwise the job is
/// `Ok` only if every step completed with `success`; anything else
/// (`skipped`, `cancelled`, still running) leaves it `Unset`.
pub fn aggregate_step_status(steps: &[Step]) -> StatusCode {
    let mut all_successful = true;
    for step in steps {
        if step.conclusion == "failure" {
            return StatusCode::Error;
        }
        if !step.is_completed() || step.conclusion != "success" {
            all_successful = false;
        }
    }

    if all_successful {
        StatusCode::Ok
    } else {
        StatusCode::Unset
    }
}

/// Missing timestamps render as the Unix epoch.
fn timestamp(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.unwrap_or_default()
}
