//! Running a resolved job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sidbroker_common::{DispatchId, EngineName, Error, Result};
use sidbroker_rules::{JobRule, JobTarget};
use sidbroker_sid::Sid;

use super::Broker;
use crate::registry::JobArgs;

/// Lifecycle of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchState {
    Idle,
    Resolving,
    Invoking,
    Launching,
    Succeeded,
    Failed,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Idle => "idle",
            DispatchState::Resolving => "resolving",
            DispatchState::Invoking => "invoking",
            DispatchState::Launching => "launching",
            DispatchState::Succeeded => "succeeded",
            DispatchState::Failed => "failed",
        }
    }
}

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// No job implements the action for this Sid. Nothing was run.
    NoJob { action: String, sid: String },
    /// The job's callable returned successfully.
    Succeeded { dispatch: DispatchId, job: String },
    /// The job's batch command was spawned.
    Launched {
        dispatch: DispatchId,
        job: String,
        pid: u32,
        command: String,
    },
    /// Dry run: the job was resolved but not executed.
    DryRun {
        dispatch: DispatchId,
        job: String,
        description: String,
    },
}

impl DispatchOutcome {
    /// Whether a job was found.
    pub fn found_job(&self) -> bool {
        !matches!(self, DispatchOutcome::NoJob { .. })
    }
}

/// Tracks the state of one dispatch and logs its transitions.
#[derive(Debug)]
struct Dispatch {
    id: DispatchId,
    job: String,
    sid: String,
    state: DispatchState,
    started_at: DateTime<Utc>,
}

impl Dispatch {
    fn begin(job: &JobRule, sid: &Sid) -> Self {
        let mut dispatch = Self {
            id: DispatchId::new(),
            job: job.name.clone(),
            sid: sid.to_string(),
            state: DispatchState::Idle,
            started_at: Utc::now(),
        };
        dispatch.advance(DispatchState::Resolving);
        dispatch
    }

    fn advance(&mut self, to: DispatchState) {
        tracing::info!(
            dispatch = %self.id,
            job = %self.job,
            sid = %self.sid,
            from = self.state.as_str(),
            to = to.as_str(),
            "Dispatch transition"
        );
        self.state = to;
    }

    fn finish(&mut self, result: &Result<DispatchOutcome>) {
        let elapsed_ms = (Utc::now() - self.started_at).num_milliseconds();
        match result {
            // Nothing ran, so the dispatch stays in `Resolving`.
            Ok(DispatchOutcome::DryRun { description, .. }) => {
                tracing::info!(
                    dispatch = %self.id,
                    job = %self.job,
                    sid = %self.sid,
                    state = self.state.as_str(),
                    elapsed_ms,
                    "Dispatch resolved (dry run): {}",
                    description
                );
            }
            Ok(_) => {
                self.advance(DispatchState::Succeeded);
                tracing::debug!(dispatch = %self.id, elapsed_ms, "Dispatch finished");
            }
            Err(e) => {
                self.advance(DispatchState::Failed);
                tracing::error!(
                    dispatch = %self.id,
                    job = %self.job,
                    kind = e.kind(),
                    elapsed_ms,
                    "Dispatch failed: {}",
                    e
                );
            }
        }
    }
}

impl Broker {
    /// Resolve the job for `action` on `sid` and run it.
    ///
    /// When no job applies, returns [`DispatchOutcome::NoJob`] and has no
    /// side effect.
    pub fn run_action(&self, action: &str, sid: &Sid) -> Result<DispatchOutcome> {
        let job = self.get_job(sid, action)?;
        self.dispatch_resolved(job, action, sid)
    }

    /// [`Broker::run_action`], considering only jobs that run in `engine`.
    pub fn run_action_for_engine(
        &self,
        action: &str,
        sid: &Sid,
        engine: &EngineName,
    ) -> Result<DispatchOutcome> {
        let job = self.get_jobs_for_engine(sid, action, engine)?.into_iter().next();
        if job.is_none() {
            tracing::warn!(sid = %sid, action, engine = %engine, "No job found");
        }
        self.dispatch_resolved(job, action, sid)
    }

    fn dispatch_resolved(
        &self,
        job: Option<&JobRule>,
        action: &str,
        sid: &Sid,
    ) -> Result<DispatchOutcome> {
        match job {
            Some(job) => self.run_job(job, sid),
            None => Ok(DispatchOutcome::NoJob {
                action: action.to_string(),
                sid: sid.to_string(),
            }),
        }
    }

    /// Run `job` on `sid`.
    ///
    /// # Errors
    ///
    /// - [`Error::JobConfiguration`] when the job has neither `call` nor `batch`.
    /// - [`Error::JobResolution`] when the callable is not registered or the
    ///   command is not on the resolved `PATH`.
    /// - [`Error::Environment`] when `requires` cannot be resolved.
    /// - [`Error::Execution`] when the callable fails or the command cannot
    ///   be spawned.
    pub fn run_job(&self, job: &JobRule, sid: &Sid) -> Result<DispatchOutcome> {
        let mut dispatch = Dispatch::begin(job, sid);
        let result = self.execute(&mut dispatch, job, sid);
        dispatch.finish(&result);
        result
    }

    fn execute(&self, dispatch: &mut Dispatch, job: &JobRule, sid: &Sid) -> Result<DispatchOutcome> {
        match job.target()? {
            JobTarget::Call { key, batch } => {
                let callable = self.registry.get(key).ok_or_else(|| {
                    Error::job_resolution(&job.name, key, "no callable registered under this key")
                })?;
                let args = JobArgs {
                    dispatch: dispatch.id,
                    job: job.name.clone(),
                    command: batch.map(|b| b.command.clone()),
                    path: sid.to_path(self.launcher.sid_root()).ok(),
                };

                if self.dry_run {
                    return Ok(DispatchOutcome::DryRun {
                        dispatch: dispatch.id,
                        job: job.name.clone(),
                        description: format!("call {key} with {sid}"),
                    });
                }

                dispatch.advance(DispatchState::Invoking);
                callable(sid, &args).map_err(|e| Error::execution(&job.name, e))?;
                Ok(DispatchOutcome::Succeeded {
                    dispatch: dispatch.id,
                    job: job.name.clone(),
                })
            }
            JobTarget::Batch(batch) => {
                let plan = self.launcher.prepare(job, batch, sid)?;

                if self.dry_run {
                    return Ok(DispatchOutcome::DryRun {
                        dispatch: dispatch.id,
                        job: job.name.clone(),
                        description: plan.describe(),
                    });
                }

                dispatch.advance(DispatchState::Launching);
                let handle = self.launcher.launch(&plan)?;
                Ok(DispatchOutcome::Launched {
                    dispatch: dispatch.id,
                    job: job.name.clone(),
                    pid: handle.pid,
                    command: plan.describe(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin() -> Dispatch {
        let job = JobRule::new("open", "open_maya_scene", &["all"]).with_call("maya.open");
        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/maya").unwrap();
        Dispatch::begin(&job, &sid)
    }

    #[test]
    fn dry_run_does_not_succeed() {
        let mut dispatch = begin();
        let outcome = DispatchOutcome::DryRun {
            dispatch: dispatch.id,
            job: dispatch.job.clone(),
            description: "call maya.open".into(),
        };
        dispatch.finish(&Ok(outcome));
        assert_eq!(dispatch.state, DispatchState::Resolving);
    }

    #[test]
    fn finish_records_success_and_failure() {
        let mut dispatch = begin();
        dispatch.advance(DispatchState::Invoking);
        let outcome = DispatchOutcome::Succeeded {
            dispatch: dispatch.id,
            job: dispatch.job.clone(),
        };
        dispatch.finish(&Ok(outcome));
        assert_eq!(dispatch.state, DispatchState::Succeeded);

        let mut dispatch = begin();
        dispatch.finish(&Err(Error::job_configuration("open_maya_scene", "no target")));
        assert_eq!(dispatch.state, DispatchState::Failed);
    }
}
