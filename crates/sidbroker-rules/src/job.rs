//! Job descriptors: the concrete implementation of an action for matching Sids.

use serde::{Deserialize, Serialize};
use sidbroker_common::{EngineName, Error, Result};
use std::collections::BTreeSet;

/// What a batch command receives as its leading argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendMode {
    /// The Sid's filesystem path.
    #[default]
    Path,
    /// The Sid string.
    Sid,
    /// Nothing; only the templated `args` are passed.
    None,
}

/// An external command launched for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    /// Executable name or path, looked up on the resolved `PATH`.
    pub command: String,
    /// Leading argument derived from the Sid.
    #[serde(default)]
    pub send: SendMode,
    /// Extra arguments, with `{sid}`, `{path}` and Sid field substitution.
    #[serde(default)]
    pub args: Vec<String>,
}

impl BatchSpec {
    /// Create a batch spec that sends the Sid path to `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            send: SendMode::Path,
            args: Vec::new(),
        }
    }
}

/// How a job is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTarget<'a> {
    /// Invoke a registered in-process callable. When the job also declares
    /// a batch spec, its command is handed to the callable.
    Call {
        key: &'a str,
        batch: Option<&'a BatchSpec>,
    },
    /// Launch an external command in a resolved environment.
    Batch(&'a BatchSpec),
}

/// The implementation binding of an action for matching Sids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRule {
    /// Name of the action this job implements.
    pub action: String,
    /// Unique job name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Sid patterns; `"all"` matches every Sid.
    #[serde(rename = "match", default)]
    pub patterns: Vec<String>,
    /// Registry key of an in-process callable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<String>,
    /// Runtime packages needed to execute the job.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Host engines the job runs in; empty or `all` means any.
    #[serde(default)]
    pub engine: BTreeSet<EngineName>,
    /// External command specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchSpec>,
}

impl JobRule {
    /// Pattern sentinel matching every Sid.
    pub const MATCH_ALL: &'static str = "all";

    /// Create a job for `action` with the given patterns and no target.
    pub fn new(action: impl Into<String>, name: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            action: action.into(),
            name: name.into(),
            description: String::new(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            call: None,
            batch: None,
            requires: Vec::new(),
            engine: BTreeSet::new(),
        }
    }

    /// Builder: bind the job to a registered callable.
    pub fn with_call(mut self, key: impl Into<String>) -> Self {
        self.call = Some(key.into());
        self
    }

    /// Builder: bind the job to an external command.
    pub fn with_batch(mut self, batch: BatchSpec) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Builder: set the required runtime packages.
    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires = requires.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Builder: set the engines the job runs in.
    pub fn with_engines(mut self, engines: &[&str]) -> Self {
        self.engine = engines
            .iter()
            .filter_map(|e| EngineName::new(e).ok())
            .collect();
        self
    }

    /// Whether the `"all"` sentinel is present.
    pub fn matches_all(&self) -> bool {
        self.patterns.iter().any(|p| p == Self::MATCH_ALL)
    }

    /// Whether the job runs in `engine`.
    pub fn runs_on(&self, engine: &EngineName) -> bool {
        self.engine.is_empty() || self.engine.iter().any(|e| e.is_all() || e == engine)
    }

    /// Resolve how this job executes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobConfiguration`] when neither `call` nor `batch` is set.
    pub fn target(&self) -> Result<JobTarget<'_>> {
        match (self.call.as_deref(), self.batch.as_ref()) {
            (Some(key), batch) => Ok(JobTarget::Call { key, batch }),
            (None, Some(batch)) => Ok(JobTarget::Batch(batch)),
            (None, None) => Err(Error::job_configuration(
                &self.name,
                "job declares neither a callable nor a batch command",
            )),
        }
    }
}
