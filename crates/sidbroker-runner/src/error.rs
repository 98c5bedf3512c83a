//! Errors raised while preparing or launching a batch job.

use std::env::JoinPathsError;
use std::path::PathBuf;

use sidbroker_common::Error;

/// Result alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A required package is not defined.
    #[error("unknown package '{package}' required by {required_by}")]
    UnknownPackage {
        package: String,
        required_by: String,
    },

    /// Package requirements form a cycle.
    #[error("package requirement cycle: {chain}")]
    PackageCycle { package: String, chain: String },

    /// A package `path` entry cannot be placed in `PATH`, usually because it
    /// contains the platform's path separator.
    #[error("package '{package}' has invalid PATH entry {}: {source}", entry.display())]
    InvalidPathEntry {
        package: String,
        entry: PathBuf,
        #[source]
        source: JoinPathsError,
    },

    /// The combined search path could not be built.
    #[error("invalid PATH entry {}: {source}", entry.display())]
    SearchPath {
        entry: PathBuf,
        #[source]
        source: JoinPathsError,
    },

    /// The batch command is not on the resolved `PATH`.
    #[error("command '{command}' not found for job '{job}': {source}")]
    CommandNotFound {
        job: String,
        command: String,
        #[source]
        source: which::Error,
    },

    /// The command was found but could not be started.
    #[error("failed to spawn '{command}' for job '{job}': {source}")]
    Spawn {
        job: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The Sid has no filesystem location to send.
    #[error("job '{job}': {source}")]
    Sid {
        job: String,
        #[source]
        source: sidbroker_sid::SidError,
    },
}

impl From<RunnerError> for Error {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::UnknownPackage { ref package, .. }
            | RunnerError::PackageCycle { ref package, .. } => {
                Error::environment(package.clone(), err.to_string())
            }
            RunnerError::InvalidPathEntry { ref package, .. } => {
                Error::environment(package.clone(), err.to_string())
            }
            RunnerError::SearchPath { .. } => Error::environment("PATH", err.to_string()),
            RunnerError::CommandNotFound {
                job,
                command,
                source,
            } => Error::job_resolution(job, command, source.to_string()),
            RunnerError::Spawn { job, source, .. } => Error::execution(job, source),
            RunnerError::Sid { job, source } => Error::execution(job, source),
        }
    }
}
