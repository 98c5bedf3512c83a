//! Error taxonomy shared by the broker, the catalogs and the runner.
//!
//! Catalog defects ([`Error::Configuration`]) are programmer errors and must
//! reach the caller. Dispatch failures ([`Error::JobConfiguration`],
//! [`Error::JobResolution`], [`Error::Environment`]) abort a single dispatch.
//! "Nothing applicable" is never an error: lookups return empty lists or
//! `None` for that case.

/// Boxed error returned by in-process job callables.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for sidbroker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A catalog record is structurally invalid, or a lookup hit a catalog defect.
    #[error("Configuration error [{context}]: {message}")]
    Configuration {
        /// Where the defect was found (record, Sid, engine).
        context: String,
        /// Human-readable error description.
        message: String,
    },

    /// A resolved job lacks the fields needed to execute it.
    #[error("Job configuration error [{job}]: {message}")]
    JobConfiguration {
        /// Name of the job.
        job: String,
        /// Human-readable error description.
        message: String,
    },

    /// The job's declared target (callable or command) cannot be located.
    #[error("Job resolution error [{job}] '{target}': {message}")]
    JobResolution {
        /// Name of the job.
        job: String,
        /// The callable key or command that could not be found.
        target: String,
        /// Human-readable error description.
        message: String,
    },

    /// The runtime environment for a job could not be resolved.
    #[error("Environment error [{package}]: {message}")]
    Environment {
        /// The package that failed to resolve.
        package: String,
        /// Human-readable error description.
        message: String,
    },

    /// A Sid string or pattern could not be parsed.
    #[error("Invalid sid: {0}")]
    InvalidSid(String),

    /// The invoked job callable returned an error.
    #[error("Job '{job}' failed: {source}")]
    Execution {
        /// Name of the job.
        job: String,
        /// The error raised by the callable.
        source: BoxError,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Configuration`].
    pub fn configuration(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::JobConfiguration`].
    pub fn job_configuration(job: impl Into<String>, message: impl Into<String>) -> Self {
        Error::JobConfiguration {
            job: job.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::JobResolution`].
    pub fn job_resolution(
        job: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::JobResolution {
            job: job.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Environment`].
    pub fn environment(package: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Environment {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Execution`].
    pub fn execution(job: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Execution {
            job: job.into(),
            source: source.into(),
        }
    }

    /// Short, stable name of the error kind, used in dispatch logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "configuration",
            Error::JobConfiguration { .. } => "job_configuration",
            Error::JobResolution { .. } => "job_resolution",
            Error::Environment { .. } => "environment",
            Error::InvalidSid(_) => "invalid_sid",
            Error::Execution { .. } => "execution",
            Error::Io { .. } => "io",
            Error::Internal(_) => "internal",
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
