//! Fire-and-forget launching of batch job commands.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use sidbroker_rules::{BatchSpec, JobRule, SendMode};
use sidbroker_sid::Sid;

use crate::environment::{PackageSet, ResolvedEnvironment};
use crate::error::{Result, RunnerError};
use crate::template::TemplateContext;

/// A fully resolved command, ready to spawn.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Job the command belongs to.
    pub job: String,
    /// Absolute path of the located executable.
    pub program: PathBuf,
    pub args: Vec<String>,
    pub environment: ResolvedEnvironment,
    search_path: OsString,
}

impl LaunchPlan {
    /// Shell-like one-line rendering, for logs and dry runs.
    pub fn describe(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("{arg:?}"));
            } else {
                line.push_str(arg);
            }
        }
        if !self.environment.packages.is_empty() {
            line.push_str(&format!(" [packages: {}]", self.environment.packages.join(", ")));
        }
        line
    }
}

/// A launched process. Nothing waits on it from the caller's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchHandle {
    pub pid: u32,
    pub program: PathBuf,
}

/// Builds and spawns batch commands for jobs.
#[derive(Debug, Clone)]
pub struct BatchLauncher {
    packages: PackageSet,
    sid_root: PathBuf,
}

impl BatchLauncher {
    pub fn new(packages: PackageSet, sid_root: impl Into<PathBuf>) -> Self {
        Self {
            packages,
            sid_root: sid_root.into(),
        }
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn sid_root(&self) -> &Path {
        &self.sid_root
    }

    /// Resolve the job's environment, build its argument list and locate
    /// the command on the resolved `PATH`.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::UnknownPackage`] / [`RunnerError::PackageCycle`] /
    ///   [`RunnerError::InvalidPathEntry`] when `requires` cannot be resolved.
    /// - [`RunnerError::SearchPath`] when the inherited `PATH` cannot be
    ///   combined with the package directories.
    /// - [`RunnerError::Sid`] when the job sends a path and the Sid has none.
    /// - [`RunnerError::CommandNotFound`] when the command is not on `PATH`.
    pub fn prepare(&self, job: &JobRule, batch: &BatchSpec, sid: &Sid) -> Result<LaunchPlan> {
        let environment = self
            .packages
            .resolve(&job.requires, &format!("job '{}'", job.name))?;
        let args = self.arguments(job, batch, sid)?;

        let search_path = environment.search_path(std::env::var_os("PATH"))?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let program = which::which_in(&batch.command, Some(&search_path), cwd).map_err(|source| {
            RunnerError::CommandNotFound {
                job: job.name.clone(),
                command: batch.command.clone(),
                source,
            }
        })?;

        Ok(LaunchPlan {
            job: job.name.clone(),
            program,
            args,
            environment,
            search_path,
        })
    }

    /// Spawn the planned command without waiting for it.
    ///
    /// Output is collected on a detached thread and logged at debug level
    /// once the process exits.
    pub fn launch(&self, plan: &LaunchPlan) -> Result<LaunchHandle> {
        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        plan.environment.apply(&mut command, &plan.search_path);

        let child = command.spawn().map_err(|source| RunnerError::Spawn {
            job: plan.job.clone(),
            command: plan.program.display().to_string(),
            source,
        })?;
        let pid = child.id();

        tracing::info!(job = %plan.job, pid, command = %plan.describe(), "Launched batch command");

        let job = plan.job.clone();
        let reaper = std::thread::Builder::new()
            .name(format!("reap-{pid}"))
            .spawn(move || match child.wait_with_output() {
                Ok(output) => {
                    tracing::debug!(
                        job = %job,
                        pid,
                        status = %output.status,
                        stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                        "Batch command exited"
                    );
                }
                Err(e) => {
                    tracing::debug!(job = %job, pid, "Failed to collect batch command output: {}", e);
                }
            });
        if let Err(e) = reaper {
            tracing::warn!(job = %plan.job, pid, "Could not start output reaper: {}", e);
        }

        Ok(LaunchHandle {
            pid,
            program: plan.program.clone(),
        })
    }

    /// Leading `send` argument followed by the substituted `args` templates.
    fn arguments(&self, job: &JobRule, batch: &BatchSpec, sid: &Sid) -> Result<Vec<String>> {
        let path = sid.to_path(&self.sid_root);
        let ctx = TemplateContext::new().with_sid(sid, path.as_deref().ok());

        let mut args = Vec::with_capacity(batch.args.len() + 1);
        match batch.send {
            SendMode::Path => {
                let path = path.map_err(|source| RunnerError::Sid {
                    job: job.name.clone(),
                    source,
                })?;
                args.push(path.display().to_string());
            }
            SendMode::Sid => args.push(sid.to_string()),
            SendMode::None => {}
        }
        args.extend(ctx.substitute_all(&batch.args));
        Ok(args)
    }
}
