//! Availability checks for the commands batch jobs launch.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sidbroker_rules::JobCatalog;

use crate::environment::PackageSet;

/// Availability of one job's batch command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Job that launches the command.
    pub job: String,
    /// Command as declared.
    pub command: String,
    pub available: bool,
    /// Resolved executable path.
    pub path: Option<PathBuf>,
    /// Why the command is unavailable.
    pub error: Option<String>,
}

/// Locate every batch command in `jobs`, each on its job's resolved `PATH`.
pub fn check_batch_tools(jobs: &JobCatalog, packages: &PackageSet) -> Vec<ToolInfo> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    jobs.jobs()
        .iter()
        .filter_map(|job| job.batch.as_ref().map(|batch| (job, batch)))
        .map(|(job, batch)| {
            let located = packages
                .resolve(&job.requires, &format!("job '{}'", job.name))
                .and_then(|env| env.search_path(std::env::var_os("PATH")))
                .map_err(|e| e.to_string())
                .and_then(|search_path| {
                    which::which_in(&batch.command, Some(search_path), &cwd)
                        .map_err(|e| e.to_string())
                });
            match located {
                Ok(path) => ToolInfo {
                    job: job.name.clone(),
                    command: batch.command.clone(),
                    available: true,
                    path: Some(path),
                    error: None,
                },
                Err(error) => ToolInfo {
                    job: job.name.clone(),
                    command: batch.command.clone(),
                    available: false,
                    path: None,
                    error: Some(error),
                },
            }
        })
        .collect()
}
