//! # sidbroker-runner
//!
//! Everything a batch job needs to run outside the host process.
//!
//! - [`PackageSet`] resolves a job's `requires` into a [`ResolvedEnvironment`]
//!   (variables plus `PATH` entries, dependencies first).
//! - [`BatchLauncher`] turns a job's [`BatchSpec`](sidbroker_rules::BatchSpec)
//!   into a [`LaunchPlan`] and spawns it without waiting.
//! - [`TemplateContext`] substitutes `{sid}`, `{path}` and Sid fields in
//!   command arguments.
//! - [`check_batch_tools`] reports which batch commands can be found.

pub mod environment;
pub mod error;
pub mod launch;
pub mod template;
pub mod tools;

pub use environment::{PackageDefinition, PackageSet, ResolvedEnvironment};
pub use error::{Result, RunnerError};
pub use launch::{BatchLauncher, LaunchHandle, LaunchPlan};
pub use template::TemplateContext;
pub use tools::{check_batch_tools, ToolInfo};
