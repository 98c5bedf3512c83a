//! The action broker: which actions apply to a Sid, which job implements an
//! action, and dispatching that job.

mod actions;
mod dispatch;
mod jobs;

pub use dispatch::{DispatchOutcome, DispatchState};

use std::fmt;

use sidbroker_common::{EngineName, Result};
use sidbroker_rules::{ActionCatalog, JobCatalog};
use sidbroker_runner::{BatchLauncher, PackageSet};
use sidbroker_sid::{GlobMatcher, SidMatcher};

use crate::config::Config;
use crate::engines::EngineAdapter;
use crate::registry::JobRegistry;

/// Resolves and dispatches actions for Sids.
///
/// Catalogs are immutable once the broker is built; every lookup is a pure
/// function of its arguments.
pub struct Broker {
    actions: ActionCatalog,
    jobs: JobCatalog,
    registry: JobRegistry,
    launcher: BatchLauncher,
    matcher: Box<dyn SidMatcher>,
    engine: Option<EngineName>,
    dry_run: bool,
}

impl Broker {
    /// Create a broker over validated catalogs with the default matcher and
    /// an empty registry.
    pub fn new(actions: ActionCatalog, jobs: JobCatalog, launcher: BatchLauncher) -> Self {
        Self {
            actions,
            jobs,
            registry: JobRegistry::new(),
            launcher,
            matcher: Box::new(GlobMatcher),
            engine: None,
            dry_run: false,
        }
    }

    /// Build the catalogs, packages and dry-run flag from configuration.
    ///
    /// The configured engine name is recorded; callables are only
    /// registered once an adapter is attached with [`Broker::with_engine`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let (actions, jobs) = config.catalogs()?;
        let launcher = BatchLauncher::new(
            PackageSet::new(config.packages.clone()),
            config.broker.sid_root.clone(),
        );
        let mut broker = Self::new(actions, jobs, launcher).with_dry_run(config.broker.dry_run);
        broker.engine = config.broker.engine.clone();
        Ok(broker)
    }

    /// Attach a host engine: its callables are registered and its name
    /// becomes [`Broker::engine`].
    pub fn with_engine(mut self, adapter: &dyn EngineAdapter) -> Self {
        adapter.register_jobs(&mut self.registry);
        tracing::debug!(
            engine = %adapter.name(),
            callables = ?self.registry.keys().collect::<Vec<_>>(),
            "Attached engine"
        );
        self.engine = Some(adapter.name().clone());
        self
    }

    /// Replace the Sid matcher.
    pub fn with_matcher(mut self, matcher: impl SidMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    /// Resolve jobs without invoking or spawning anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Callables available to `call` jobs.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut JobRegistry {
        &mut self.registry
    }

    pub fn actions(&self) -> &ActionCatalog {
        &self.actions
    }

    pub fn jobs(&self) -> &JobCatalog {
        &self.jobs
    }

    pub fn launcher(&self) -> &BatchLauncher {
        &self.launcher
    }

    /// The host engine, if one is configured or attached.
    ///
    /// Pass it to [`Broker::run_action_for_engine`] to restrict dispatch to
    /// jobs that run in this engine.
    pub fn engine(&self) -> Option<&EngineName> {
        self.engine.as_ref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("actions", &self.actions.len())
            .field("jobs", &self.jobs.len())
            .field("registry", &self.registry)
            .field("engine", &self.engine)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
