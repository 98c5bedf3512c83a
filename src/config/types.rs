use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use sidbroker_common::{EngineName, Result};
use sidbroker_rules::{ActionCatalog, ActionRule, JobCatalog, JobRule};
use sidbroker_runner::{PackageDefinition, PackageSet};

use super::defaults;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Action catalog, all tiers in one list.
    #[serde(default)]
    pub actions: Vec<ActionRule>,

    #[serde(default)]
    pub jobs: Vec<JobRule>,

    /// Runtime packages batch jobs may require.
    #[serde(default)]
    pub packages: BTreeMap<String, PackageDefinition>,
}

impl Default for Config {
    /// The built-in catalog.
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            actions: defaults::actions(),
            jobs: defaults::jobs(),
            packages: defaults::packages(),
        }
    }
}

impl Config {
    /// Validate the records and build the ordered catalogs.
    pub fn catalogs(&self) -> Result<(ActionCatalog, JobCatalog)> {
        let actions = ActionCatalog::new(self.actions.clone())?;
        let jobs = JobCatalog::new(self.jobs.clone())?;
        Ok((actions, jobs))
    }

    pub fn package_set(&self) -> PackageSet {
        PackageSet::new(self.packages.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Root directory Sids map to on disk.
    #[serde(default = "default_sid_root")]
    pub sid_root: PathBuf,

    /// Engine to use instead of detecting it from the executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineName>,

    /// Resolve jobs without running them.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_sid_root() -> PathBuf {
    PathBuf::from("/prod")
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            sid_root: default_sid_root(),
            engine: None,
            dry_run: false,
        }
    }
}
