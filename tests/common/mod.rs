//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a [`Broker`] over the built-in
//! catalog (or a custom config) and replaces the engine callables with
//! recorders so dispatches can be observed without a host application.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use sidbroker::config::Config;
use sidbroker::Broker;
use sidbroker_common::EngineName;
use sidbroker_rules::{ActionRule, JobRule};
use sidbroker_sid::Sid;

/// One recorded callable invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub key: String,
    pub job: String,
    pub sid: String,
    pub command: Option<String>,
}

/// Broker plus the log of callables it invoked.
pub struct TestHarness {
    pub broker: Broker,
    pub calls: Arc<Mutex<Vec<Call>>>,
}

/// Keys of the callables the built-in catalog refers to.
pub const CALLABLE_KEYS: &[&str] = &["maya.open", "hou.open", "python.explore", "python.open"];

impl TestHarness {
    /// Built-in catalog, no engine filter.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut broker = Broker::from_config(&config).expect("config should be valid");
        let calls = Arc::new(Mutex::new(Vec::new()));
        for key in CALLABLE_KEYS {
            let log = Arc::clone(&calls);
            let key_name = key.to_string();
            broker.registry_mut().register(*key, move |sid, args| {
                log.lock().unwrap().push(Call {
                    key: key_name.clone(),
                    job: args.job.clone(),
                    sid: sid.to_string(),
                    command: args.command.clone(),
                });
                Ok(())
            });
        }
        Self { broker, calls }
    }

    /// Config with the given sid root and the built-in catalog.
    pub fn with_root(root: &Path) -> Self {
        let mut config = Config::default();
        config.broker.sid_root = root.to_path_buf();
        Self::with_config(config)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn sid(s: &str) -> Sid {
    Sid::parse(s).expect("valid sid")
}

pub fn engine(name: &str) -> EngineName {
    EngineName::new(name).expect("valid engine name")
}

pub fn action_names(actions: &[&ActionRule]) -> Vec<String> {
    actions.iter().map(|a| a.name.clone()).collect()
}

pub fn job_names(jobs: &[&JobRule]) -> Vec<String> {
    jobs.iter().map(|j| j.name.clone()).collect()
}

pub const MAYA_SCENE: &str = "PROJ/A/CHAR/HERO/MOD/V001/W/maya";
pub const HOU_SCENE: &str = "PROJ/A/CHAR/HERO/MOD/V001/W/hou";
pub const MOVIE: &str = "PROJ/S/SQ010/SH0020/ANI/V003/W/movie";
