//! Explicit table of in-process job callables, keyed by the `call` field of a job.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use sidbroker_common::error::BoxError;
use sidbroker_common::DispatchId;
use sidbroker_sid::Sid;

/// Arguments handed to a job callable alongside the Sid.
#[derive(Debug, Clone)]
pub struct JobArgs {
    pub dispatch: DispatchId,
    /// Name of the job being dispatched.
    pub job: String,
    /// The job's batch command, when it declares one next to `call`.
    pub command: Option<String>,
    /// The Sid's filesystem path, when it has one.
    pub path: Option<PathBuf>,
}

/// A registered job callable.
pub type JobFn = dyn Fn(&Sid, &JobArgs) -> Result<(), BoxError> + Send + Sync;

/// Registered job callables.
#[derive(Clone, Default)]
pub struct JobRegistry {
    callables: BTreeMap<String, Arc<JobFn>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callable` under `key`, replacing any previous entry.
    pub fn register<F>(&mut self, key: impl Into<String>, callable: F)
    where
        F: Fn(&Sid, &JobArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let key = key.into();
        if self.callables.insert(key.clone(), Arc::new(callable)).is_some() {
            tracing::debug!(key = %key, "Replaced job callable");
        }
    }

    pub fn get(&self, key: &str) -> Option<&JobFn> {
        self.callables.get(key).map(|f| f.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.callables.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.callables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.callables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callables.is_empty()
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.callables.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn args() -> JobArgs {
        JobArgs {
            dispatch: DispatchId::new(),
            job: "explore".into(),
            command: None,
            path: None,
        }
    }

    #[test]
    fn register_and_invoke() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = JobRegistry::new();
        registry.register("python.explore", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let sid = Sid::parse("PROJ/A/CHAR").unwrap();
        let callable = registry.get("python.explore").unwrap();
        callable(&sid, &args()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.get("maya.open").is_none());
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = JobRegistry::new();
        registry.register("python.open", |_, _| Err("first".into()));
        registry.register("python.open", |_, _| Ok(()));
        let sid = Sid::parse("PROJ").unwrap();
        assert!((registry.get("python.open").unwrap())(&sid, &args()).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn debug_lists_keys() {
        let mut registry = JobRegistry::new();
        registry.register("hou.open", |_, _| Ok(()));
        registry.register("python.explore", |_, _| Ok(()));
        assert_eq!(format!("{registry:?}"), r#"{"hou.open", "python.explore"}"#);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["hou.open", "python.explore"]);
    }
}
