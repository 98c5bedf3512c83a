//! The engine used outside any host application.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sidbroker_common::error::BoxError;
use sidbroker_common::EngineName;
use sidbroker_sid::Sid;

use super::{EngineAdapter, EngineKind};
use crate::registry::{JobArgs, JobRegistry};

/// Opens a path with whatever the desktop associates with it.
pub type PathOpener = dyn Fn(&Path) -> std::io::Result<()> + Send + Sync;

/// Plain-process engine: explores folders and opens files with the
/// platform opener.
///
/// Registers `python.explore` and `python.open`.
#[derive(Clone)]
pub struct GenericEngine {
    name: EngineName,
    implements: BTreeSet<String>,
    sid_root: PathBuf,
    current: Option<Sid>,
    opener: Arc<PathOpener>,
}

impl GenericEngine {
    pub const EXPLORE_KEY: &'static str = "python.explore";
    pub const OPEN_KEY: &'static str = "python.open";

    pub fn new(sid_root: impl Into<PathBuf>) -> Self {
        Self {
            name: EngineKind::Python.engine_name(),
            implements: ["explore", "open"].iter().map(|a| a.to_string()).collect(),
            sid_root: sid_root.into(),
            current: None,
            opener: Arc::new(|path: &Path| open::that(path)),
        }
    }

    /// Replace the platform opener.
    pub fn with_opener<F>(mut self, opener: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<()> + Send + Sync + 'static,
    {
        self.opener = Arc::new(opener);
        self
    }

    /// Set the Sid reported by [`EngineAdapter::current_sid`].
    pub fn with_current(mut self, sid: Sid) -> Self {
        self.current = Some(sid);
        self
    }

    pub fn sid_root(&self) -> &Path {
        &self.sid_root
    }

    /// Register the generic callables under their `python.*` keys.
    ///
    /// Host engines call this too, so `explore` works in every engine.
    pub(crate) fn register_generic(&self, registry: &mut JobRegistry) {
        let root = self.sid_root.clone();
        let opener = Arc::clone(&self.opener);
        registry.register(Self::EXPLORE_KEY, move |sid: &Sid, _args: &JobArgs| {
            let path = existing_path(sid, &root)?;
            let folder = if sid.has_ext() || path.is_file() {
                path.parent().map(Path::to_path_buf).unwrap_or(path)
            } else {
                path
            };
            tracing::info!(sid = %sid, folder = %folder.display(), "Exploring");
            opener(&folder).map_err(BoxError::from)
        });

        let root = self.sid_root.clone();
        let opener = Arc::clone(&self.opener);
        registry.register(Self::OPEN_KEY, move |sid: &Sid, _args: &JobArgs| {
            let path = existing_path(sid, &root)?;
            tracing::info!(sid = %sid, path = %path.display(), "Opening with platform opener");
            opener(&path).map_err(BoxError::from)
        });
    }
}

/// The Sid's path under `root`, failing when it is not on disk.
pub(crate) fn existing_path(sid: &Sid, root: &Path) -> Result<PathBuf, BoxError> {
    let path = sid.to_path(root)?;
    if !path.exists() {
        tracing::warn!(sid = %sid, path = %path.display(), "Path does not exist");
        return Err(format!("path does not exist: {}", path.display()).into());
    }
    Ok(path)
}

impl EngineAdapter for GenericEngine {
    fn name(&self) -> &EngineName {
        &self.name
    }

    fn display_name(&self) -> &str {
        EngineKind::Python.display_name()
    }

    fn implements(&self) -> &BTreeSet<String> {
        &self.implements
    }

    fn current_sid(&self) -> Option<Sid> {
        self.current.clone()
    }

    fn is_batch(&self) -> bool {
        false
    }

    fn register_jobs(&self, registry: &mut JobRegistry) {
        self.register_generic(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidbroker_common::DispatchId;
    use std::sync::Mutex;

    fn recording_engine(root: &Path) -> (GenericEngine, Arc<Mutex<Vec<PathBuf>>>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&opened);
        let engine = GenericEngine::new(root).with_opener(move |path| {
            log.lock().unwrap().push(path.to_path_buf());
            Ok(())
        });
        (engine, opened)
    }

    fn args(job: &str) -> JobArgs {
        JobArgs {
            dispatch: DispatchId::new(),
            job: job.into(),
            command: None,
            path: None,
        }
    }

    #[test]
    fn explore_opens_folder_of_file_sid() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("PROJ/A/CHAR/HERO/MOD/V001");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("W.maya"), b"").unwrap();

        let (engine, opened) = recording_engine(root.path());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);

        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/maya").unwrap();
        (registry.get(GenericEngine::EXPLORE_KEY).unwrap())(&sid, &args("explore")).unwrap();
        assert_eq!(*opened.lock().unwrap(), vec![dir]);
    }

    #[test]
    fn explore_opens_directory_sid_itself() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("PROJ/A/CHAR");
        std::fs::create_dir_all(&dir).unwrap();

        let (engine, opened) = recording_engine(root.path());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);

        let sid = Sid::parse("PROJ/A/CHAR").unwrap();
        (registry.get(GenericEngine::EXPLORE_KEY).unwrap())(&sid, &args("explore")).unwrap();
        assert_eq!(*opened.lock().unwrap(), vec![dir]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let (engine, opened) = recording_engine(root.path());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);

        let sid = Sid::parse("PROJ/S/SQ010").unwrap();
        let err = (registry.get(GenericEngine::OPEN_KEY).unwrap())(&sid, &args("open")).unwrap_err();
        assert!(err.to_string().contains("path does not exist"));
        assert!(opened.lock().unwrap().is_empty());
    }

    #[test]
    fn reports_identity() {
        let engine = GenericEngine::new("/prod");
        assert_eq!(engine.name().as_str(), "python");
        assert!(engine.implements().contains("explore"));
        assert!(engine.implements().contains("open"));
        assert!(!engine.is_batch());
        assert!(engine.current_sid().is_none());
        let sid = Sid::parse("PROJ/A").unwrap();
        assert_eq!(engine.with_current(sid.clone()).current_sid(), Some(sid));
    }
}
