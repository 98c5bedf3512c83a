//! Engines embedded in a DCC host application (Maya, Houdini, Nuke).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sidbroker_common::error::BoxError;
use sidbroker_common::EngineName;
use sidbroker_sid::Sid;

use super::generic::{existing_path, GenericEngine};
use super::{EngineAdapter, EngineKind};
use crate::registry::{JobArgs, JobRegistry};

/// The live session of a host application.
///
/// The host integration supplies this; sidbroker never talks to a DCC
/// directly.
pub trait SceneHost: Send + Sync {
    /// Open the scene file at `path`, replacing the current one.
    fn open_scene(&self, path: &Path) -> Result<(), BoxError>;

    /// Path of the scene currently open, if it has been saved.
    fn scene_path(&self) -> Option<PathBuf>;

    /// Whether the host runs without a user interface.
    fn is_batch(&self) -> bool;
}

/// Stand-in for a host engine selected by configuration while running
/// outside the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl SceneHost for DetachedHost {
    fn open_scene(&self, path: &Path) -> Result<(), BoxError> {
        Err(format!("no host session attached to open {}", path.display()).into())
    }

    fn scene_path(&self) -> Option<PathBuf> {
        None
    }

    fn is_batch(&self) -> bool {
        true
    }
}

/// Adapter for a DCC host.
///
/// Registers `<engine>.open`, which hands the Sid's scene file to the
/// host, plus the generic `python.*` callables.
#[derive(Clone)]
pub struct HostEngine {
    kind: EngineKind,
    name: EngineName,
    implements: BTreeSet<String>,
    generic: GenericEngine,
    host: Arc<dyn SceneHost>,
}

impl HostEngine {
    pub fn new(kind: EngineKind, sid_root: impl Into<PathBuf>, host: Arc<dyn SceneHost>) -> Self {
        Self {
            kind,
            name: kind.engine_name(),
            implements: ["explore", "open"].iter().map(|a| a.to_string()).collect(),
            generic: GenericEngine::new(sid_root),
            host,
        }
    }

    /// Replace the generic engine used for `python.*` callables.
    pub fn with_generic(mut self, generic: GenericEngine) -> Self {
        self.generic = generic;
        self
    }

    /// Registry key of this host's scene-open callable.
    pub fn open_key(&self) -> String {
        format!("{}.open", self.name)
    }
}

impl EngineAdapter for HostEngine {
    fn name(&self) -> &EngineName {
        &self.name
    }

    fn display_name(&self) -> &str {
        self.kind.display_name()
    }

    fn implements(&self) -> &BTreeSet<String> {
        &self.implements
    }

    fn current_sid(&self) -> Option<Sid> {
        let path = self.host.scene_path()?;
        match Sid::from_path(self.generic.sid_root(), &path) {
            Ok(sid) => Some(sid),
            Err(e) => {
                tracing::debug!(path = %path.display(), "Current scene has no Sid: {}", e);
                None
            }
        }
    }

    fn is_batch(&self) -> bool {
        self.host.is_batch()
    }

    fn register_jobs(&self, registry: &mut JobRegistry) {
        self.generic.register_generic(registry);

        let root = self.generic.sid_root().to_path_buf();
        let host = Arc::clone(&self.host);
        let engine = self.name.clone();
        registry.register(self.open_key(), move |sid: &Sid, _args: &JobArgs| {
            let path = existing_path(sid, &root)?;
            tracing::info!(engine = %engine, sid = %sid, path = %path.display(), "Opening scene");
            host.open_scene(&path)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidbroker_common::DispatchId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeHost {
        opened: Mutex<Vec<PathBuf>>,
        scene: Option<PathBuf>,
    }

    impl SceneHost for FakeHost {
        fn open_scene(&self, path: &Path) -> Result<(), BoxError> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn scene_path(&self) -> Option<PathBuf> {
            self.scene.clone()
        }

        fn is_batch(&self) -> bool {
            false
        }
    }

    fn args() -> JobArgs {
        JobArgs {
            dispatch: DispatchId::new(),
            job: "open_maya_scene".into(),
            command: None,
            path: None,
        }
    }

    #[test]
    fn open_hands_scene_to_host() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("PROJ/A/CHAR/HERO/MOD/V001");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("W.maya"), b"").unwrap();

        let host = Arc::new(FakeHost::default());
        let engine = HostEngine::new(EngineKind::Maya, root.path(), host.clone());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);
        assert!(registry.contains("maya.open"));
        assert!(registry.contains(GenericEngine::EXPLORE_KEY));

        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/maya").unwrap();
        (registry.get("maya.open").unwrap())(&sid, &args()).unwrap();
        assert_eq!(*host.opened.lock().unwrap(), vec![dir.join("W.maya")]);
    }

    #[test]
    fn open_refuses_missing_scene() {
        let root = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::default());
        let engine = HostEngine::new(EngineKind::Houdini, root.path(), host.clone());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);

        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/hou").unwrap();
        assert!((registry.get("hou.open").unwrap())(&sid, &args()).is_err());
        assert!(host.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn current_sid_comes_from_scene_path() {
        let host = Arc::new(FakeHost {
            scene: Some(PathBuf::from("/prod/PROJ/S/SQ010/SH0020/LAY/V002/W.hou")),
            ..Default::default()
        });
        let engine = HostEngine::new(EngineKind::Houdini, "/prod", host);
        assert_eq!(
            engine.current_sid().map(|s| s.to_string()),
            Some("PROJ/S/SQ010/SH0020/LAY/V002/W/hou".to_string())
        );
        assert!(!engine.is_batch());
    }

    #[test]
    fn scene_outside_root_has_no_sid() {
        let host = Arc::new(FakeHost {
            scene: Some(PathBuf::from("/tmp/untitled.ma")),
            ..Default::default()
        });
        let engine = HostEngine::new(EngineKind::Maya, "/prod", host);
        assert!(engine.current_sid().is_none());
    }

    #[test]
    fn detached_host_cannot_open() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("PROJ/A/CHAR/HERO/MOD/V001");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("W.nk"), b"").unwrap();

        let engine = HostEngine::new(EngineKind::Nuke, root.path(), Arc::new(DetachedHost));
        assert!(engine.is_batch());
        let mut registry = JobRegistry::new();
        engine.register_jobs(&mut registry);
        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/nk").unwrap();
        let err = (registry.get("nk.open").unwrap())(&sid, &args()).unwrap_err();
        assert!(err.to_string().contains("no host session"));
    }
}
