//! Host engine adapters.
//!
//! An engine is the application the broker runs inside (Maya, Houdini,
//! Nuke, or a plain process). Each adapter reports its identity and
//! registers the job callables it can serve into a [`JobRegistry`].

mod generic;
mod host;

pub use generic::{GenericEngine, PathOpener};
pub use host::{DetachedHost, HostEngine, SceneHost};

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use sidbroker_common::{EngineName, Error, Result};
use sidbroker_sid::Sid;

use crate::registry::JobRegistry;

/// The contract every host engine fulfills.
pub trait EngineAdapter: Send + Sync {
    /// Lowercase engine key used by action and job filters.
    fn name(&self) -> &EngineName;

    /// Human-readable engine name.
    fn display_name(&self) -> &str;

    /// Actions this engine can perform.
    fn implements(&self) -> &BTreeSet<String>;

    /// The Sid of the document open in the host, if any.
    fn current_sid(&self) -> Option<Sid>;

    /// Whether the host runs without a user interface.
    fn is_batch(&self) -> bool;

    /// Register the callables this engine serves.
    fn register_jobs(&self, registry: &mut JobRegistry);
}

/// The engines sidbroker knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Maya,
    Houdini,
    Nuke,
    Python,
}

impl EngineKind {
    /// Engine key as used in catalogs.
    pub fn key(&self) -> &'static str {
        match self {
            EngineKind::Maya => "maya",
            EngineKind::Houdini => "hou",
            EngineKind::Nuke => "nk",
            EngineKind::Python => "python",
        }
    }

    pub fn engine_name(&self) -> EngineName {
        EngineName::from_static(self.key())
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::Maya => "Maya",
            EngineKind::Houdini => "Houdini",
            EngineKind::Nuke => "Nuke",
            EngineKind::Python => "Python",
        }
    }

    /// Parse an engine key or display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "maya" => Some(EngineKind::Maya),
            "hou" | "houdini" => Some(EngineKind::Houdini),
            "nk" | "nuke" => Some(EngineKind::Nuke),
            "python" => Some(EngineKind::Python),
            _ => None,
        }
    }
}

/// Guess the engine from the path of the running executable.
pub fn detect(executable: &Path) -> EngineKind {
    let name = executable
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if name.contains("hou") {
        EngineKind::Houdini
    } else if name.contains("maya") {
        EngineKind::Maya
    } else if name.to_lowercase().contains("nuke") {
        EngineKind::Nuke
    } else {
        EngineKind::Python
    }
}

/// Build the adapter for `kind`.
///
/// Host engines created here have no live session attached; their scene
/// operations fail until a [`SceneHost`] is provided with
/// [`HostEngine::new`].
pub fn adapter(kind: EngineKind, sid_root: &Path) -> Box<dyn EngineAdapter> {
    match kind {
        EngineKind::Python => Box::new(GenericEngine::new(sid_root)),
        host => Box::new(HostEngine::new(host, sid_root, Arc::new(DetachedHost))),
    }
}

/// The adapter for the configured engine, or the detected one.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when `configured` names no known engine.
pub fn select(configured: Option<&EngineName>, sid_root: &Path) -> Result<Box<dyn EngineAdapter>> {
    let kind = match configured {
        Some(name) => EngineKind::from_name(name.as_str()).ok_or_else(|| {
            Error::configuration("broker.engine", format!("unknown engine '{name}'"))
        })?,
        None => {
            let exe = std::env::current_exe().unwrap_or_default();
            let kind = detect(&exe);
            tracing::debug!(executable = %exe.display(), engine = kind.key(), "Detected engine");
            kind
        }
    };
    Ok(adapter(kind, sid_root))
}
