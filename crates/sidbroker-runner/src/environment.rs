//! Runtime package definitions and their resolution into a process environment.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};
use crate::template::TemplateContext;

/// A named fragment of a job's runtime environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDefinition {
    /// Install location, available to `env` and `path` as `{root}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Directories prepended to `PATH`.
    #[serde(default)]
    pub path: Vec<String>,
    /// Packages this one depends on.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Environment variables to set.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// The packages known to the runner, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    packages: BTreeMap<String, PackageDefinition>,
}

impl PackageSet {
    pub fn new(packages: BTreeMap<String, PackageDefinition>) -> Self {
        Self { packages }
    }

    pub fn get(&self, name: &str) -> Option<&PackageDefinition> {
        self.packages.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check that every package's requirements resolve.
    pub fn validate(&self) -> Result<()> {
        for name in self.packages.keys() {
            self.resolve(std::slice::from_ref(name), &format!("package '{name}'"))?;
        }
        Ok(())
    }

    /// Resolve `requires` (and their transitive requirements) into an
    /// environment. Dependencies are applied before the packages that need
    /// them, so a dependent's variables and `PATH` entries win.
    ///
    /// `requested_by` names the requester in error messages.
    pub fn resolve(&self, requires: &[String], requested_by: &str) -> Result<ResolvedEnvironment> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut stack = Vec::new();
        for name in requires {
            self.visit(name, requested_by, &mut stack, &mut done, &mut order)?;
        }

        let mut resolved = ResolvedEnvironment::default();
        for name in order {
            // `visit` only yields defined packages.
            let Some(package) = self.packages.get(&name) else {
                continue;
            };
            let mut ctx = TemplateContext::new().with_var("name", &name);
            if let Some(root) = &package.root {
                ctx.set("root", &root.display().to_string());
            }
            for (key, value) in &package.env {
                resolved.vars.insert(key.clone(), ctx.substitute(value));
            }
            let mut dirs = Vec::with_capacity(package.path.len());
            for dir in &package.path {
                let entry = PathBuf::from(ctx.substitute(dir));
                if let Err(source) = std::env::join_paths([&entry]) {
                    return Err(RunnerError::InvalidPathEntry {
                        package: name,
                        entry,
                        source,
                    });
                }
                dirs.push(entry);
            }
            dirs.append(&mut resolved.path);
            resolved.path = dirs;
            resolved.packages.push(name);
        }

        tracing::debug!(
            requested_by,
            packages = ?resolved.packages,
            "Resolved runtime environment"
        );
        Ok(resolved)
    }

    fn visit(
        &self,
        name: &str,
        required_by: &str,
        stack: &mut Vec<String>,
        done: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if stack.iter().any(|entry| entry == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(RunnerError::PackageCycle {
                package: name.to_string(),
                chain: chain.join(" -> "),
            });
        }
        let package = self
            .packages
            .get(name)
            .ok_or_else(|| RunnerError::UnknownPackage {
                package: name.to_string(),
                required_by: required_by.to_string(),
            })?;

        stack.push(name.to_string());
        let requester = format!("package '{name}'");
        for dep in &package.requires {
            self.visit(dep, &requester, stack, done, order)?;
        }
        stack.pop();

        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }
}

/// Variables and search path produced by resolving a job's packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    /// Package names in application order.
    pub packages: Vec<String>,
    pub vars: BTreeMap<String, String>,
    /// Directories to search before the inherited `PATH`, highest precedence first.
    pub path: Vec<PathBuf>,
}

impl ResolvedEnvironment {
    /// `PATH` value combining the package directories with `inherited`.
    ///
    /// # Errors
    ///
    /// [`RunnerError::SearchPath`] names the first directory that cannot be
    /// joined into a `PATH`.
    pub fn search_path(&self, inherited: Option<OsString>) -> Result<OsString> {
        let mut dirs = self.path.clone();
        if let Some(inherited) = inherited {
            dirs.extend(std::env::split_paths(&inherited));
        }
        for entry in &dirs {
            if let Err(source) = std::env::join_paths([entry]) {
                return Err(RunnerError::SearchPath {
                    entry: entry.clone(),
                    source,
                });
            }
        }
        std::env::join_paths(&dirs).map_err(|source| RunnerError::SearchPath {
            entry: PathBuf::new(),
            source,
        })
    }

    /// Apply variables and `PATH` to a command about to be spawned.
    pub fn apply(&self, command: &mut Command, search_path: &OsString) {
        command.envs(&self.vars);
        command.env("PATH", search_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(requires: &[&str]) -> PackageDefinition {
        PackageDefinition {
            requires: requires.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    fn set(entries: Vec<(&str, PackageDefinition)>) -> PackageSet {
        PackageSet::new(
            entries
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let packages = set(vec![
            ("pipe_maya", package(&["maya", "pipe_core"])),
            ("maya", package(&["pipe_core"])),
            ("pipe_core", package(&[])),
        ]);
        let env = packages.resolve(&names(&["pipe_maya"]), "job 'open'").unwrap();
        assert_eq!(env.packages, vec!["pipe_core", "maya", "pipe_maya"]);
    }

    #[test]
    fn unknown_package_names_requester() {
        let packages = set(vec![("pipe_maya", package(&["maya"]))]);
        let err = packages
            .resolve(&names(&["pipe_maya"]), "job 'open'")
            .unwrap_err();
        match err {
            RunnerError::UnknownPackage {
                package,
                required_by,
            } => {
                assert_eq!(package, "maya");
                assert_eq!(required_by, "package 'pipe_maya'");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn cycles_are_reported() {
        let packages = set(vec![("a", package(&["b"])), ("b", package(&["a"]))]);
        let err = packages.resolve(&names(&["a"]), "job 'x'").unwrap_err();
        assert!(matches!(err, RunnerError::PackageCycle { ref chain, .. } if chain == "a -> b -> a"));
        assert!(packages.validate().is_err());
    }

    #[test]
    fn root_is_substituted_and_dependents_win() {
        let mut core = package(&[]);
        core.root = Some(PathBuf::from("/opt/core"));
        core.env.insert("PIPE_LEVEL".into(), "core".into());
        core.path.push("{root}/bin".into());

        let mut djv = package(&["core"]);
        djv.root = Some(PathBuf::from("/opt/djv"));
        djv.env.insert("PIPE_LEVEL".into(), "djv".into());
        djv.env.insert("DJV_HOME".into(), "{root}".into());
        djv.path.push("{root}/bin".into());

        let packages = set(vec![("core", core), ("djv", djv)]);
        let env = packages.resolve(&names(&["djv"]), "job 'play'").unwrap();
        assert_eq!(env.vars["PIPE_LEVEL"], "djv");
        assert_eq!(env.vars["DJV_HOME"], "/opt/djv");
        assert_eq!(
            env.path,
            vec![PathBuf::from("/opt/djv/bin"), PathBuf::from("/opt/core/bin")]
        );
    }

    #[test]
    fn search_path_appends_inherited() {
        let env = ResolvedEnvironment {
            path: vec![PathBuf::from("/opt/djv/bin")],
            ..Default::default()
        };
        let joined = env.search_path(Some(OsString::from("/usr/bin"))).unwrap();
        let dirs: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(dirs, vec![PathBuf::from("/opt/djv/bin"), PathBuf::from("/usr/bin")]);
    }

    #[cfg(unix)]
    #[test]
    fn path_entry_with_separator_names_package() {
        let mut djv = package(&[]);
        djv.root = Some(PathBuf::from("/opt/djv:2"));
        djv.path.push("{root}/bin".into());
        let packages = set(vec![("djv", djv), ("pipe", package(&["djv"]))]);

        let err = packages.resolve(&names(&["pipe"]), "job 'play'").unwrap_err();
        match &err {
            RunnerError::InvalidPathEntry { package, entry, .. } => {
                assert_eq!(package, "djv");
                assert_eq!(entry, &PathBuf::from("/opt/djv:2/bin"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("djv"));
        assert!(packages.validate().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn search_path_reports_bad_entry() {
        let env = ResolvedEnvironment {
            path: vec![PathBuf::from("/opt/a:b")],
            ..Default::default()
        };
        let err = env.search_path(None).unwrap_err();
        assert!(matches!(err, RunnerError::SearchPath { ref entry, .. } if entry == &PathBuf::from("/opt/a:b")));
    }

    #[test]
    fn deserializes_package_table() {
        let def: PackageDefinition = toml::from_str(
            r#"
            root = "/opt/pipe/maya"
            env = { MAYA_MODULE_PATH = "{root}/modules" }
            path = ["{root}/bin"]
            "#,
        )
        .unwrap();
        assert_eq!(def.root, Some(PathBuf::from("/opt/pipe/maya")));
        assert!(def.requires.is_empty());
    }
}
