//! Host engine identity.
//!
//! An [`EngineName`] is the lowercase key a host adapter reports for itself
//! (`maya`, `hou`, `nk`, `python`). The broker only ever uses it as a
//! set-membership filter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Lowercase name of a host engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EngineName(String);

impl EngineName {
    /// Wildcard engine accepted by job records that run anywhere.
    pub const ALL: &'static str = "all";

    /// Create an engine name, trimming and lowercasing the input.
    pub fn new(name: impl AsRef<str>) -> crate::Result<Self> {
        let name = name.as_ref().trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::configuration("engine", "engine name cannot be empty"));
        }
        Ok(Self(name))
    }

    /// The engine name for a built-in engine key.
    ///
    /// `key` must already be lowercase and non-empty, as the engine keys
    /// (`"maya"`, `"hou"`, `"nk"`, `"python"`) are.
    pub fn from_static(key: &'static str) -> Self {
        debug_assert!(!key.is_empty() && key == key.to_lowercase());
        Self(key.to_string())
    }

    /// The engine name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `all` wildcard.
    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EngineName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EngineName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EngineName> for String {
    fn from(name: EngineName) -> Self {
        name.0
    }
}

impl AsRef<str> for EngineName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
