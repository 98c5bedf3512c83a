//! Action descriptors and their precedence tiers.

use serde::{Deserialize, Serialize};
use sidbroker_common::EngineName;
use std::collections::BTreeSet;

/// Precedence level of an action rule.
///
/// Variants are declared in lookup order: engine-specific rules come
/// first, universal rules last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Requires a pattern match and, when filtering by engine, an engine match.
    Engine,
    /// Requires a pattern match only.
    #[default]
    Global,
    /// Always applies.
    Universal,
}

impl Tier {
    /// Lowercase name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Engine => "engine",
            Tier::Global => "global",
            Tier::Universal => "universal",
        }
    }
}

/// A user-facing action offered for matching Sids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    /// Action key, shared with the job table.
    pub name: String,
    /// Display text; falls back to `name` when empty.
    #[serde(default)]
    pub label: String,
    /// Tooltip text.
    #[serde(default)]
    pub description: String,
    /// Precedence tier.
    #[serde(default)]
    pub tier: Tier,
    /// Higher values come first within a tier.
    #[serde(default)]
    pub priority: i32,
    /// Sid patterns; the rule applies when any of them matches.
    #[serde(rename = "match", default)]
    pub patterns: Vec<String>,
    /// Engines the rule is valid for (engine tier only).
    #[serde(default)]
    pub engine: BTreeSet<EngineName>,
}

impl ActionRule {
    /// Create a rule in `tier` with the given patterns.
    pub fn new(name: impl Into<String>, tier: Tier, patterns: &[&str]) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            description: String::new(),
            tier,
            priority: 0,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            engine: BTreeSet::new(),
        }
    }

    /// Builder: set the engines this rule is valid for.
    pub fn with_engines(mut self, engines: &[&str]) -> Self {
        self.engine = engines
            .iter()
            .filter_map(|e| EngineName::new(e).ok())
            .collect();
        self
    }

    /// Builder: set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder: set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Display label, defaulting to the action name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// Whether the rule's engine set contains `engine`.
    pub fn supports_engine(&self, engine: &EngineName) -> bool {
        self.engine.contains(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_engine_first() {
        let mut tiers = vec![Tier::Universal, Tier::Engine, Tier::Global];
        tiers.sort();
        assert_eq!(tiers, vec![Tier::Engine, Tier::Global, Tier::Universal]);
    }

    #[test]
    fn deserializes_from_toml() {
        let rule: ActionRule = toml::from_str(
            r#"
            name = "open"
            label = "Open"
            tier = "engine"
            match = ["*/A/**", "*/S/**"]
            engine = ["Maya", "hou"]
            "#,
        )
        .unwrap();
        assert_eq!(rule.tier, Tier::Engine);
        assert_eq!(rule.patterns.len(), 2);
        assert!(rule.supports_engine(&EngineName::new("maya").unwrap()));
        assert!(!rule.supports_engine(&EngineName::new("nk").unwrap()));
        assert_eq!(rule.priority, 0);
    }

    #[test]
    fn engine_must_be_a_list() {
        let result: Result<ActionRule, _> = toml::from_str(
            r#"
            name = "open"
            tier = "engine"
            match = ["*"]
            engine = 3
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn label_falls_back_to_name() {
        let rule = ActionRule::new("explore", Tier::Universal, &[]);
        assert_eq!(rule.display_label(), "explore");
        assert_eq!(rule.with_label("Explore").display_label(), "Explore");
    }
}
