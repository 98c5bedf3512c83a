use sidbroker_common::{EngineName, Error, Result};
use sidbroker_rules::{ActionRule, Tier};
use sidbroker_sid::Sid;

use super::Broker;

impl Broker {
    /// Actions applicable to `sid`, in catalog order.
    ///
    /// Engine-tier rules need a pattern match and, when `engine` is given,
    /// must list that engine. Global rules need a pattern match. Universal
    /// rules always apply. Names are not deduplicated across tiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the rule, Sid and engine when
    /// the matcher rejects one of the rule's patterns.
    pub fn get_actions(&self, sid: &Sid, engine: Option<&EngineName>) -> Result<Vec<&ActionRule>> {
        let mut found = Vec::new();
        for rule in self.actions.rules() {
            let applies = match rule.tier {
                Tier::Universal => true,
                Tier::Engine => {
                    engine.map_or(true, |e| rule.supports_engine(e))
                        && self.rule_matches(rule, sid, engine)?
                }
                Tier::Global => self.rule_matches(rule, sid, engine)?,
            };
            if applies {
                found.push(rule);
            }
        }

        tracing::debug!(
            sid = %sid,
            engine = engine.map(EngineName::as_str).unwrap_or("-"),
            actions = ?found.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Resolved actions"
        );
        Ok(found)
    }

    fn rule_matches(&self, rule: &ActionRule, sid: &Sid, engine: Option<&EngineName>) -> Result<bool> {
        self.matcher.matches_any(sid, &rule.patterns).map_err(|e| {
            Error::configuration(
                format!(
                    "{} action '{}' for sid '{}' (engine: {})",
                    rule.tier.as_str(),
                    rule.name,
                    sid,
                    engine.map(EngineName::as_str).unwrap_or("none")
                ),
                e.to_string(),
            )
        })
    }
}
