//! Validated, ordered collections of action and job rules.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use sidbroker_common::{EngineName, Error, Result};
use sidbroker_sid::SidPattern;

use crate::action::{ActionRule, Tier};
use crate::job::JobRule;

fn check_patterns(context: &str, patterns: &[String], allow_all: bool) -> Result<()> {
    for pattern in patterns {
        if allow_all && pattern == JobRule::MATCH_ALL {
            continue;
        }
        SidPattern::parse(pattern).map_err(|e| Error::configuration(context, e.to_string()))?;
    }
    Ok(())
}

/// Action rules in lookup order.
///
/// Rules are sorted once on construction: by tier (engine, global,
/// universal), then priority descending. Rules with equal tier and
/// priority keep their declaration order.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    rules: Vec<ActionRule>,
}

impl ActionCatalog {
    /// Validate and order the rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when a rule has no name, an
    /// engine-tier rule has no patterns or engines, a global rule has no
    /// patterns, or any pattern fails to parse.
    pub fn new(mut rules: Vec<ActionRule>) -> Result<Self> {
        for rule in &rules {
            let context = format!("action '{}'", rule.name);
            if rule.name.trim().is_empty() {
                return Err(Error::configuration("actions", "action rule without a name"));
            }
            match rule.tier {
                Tier::Engine => {
                    if rule.patterns.is_empty() {
                        return Err(Error::configuration(&context, "engine-tier rule needs 'match'"));
                    }
                    if rule.engine.is_empty() {
                        return Err(Error::configuration(&context, "engine-tier rule needs 'engine'"));
                    }
                }
                Tier::Global => {
                    if rule.patterns.is_empty() {
                        return Err(Error::configuration(&context, "global rule needs 'match'"));
                    }
                }
                Tier::Universal => {
                    if !rule.patterns.is_empty() || !rule.engine.is_empty() {
                        tracing::warn!(
                            action = %rule.name,
                            "Universal action declares 'match' or 'engine'; ignored"
                        );
                    }
                }
            }
            check_patterns(&context, &rule.patterns, false)?;
        }

        rules.sort_by_key(|rule| (rule.tier, Reverse(rule.priority)));
        Ok(Self { rules })
    }

    /// All rules in lookup order.
    pub fn rules(&self) -> &[ActionRule] {
        &self.rules
    }

    /// Rules of one tier, in lookup order.
    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &ActionRule> {
        self.rules.iter().filter(move |rule| rule.tier == tier)
    }

    /// Every engine named by an engine-tier rule.
    pub fn engines(&self) -> BTreeSet<&EngineName> {
        self.tier(Tier::Engine).flat_map(|rule| rule.engine.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Job rules in declaration order.
#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    jobs: Vec<JobRule>,
}

impl JobCatalog {
    /// Validate the jobs.
    ///
    /// Jobs without a callable or batch command are accepted with a
    /// warning and fail when dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on duplicate or empty job names,
    /// an empty action, an empty batch command, or an unparsable pattern.
    pub fn new(jobs: Vec<JobRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if job.name.trim().is_empty() {
                return Err(Error::configuration("jobs", "job without a name"));
            }
            let context = format!("job '{}'", job.name);
            if !seen.insert(job.name.as_str()) {
                return Err(Error::configuration(&context, "duplicate job name"));
            }
            if job.action.trim().is_empty() {
                return Err(Error::configuration(&context, "job has no action"));
            }
            if let Some(batch) = &job.batch {
                if batch.command.trim().is_empty() {
                    return Err(Error::configuration(&context, "batch command is empty"));
                }
            }
            if job.call.is_none() && job.batch.is_none() {
                tracing::warn!(job = %job.name, "Job has neither 'call' nor 'batch'");
            }
            check_patterns(&context, &job.patterns, true)?;
        }
        Ok(Self { jobs })
    }

    /// All jobs in declaration order.
    pub fn jobs(&self) -> &[JobRule] {
        &self.jobs
    }

    /// Jobs implementing `action`, in declaration order.
    pub fn for_action<'a, 'b>(&'a self, action: &'b str) -> impl Iterator<Item = &'a JobRule> + 'b
    where
        'a: 'b,
    {
        self.jobs.iter().filter(move |job| job.action == action)
    }

    /// Look up a job by name.
    pub fn get(&self, name: &str) -> Option<&JobRule> {
        self.jobs.iter().find(|job| job.name == name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
