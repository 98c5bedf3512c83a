//! The match predicate the broker depends on.

use crate::error::Result;
use crate::pattern::SidPattern;
use crate::sid::Sid;

/// Decides whether a Sid matches a search pattern string.
///
/// Implementations must be pure: identical inputs always give identical
/// answers.
pub trait SidMatcher: Send + Sync {
    /// Whether `sid` matches `pattern`.
    fn matches(&self, sid: &Sid, pattern: &str) -> Result<bool>;

    /// Whether `sid` matches any of `patterns`.
    ///
    /// Every pattern is evaluated, so a malformed pattern is reported no
    /// matter where it sits in the list.
    fn matches_any(&self, sid: &Sid, patterns: &[String]) -> Result<bool> {
        let mut matched = false;
        for pattern in patterns {
            matched |= self.matches(sid, pattern)?;
        }
        Ok(matched)
    }
}

/// Default matcher backed by [`SidPattern`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobMatcher;

impl SidMatcher for GlobMatcher {
    fn matches(&self, sid: &Sid, pattern: &str) -> Result<bool> {
        Ok(SidPattern::parse(pattern)?.matches(sid))
    }
}
