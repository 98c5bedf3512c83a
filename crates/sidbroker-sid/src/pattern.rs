//! Search patterns over Sids.
//!
//! A pattern is a `/`-separated list of [`Segment`]s:
//!
//! | Segment    | Matches                                   |
//! |------------|-------------------------------------------|
//! | `*`        | exactly one field, any value              |
//! | `**`       | zero or more fields                       |
//! | `A,S`      | one field equal to any listed value       |
//! | `>=V002`   | one field compared lexicographically      |
//! | `maya`     | one field with exactly this value         |

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SidError};
use crate::sid::Sid;

/// Comparison operator of a [`Segment::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    fn holds(&self, value: &str, operand: &str) -> bool {
        match self {
            Comparison::Gt => value > operand,
            Comparison::Ge => value >= operand,
            Comparison::Lt => value < operand,
            Comparison::Le => value <= operand,
        }
    }
}

/// One segment of a [`SidPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `*`
    Any,
    /// `**`
    Recursive,
    /// A plain value.
    Literal(String),
    /// `a,b,c`
    OneOf(Vec<String>),
    /// `>v`, `>=v`, `<v`, `<=v`
    Compare(Comparison, String),
}

impl Segment {
    fn parse(pattern: &str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SidError::invalid_pattern(pattern, "empty segment"));
        }
        match raw {
            "*" => return Ok(Segment::Any),
            "**" => return Ok(Segment::Recursive),
            _ => {}
        }

        let comparison = [
            (">=", Comparison::Ge),
            ("<=", Comparison::Le),
            (">", Comparison::Gt),
            ("<", Comparison::Lt),
        ]
        .into_iter()
        .find_map(|(prefix, op)| raw.strip_prefix(prefix).map(|rest| (op, rest)));

        if let Some((op, operand)) = comparison {
            if operand.is_empty() {
                return Err(SidError::invalid_pattern(
                    pattern,
                    format!("comparison '{raw}' has no operand"),
                ));
            }
            return Ok(Segment::Compare(op, operand.to_string()));
        }

        if raw.contains('*') {
            return Err(SidError::invalid_pattern(
                pattern,
                format!("partial wildcard '{raw}' is not supported"),
            ));
        }

        if raw.contains(',') {
            let values: Vec<String> = raw.split(',').map(str::to_string).collect();
            if values.iter().any(String::is_empty) {
                return Err(SidError::invalid_pattern(
                    pattern,
                    format!("empty value in '{raw}'"),
                ));
            }
            return Ok(Segment::OneOf(values));
        }

        Ok(Segment::Literal(raw.to_string()))
    }

    /// Whether this single-field segment accepts `value`.
    ///
    /// [`Segment::Recursive`] is handled by [`SidPattern::matches`] and is
    /// accepted here as a one-field match.
    fn accepts(&self, value: &str) -> bool {
        match self {
            Segment::Any | Segment::Recursive => true,
            Segment::Literal(expected) => expected == value,
            Segment::OneOf(values) => values.iter().any(|v| v == value),
            Segment::Compare(op, operand) => op.holds(value, operand),
        }
    }
}

/// A parsed search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidPattern {
    source: String,
    segments: Vec<Segment>,
}

impl SidPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(SidError::invalid_pattern(pattern, "empty pattern"));
        }
        let segments = trimmed
            .split('/')
            .map(|raw| Segment::parse(trimmed, raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            source: trimmed.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the Sid's fields satisfy this pattern.
    pub fn matches(&self, sid: &Sid) -> bool {
        let values: Vec<&str> = sid.segments().iter().map(String::as_str).collect();
        match_segments(&self.segments, &values)
    }
}

fn match_segments(pattern: &[Segment], values: &[&str]) -> bool {
    match pattern.split_first() {
        None => values.is_empty(),
        Some((Segment::Recursive, rest)) => {
            (0..=values.len()).any(|skip| match_segments(rest, &values[skip..]))
        }
        Some((segment, rest)) => match values.split_first() {
            Some((value, remaining)) => segment.accepts(value) && match_segments(rest, remaining),
            None => false,
        },
    }
}

impl fmt::Display for SidPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for SidPattern {
    type Err = SidError;

    fn from_str(s: &str) -> Result<Self> {
        SidPattern::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> Sid {
        Sid::parse(s).unwrap()
    }

    fn matches(pattern: &str, s: &str) -> bool {
        SidPattern::parse(pattern).unwrap().matches(&sid(s))
    }

    #[test]
    fn parses_segment_kinds() {
        let pattern = SidPattern::parse("*/A,S/**/>=V002/maya").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Any,
                Segment::OneOf(vec!["A".into(), "S".into()]),
                Segment::Recursive,
                Segment::Compare(Comparison::Ge, "V002".into()),
                Segment::Literal("maya".into()),
            ]
        );
    }

    #[test]
    fn single_star_matches_one_field() {
        assert!(matches("*", "PROJ"));
        assert!(!matches("*", "PROJ/A"));
        assert!(matches("*/A/*", "PROJ/A/CHAR"));
    }

    #[test]
    fn recursive_matches_zero_or_more() {
        assert!(matches("*/A/**", "PROJ/A"));
        assert!(matches("*/A/**", "PROJ/A/CHAR/HERO/MOD/V001/W/maya"));
        assert!(!matches("*/A/**", "PROJ/S/SQ010"));
        assert!(matches("*/*/**/maya", "PROJ/A/CHAR/HERO/MOD/V001/W/maya"));
        assert!(!matches("*/*/**/maya", "PROJ/A/CHAR/HERO/MOD/V001/W/hou"));
        assert!(!matches("*/*/**/maya", "PROJ/maya"));
    }

    #[test]
    fn multi_value_matches_any_listed() {
        assert!(matches("*/A,S/*", "PROJ/A/CHAR"));
        assert!(matches("*/A,S/*", "PROJ/S/SQ010"));
        assert!(!matches("*/A,S/*", "PROJ/X/CHAR"));
    }

    #[test]
    fn comparison_is_lexicographic() {
        assert!(matches("*/A/*/*/*/>=V002", "PROJ/A/CHAR/HERO/MOD/V002"));
        assert!(matches("*/A/*/*/*/>V001", "PROJ/A/CHAR/HERO/MOD/V010"));
        assert!(!matches("*/A/*/*/*/<V002", "PROJ/A/CHAR/HERO/MOD/V002"));
        assert!(matches("*/A/*/*/*/<=V002", "PROJ/A/CHAR/HERO/MOD/V002"));
    }

    #[test]
    fn literal_is_case_sensitive() {
        assert!(!matches("*/a/**", "PROJ/A/CHAR"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        for bad in ["", "  ", "*//A", "*/A/", "*/>=", "*/A,,S", "*/SH*"] {
            assert!(
                matches!(SidPattern::parse(bad), Err(SidError::InvalidPattern { .. })),
                "pattern {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_keeps_source() {
        let pattern: SidPattern = "*/*/**/movie".parse().unwrap();
        assert_eq!(pattern.to_string(), "*/*/**/movie");
    }
}
