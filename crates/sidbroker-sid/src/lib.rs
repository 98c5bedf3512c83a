//! # sidbroker-sid
//!
//! Structured pipeline identifiers and the predicate the broker matches them with.
//!
//! - [`Sid`] -- an ordered, slash-delimited identifier (`PROJ/A/CHAR/HERO/MOD/V001/W/maya`)
//!   whose fields are named by a per-basetype schema.
//! - [`SidPattern`] -- the search grammar: `*`, `**`, `A,S` and `>=V002`.
//! - [`SidMatcher`] -- the match predicate the broker depends on, with
//!   [`GlobMatcher`] as the default implementation.
//!
//! ## Example
//!
//! ```
//! use sidbroker_sid::{GlobMatcher, Sid, SidMatcher};
//!
//! let sid: Sid = "PROJ/A/CHAR/HERO/MOD/V001/W/maya".parse()?;
//! assert_eq!(sid.field("entity"), Some("HERO"));
//!
//! let matcher = GlobMatcher;
//! assert!(matcher.matches(&sid, "*/*/**/maya")?);
//! assert!(!matcher.matches(&sid, "*/S/**")?);
//! # Ok::<(), sidbroker_sid::SidError>(())
//! ```

mod error;
pub mod matcher;
pub mod pattern;
pub mod sid;

pub use error::{Result, SidError};
pub use matcher::{GlobMatcher, SidMatcher};
pub use pattern::{Comparison, Segment, SidPattern};
pub use sid::{BaseType, Sid};
