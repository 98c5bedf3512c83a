//! Sidbroker-Common: shared types used across the sidbroker crates.
//!
//! - **Errors**: the broker's error taxonomy ([`Error`]) and result alias
//! - **Engine names**: [`EngineName`], the lowercase host-engine filter key
//! - **Typed IDs**: [`DispatchId`] for correlating the log lines of one dispatch
//!
//! # Examples
//!
//! ```
//! use sidbroker_common::{EngineName, Error, Result};
//!
//! let maya: EngineName = "Maya".parse().unwrap();
//! assert_eq!(maya.as_str(), "maya");
//!
//! fn lookup() -> Result<()> {
//!     Err(Error::configuration("actions[0]", "engine-tier action has no engines"))
//! }
//! assert!(lookup().is_err());
//! ```

pub mod engine;
pub mod error;
pub mod ids;

pub use engine::EngineName;
pub use error::{Error, Result};
pub use ids::DispatchId;
