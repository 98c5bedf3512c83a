//! # sidbroker-rules
//!
//! Declarative action and job catalogs for the broker.
//!
//! ## Overview
//!
//! - [`ActionRule`] -- a user-facing action with a [`Tier`], a priority, Sid
//!   patterns and the host engines it is valid for.
//! - [`JobRule`] -- the implementation binding of an action: a registered
//!   callable ([`JobTarget::Call`]) or an external command ([`BatchSpec`]).
//! - [`ActionCatalog`] / [`JobCatalog`] -- validated, ordered tables built
//!   once at load time.

pub mod action;
pub mod catalog;
pub mod job;

pub use action::{ActionRule, Tier};
pub use catalog::{ActionCatalog, JobCatalog};
pub use job::{BatchSpec, JobRule, JobTarget, SendMode};
