//! Sidbroker - pipeline action broker
//!
//! Decides which actions apply to a Sid in the current host engine, which
//! job implements an action, and runs that job in-process or as a batch
//! command. This library crate exposes the broker for hosts and
//! integration tests.

pub mod broker;
pub mod config;
pub mod engines;
pub mod registry;

pub use broker::{Broker, DispatchOutcome, DispatchState};
pub use config::Config;
pub use engines::{EngineAdapter, EngineKind};
pub use registry::{JobArgs, JobRegistry};
