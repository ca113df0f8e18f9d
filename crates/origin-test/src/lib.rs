//! Origin Test Harness - Fixtures and end-to-end validation
//!
//! This crate provides:
//! - Fixture registries and participants
//! - Simulated display clients over in-process links
//! - An event log subscriber and a `tracing` log capture
//!
//! and, under `cfg(test)`, the end-to-end suites:
//! - Onboarding and rejection scenarios
//! - Version handshake and connection lifecycle
//! - Random choice distribution
//! - Property tests over choice sequences

pub mod fixtures;
pub mod harness;

#[cfg(test)]
mod handshake_suite;
#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod statistics;

pub use fixtures::*;
pub use harness::*;
