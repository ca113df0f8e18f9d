//! Origin State - Per-participant assignment state
//!
//! This crate holds what the coordinator knows about one participant:
//! - The layer to origin map, in first-assignment order
//! - The `selecting` and `had_origin_before` flags
//! - One-shot completion tracking per lifecycle epoch
//! - Grant bundles that force assignments from outside the selection flow

pub mod grant;
pub mod state;

pub use grant::*;
pub use state::*;
