//! Origin Client - The thin display client
//!
//! The client holds no authority. It provides:
//! - A mirror of the coordinator's confirmed assignments
//! - Handshake replies and capability announcement
//! - A headless selection cursor per layer, in display order

pub mod cursor;
pub mod mirror;

pub use cursor::*;
pub use mirror::*;
