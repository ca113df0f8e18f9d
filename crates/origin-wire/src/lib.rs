//! Origin Wire Protocol - Binary message format
//!
//! This crate implements the wire format exchanged between the coordinator
//! and display clients:
//! - Fixed frame header (4 bytes)
//! - Little-endian, length-prefixed field codec
//! - Client-to-coordinator and coordinator-to-client message sets

pub mod codec;
pub mod frame;
pub mod message;

pub use codec::*;
pub use frame::*;
pub use message::*;
