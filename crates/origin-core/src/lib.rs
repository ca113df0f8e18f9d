//! Origin Core - Fundamental types for origin assignment
//!
//! This crate defines the types shared by the coordinator and its clients:
//! - Identifiers (Identifier, ParticipantId)
//! - Layer and origin definitions
//! - The read-only registry contract and an in-memory registry
//! - Assignment records and the handshake version triple
//! - The error taxonomy

pub mod argument;
pub mod assignment;
pub mod error;
pub mod id;
pub mod layer;
pub mod origin;
pub mod participant;
pub mod registry;
pub mod version;

pub use argument::*;
pub use assignment::*;
pub use error::*;
pub use id::*;
pub use layer::*;
pub use origin::*;
pub use participant::*;
pub use registry::*;
pub use version::*;
