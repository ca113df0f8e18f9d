//! Origin Runtime - The authoritative coordinator
//!
//! Per connection the coordinator runs:
//! 1. Wait for the client's capability announcement
//! 2. Send the installation notice
//! 3. Run the version handshake gate (when enabled)
//! 4. Restore or create the participant's assignment state
//! 5. Sweep layers that need no interactive choice
//! 6. Process choice requests in arrival order
//! 7. Confirm, sync and request the selection UI as needed
//! 8. Persist the record when the connection ends

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod engine;
pub mod events;
pub mod handshake;
pub mod link;
pub mod session;
pub mod store;
pub mod telemetry;

pub use config::*;
pub use connection::*;
pub use coordinator::*;
pub use engine::*;
pub use events::*;
pub use handshake::*;
pub use link::*;
pub use session::*;
pub use store::*;
pub use telemetry::*;
