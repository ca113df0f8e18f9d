//! In-process duplex link carrying encoded frames
//!
//! The coordinator never sees sockets: a host transport (or a test) hands it
//! the server end of a link and pumps bytes through the client end.

use bytes::Bytes;
use tokio::sync::mpsc;

use origin_core::{OriginError, OriginResult};
use origin_wire::{ClientMessage, ServerMessage};

/// Frame receiver channel
pub type FrameReceiver = mpsc::Receiver<Bytes>;

/// Frame sender channel
pub type FrameSender = mpsc::Sender<Bytes>;

/// Coordinator end of a link
#[derive(Debug)]
pub struct ServerLink {
    incoming: FrameReceiver,
    outgoing: FrameSender,
}

/// Client end of a link
#[derive(Debug)]
pub struct ClientLink {
    incoming: FrameReceiver,
    outgoing: FrameSender,
}

/// Create a connected pair; each direction buffers `capacity` frames
pub fn duplex(capacity: usize) -> (ServerLink, ClientLink) {
    let (to_server, from_client) = mpsc::channel(capacity);
    let (to_client, from_server) = mpsc::channel(capacity);
    (
        ServerLink {
            incoming: from_client,
            outgoing: to_client,
        },
        ClientLink {
            incoming: from_server,
            outgoing: to_server,
        },
    )
}

impl ServerLink {
    /// Next raw frame; `None` once the client end is dropped
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.incoming.recv().await
    }

    pub async fn send(&self, message: &ServerMessage) -> OriginResult<()> {
        let bytes = message.encode()?;
        self.outgoing
            .send(bytes)
            .await
            .map_err(|_| OriginError::ConnectionClosed)
    }
}

impl ClientLink {
    pub async fn send(&self, message: &ClientMessage) -> OriginResult<()> {
        self.send_raw(message.encode()?).await
    }

    /// Send bytes as-is, valid frame or not
    pub async fn send_raw(&self, bytes: Bytes) -> OriginResult<()> {
        self.outgoing
            .send(bytes)
            .await
            .map_err(|_| OriginError::ConnectionClosed)
    }

    /// Next decoded message; `ConnectionClosed` once the server end is gone
    pub async fn recv(&mut self) -> OriginResult<ServerMessage> {
        let bytes = self
            .incoming
            .recv()
            .await
            .ok_or(OriginError::ConnectionClosed)?;
        ServerMessage::decode(&bytes)
    }

    /// Split into the raw channel halves
    pub fn into_parts(self) -> (FrameSender, FrameReceiver) {
        (self.outgoing, self.incoming)
    }
}
