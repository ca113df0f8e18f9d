//! Simulated clients and test coordinators

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use origin_client::ClientMirror;
use origin_core::{OriginError, OriginResult, Participant, ProtocolVersion, Registry};
use origin_runtime::{ClientLink, Coordinator, CoordinatorConfig, SelectionEvent, SelectionListener};
use origin_wire::{ClientMessage, ServerMessage};

// ============================================================================
// EVENT LOG
// ============================================================================

/// Subscriber that records every event it sees
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SelectionEvent>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(EventLog::default())
    }

    pub fn events(&self) -> Vec<SelectionEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl SelectionListener for EventLog {
    fn on_event(&self, event: &SelectionEvent) {
        self.events.lock().push(event.clone());
    }
}

// ============================================================================
// LOG CAPTURE
// ============================================================================

/// In-memory sink for formatted `tracing` output
#[derive(Clone, Debug, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        LogCapture::default()
    }

    /// Plain-text subscriber writing DEBUG and above into this capture.
    /// Install it with `tracing::subscriber::with_default`.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Captured lines containing `pattern`
    pub fn lines_matching(&self, pattern: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(pattern))
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        !self.lines_matching(pattern).is_empty()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// TEST COORDINATOR
// ============================================================================

/// Coordinator config for tests: fixed version, short handshake timeout
pub fn test_config(version: ProtocolVersion) -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_version(version)
        .with_handshake_timeout(Duration::from_millis(200))
}

/// Seeded coordinator with an event log attached
pub fn test_coordinator(
    registry: Arc<dyn Registry>,
    config: CoordinatorConfig,
) -> (Coordinator, Arc<EventLog>) {
    let coordinator = Coordinator::new(config, registry).with_seed(0x5EED);
    let log = EventLog::new();
    coordinator.subscribe(log.clone());
    (coordinator, log)
}

// ============================================================================
// SIMULATED CLIENT
// ============================================================================

/// Receive deadline so a broken exchange fails instead of hanging
pub const RECV_DEADLINE: Duration = Duration::from_secs(2);

/// A display client driven by a test
pub struct SimulatedClient {
    link: ClientLink,
    pub mirror: ClientMirror,
    received: Vec<ServerMessage>,
    answer_handshake: bool,
}

impl SimulatedClient {
    /// Connect to `coordinator` and send the opening `Hello`
    pub async fn connect(
        coordinator: &Coordinator,
        participant: Participant,
        mirror: ClientMirror,
    ) -> (Self, JoinHandle<OriginResult<()>>) {
        let (link, handle) = coordinator.connect(participant);
        let client = SimulatedClient {
            link,
            mirror,
            received: Vec::new(),
            answer_handshake: true,
        };
        client
            .send(&client.mirror.hello())
            .await
            .expect("coordinator accepts the hello");
        (client, handle)
    }

    /// Stop answering version handshakes
    pub fn silent(mut self) -> Self {
        self.answer_handshake = false;
        self
    }

    pub async fn send(&self, message: &ClientMessage) -> OriginResult<()> {
        self.link.send(message).await
    }

    pub async fn send_raw(&self, bytes: bytes::Bytes) -> OriginResult<()> {
        self.link.send_raw(bytes).await
    }

    /// Receive one message, apply it to the mirror and answer it if needed.
    /// Nothing arriving before [`RECV_DEADLINE`] counts as a closed link.
    pub async fn recv(&mut self) -> OriginResult<ServerMessage> {
        let message = timeout(RECV_DEADLINE, self.link.recv())
            .await
            .map_err(|_| OriginError::ConnectionClosed)??;
        self.received.push(message.clone());
        if let Some(reply) = self.mirror.apply(message.clone()) {
            if self.answer_handshake {
                self.send(&reply).await?;
            }
        }
        Ok(message)
    }

    /// Receive until `pred` matches; returns everything received on the way
    pub async fn recv_until(
        &mut self,
        pred: impl Fn(&ServerMessage) -> bool,
    ) -> OriginResult<Vec<ServerMessage>> {
        let mut seen = Vec::new();
        loop {
            let message = self.recv().await?;
            let done = pred(&message);
            seen.push(message);
            if done {
                return Ok(seen);
            }
        }
    }

    /// Receive until the first full-state sync
    pub async fn recv_sync(&mut self) -> OriginResult<Vec<ServerMessage>> {
        self.recv_until(|m| matches!(m, ServerMessage::FullStateSync { .. }))
            .await
    }

    /// `true` when nothing arrives within `wait`
    pub async fn is_quiet(&mut self, wait: Duration) -> bool {
        timeout(wait, self.link.recv()).await.is_err()
    }

    pub async fn choose(&self, layer: &str, origin: &str) -> OriginResult<()> {
        self.send(&ClientMessage::RequestChoice {
            layer: crate::id(layer),
            origin: crate::id(origin),
        })
        .await
    }

    pub async fn choose_random(&self, layer: &str) -> OriginResult<()> {
        self.send(&ClientMessage::RequestRandomChoice {
            layer: crate::id(layer),
        })
        .await
    }

    /// Every message received so far
    pub fn received(&self) -> &[ServerMessage] {
        &self.received
    }

    /// Close the client end
    pub fn disconnect(self) {
        drop(self.link);
    }
}
