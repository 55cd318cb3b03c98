//! Test harness: scripted transport, canned REST, event collection
//!
//! `TestHarness::start` wires a real `GatewaySession` to in-memory mocks.
//! Each scripted connection hands the test a `ServerHandle` that plays the
//! server side: it pushes frames and failures in, and observes every frame
//! the client sends.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use parley_cache::EntityStore;
use parley_core::{Event, EventListener, ListenerResult};
use parley_gateway::protocol::{GatewayFrame, OpCode};
use parley_gateway::rest::{RestClient, RestError, RestMethod};
use parley_gateway::transport::{FrameTransport, TransportConnector, TransportError};
use parley_gateway::{
    EventDispatcher, GatewayConfig, GatewayError, GatewaySession, ReconnectConfig, SessionHandle,
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

type InboundItem = Result<Option<GatewayFrame>, TransportError>;

// ============================================================================
// Scripted transport
// ============================================================================

/// The server side of one scripted connection
pub struct ServerHandle {
    inbound: mpsc::UnboundedSender<InboundItem>,
    sent: AsyncMutex<mpsc::UnboundedReceiver<GatewayFrame>>,
}

impl ServerHandle {
    /// Push a frame to the client
    pub fn send(&self, frame: GatewayFrame) {
        let _ = self.inbound.send(Ok(Some(frame)));
    }

    /// Push a dispatch to the client
    pub fn dispatch(&self, event_type: &str, seq: u64, data: Value) {
        self.send(GatewayFrame::dispatch(event_type, seq, data));
    }

    /// Fail the client's next read with the given error
    pub fn fail(&self, err: TransportError) {
        let _ = self.inbound.send(Err(err));
    }

    /// Close the connection with a gateway close code
    pub fn close_with_code(&self, code: u16) {
        self.fail(TransportError::Closed { code: Some(code) });
    }

    /// Receive the next frame the client sent, panicking on timeout
    pub async fn expect_frame(&self) -> GatewayFrame {
        let mut sent = self.sent.lock().await;
        tokio::time::timeout(WAIT_TIMEOUT, sent.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client side of the transport is gone")
    }

    /// Receive the next frame of the given op, skipping interleaved heartbeats
    pub async fn expect_op(&self, op: OpCode) -> GatewayFrame {
        loop {
            let frame = self.expect_frame().await;
            if frame.op == op {
                return frame;
            }
            assert_eq!(
                frame.op,
                OpCode::Heartbeat,
                "expected {op} (or interleaved heartbeats), got {frame}"
            );
        }
    }

    /// Receive the next heartbeat the client sent
    pub async fn expect_heartbeat(&self) -> GatewayFrame {
        self.expect_op(OpCode::Heartbeat).await
    }
}

struct MockTransport {
    inbound: mpsc::UnboundedReceiver<InboundItem>,
    sent: mpsc::UnboundedSender<GatewayFrame>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameTransport for MockTransport {
    async fn next_frame(&mut self) -> Result<Option<GatewayFrame>, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match self.inbound.recv().await {
            Some(item) => item,
            // Script dropped: behaves like a clean close from the peer
            None => Ok(None),
        }
    }

    async fn send_frame(&mut self, frame: &GatewayFrame) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Io("transport closed".to_string()));
        }
        self.sent
            .send(frame.clone())
            .map_err(|_| TransportError::Io("server side dropped".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out scripted connections in order, failing once they run out
pub struct MockConnector {
    pending: Mutex<VecDeque<MockTransport>>,
}

impl MockConnector {
    /// Create a connector with `connections` scripted connections, returning
    /// the server handle for each in connect order
    pub fn with_connections(connections: usize) -> (Arc<Self>, Vec<Arc<ServerHandle>>) {
        let mut pending = VecDeque::new();
        let mut handles = Vec::new();
        for _ in 0..connections {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let (sent_tx, sent_rx) = mpsc::unbounded_channel();
            pending.push_back(MockTransport {
                inbound: inbound_rx,
                sent: sent_tx,
                closed: Arc::new(AtomicBool::new(false)),
            });
            handles.push(Arc::new(ServerHandle {
                inbound: inbound_tx,
                sent: AsyncMutex::new(sent_rx),
            }));
        }
        (
            Arc::new(Self {
                pending: Mutex::new(pending),
            }),
            handles,
        )
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn FrameTransport>, TransportError> {
        match self.pending.lock().pop_front() {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(TransportError::Connect(
                "no scripted connections left".to_string(),
            )),
        }
    }
}

// ============================================================================
// Canned REST
// ============================================================================

/// REST client answering from stubbed paths
#[derive(Default)]
pub struct MockRest {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl MockRest {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stub an exact request path with a response body
    pub fn stub(&self, path: &str, body: Value) {
        self.responses.lock().insert(path.to_string(), body);
    }

    /// Paths requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RestClient for MockRest {
    async fn request(
        &self,
        _method: RestMethod,
        path: &str,
        _body: Option<Value>,
    ) -> Result<Value, RestError> {
        self.calls.lock().push(path.to_string());
        self.responses
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RestError::NotFound(path.to_string()))
    }
}

// ============================================================================
// Event collection
// ============================================================================

/// Listener that records every event it receives
#[derive(Default)]
pub struct CollectingListener {
    events: Mutex<Vec<Event>>,
}

impl CollectingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Kind names of all recorded events, in delivery order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(Event::kind_name).collect()
    }

    /// Count of recorded events of the given kind
    pub fn count_of(&self, kind: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind_name() == kind)
            .count()
    }

    /// Wait until at least `count` events of `kind` arrived
    pub async fn wait_for(&self, kind: &str, count: usize) {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            if self.count_of(kind) >= count {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} {kind} event(s), saw {:?}",
                self.kinds()
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl EventListener for CollectingListener {
    fn on_event(&self, event: &Event) -> ListenerResult {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Registration shim: the dispatcher owns its listeners boxed, the test keeps
/// the shared handle for assertions
struct ListenerHandle(Arc<CollectingListener>);

impl EventListener for ListenerHandle {
    fn on_event(&self, event: &Event) -> ListenerResult {
        self.0.on_event(event)
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Config tuned so reconnect tests finish in milliseconds
pub fn fast_config() -> GatewayConfig {
    GatewayConfig::new("ws://scripted", "http://scripted", "test-token").with_reconnect(
        ReconnectConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
        },
    )
}

/// Drive one connection through Hello, Identify, and READY (seq 1)
///
/// Uses a long heartbeat interval so beats never interfere with the test;
/// heartbeat-sensitive tests script their own Hello.
pub async fn bring_ready(
    server: &ServerHandle,
    listener: &CollectingListener,
    session_id: &str,
    guilds: Vec<Value>,
) {
    server.send(GatewayFrame::hello(50_000));
    server.expect_op(OpCode::Identify).await;
    server.dispatch("READY", 1, crate::fixtures::ready_payload(session_id, guilds));
    listener.wait_for("Ready", 1).await;
}

/// Poll until `check` holds, panicking after the shared timeout
pub async fn wait_until(what: &str, check: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting until {what}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// A running session wired to scripted mocks
pub struct TestHarness {
    pub store: Arc<EntityStore>,
    pub listener: Arc<CollectingListener>,
    pub rest: Arc<MockRest>,
    pub handle: SessionHandle,
    pub servers: Vec<Arc<ServerHandle>>,
    task: tokio::task::JoinHandle<Result<(), GatewayError>>,
}

impl TestHarness {
    /// Start a session with `connections` scripted connections
    pub fn start(connections: usize) -> Self {
        Self::start_with(connections, fast_config())
    }

    pub fn start_with(connections: usize, config: GatewayConfig) -> Self {
        let (connector, servers) = MockConnector::with_connections(connections);
        let rest = MockRest::new();
        let store = Arc::new(EntityStore::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&store),
            config.large_threshold,
        ));

        let listener = CollectingListener::new();
        dispatcher.add_listener(Box::new(ListenerHandle(Arc::clone(&listener))));

        let session = GatewaySession::new(
            config,
            connector,
            Arc::clone(&rest) as Arc<dyn RestClient>,
            Arc::clone(&store),
            dispatcher,
        );
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        Self {
            store,
            listener,
            rest,
            handle,
            servers,
            task,
        }
    }

    /// The server handle for the nth connection (0-based)
    pub fn server(&self, n: usize) -> &ServerHandle {
        &self.servers[n]
    }

    /// Request shutdown and wait for the session task to finish
    pub async fn finish(self) -> Result<(), GatewayError> {
        self.handle.disconnect();
        self.join().await
    }

    /// Wait for the session task without requesting shutdown
    pub async fn join(self) -> Result<(), GatewayError> {
        tokio::time::timeout(WAIT_TIMEOUT, self.task)
            .await
            .expect("session task did not finish in time")
            .expect("session task panicked")
    }
}
