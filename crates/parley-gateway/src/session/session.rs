//! Gateway session
//!
//! `GatewaySession::run` owns the connection lifecycle: connect, Hello,
//! Identify or Resume, then a single read loop that is the only place the
//! entity store is mutated. Heartbeats run on their own task and reach the
//! wire through the outbound queue; REST hydration runs on worker tasks and
//! merges back through the hydration queue, so every store write still goes
//! through this loop in dispatch order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use parley_cache::EntityStore;
use parley_core::{Event, Snowflake};

use crate::config::GatewayConfig;
use crate::dispatch::{EventDispatcher, HydrationNeed};
use crate::error::GatewayError;
use crate::protocol::{
    ClientProperties, GatewayFrame, GuildData, IdentifyPayload, MemberData, OpCode, ReadyPayload,
    ResumePayload,
};
use crate::rest::{self, RestClient};
use crate::transport::{FrameTransport, TransportConnector, TransportError};

use super::backoff::Backoff;
use super::heartbeat;
use super::state::SessionState;

/// State shared between the session loop, the heartbeat task, and handles
pub struct SessionShared {
    state: RwLock<SessionState>,
    session_id: RwLock<Option<String>>,
    /// Last applied dispatch sequence; 0 means none yet
    last_sequence: AtomicU64,
    heartbeat_acked: AtomicBool,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Offline),
            session_id: RwLock::new(None),
            last_sequence: AtomicU64::new(0),
            heartbeat_acked: AtomicBool::new(true),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        if *state != next {
            tracing::debug!(from = %state, to = %next, "Session state transition");
            *state = next;
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    fn set_session_id(&self, id: String) {
        *self.session_id.write() = Some(id);
    }

    /// The last applied dispatch sequence, if any dispatch was applied
    pub fn last_sequence(&self) -> Option<u64> {
        match self.last_sequence.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }

    fn record_sequence(&self, seq: u64) {
        self.last_sequence.store(seq, Ordering::SeqCst);
    }

    /// Forget the resume identity; the next connection must re-identify
    fn clear_session(&self) {
        *self.session_id.write() = None;
        self.last_sequence.store(0, Ordering::SeqCst);
    }

    fn arm_heartbeat(&self) {
        self.heartbeat_acked.store(true, Ordering::SeqCst);
    }

    fn ack_heartbeat(&self) {
        self.heartbeat_acked.store(true, Ordering::SeqCst);
    }

    pub(crate) fn take_heartbeat_ack(&self) -> bool {
        self.heartbeat_acked.swap(false, Ordering::SeqCst)
    }
}

/// Cheap handle for observing and stopping a running session
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn session_id(&self) -> Option<String> {
        self.shared.session_id()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.shared.last_sequence()
    }

    /// Request a clean shutdown; idempotent, safe from any task
    pub fn disconnect(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// How a single connection ended
enum ConnectionEnd {
    /// Shutdown was requested; do not reconnect
    Shutdown,
    /// The connection is gone; the outer loop decides on resume vs identify
    Reconnect,
}

/// REST results flowing back into the session loop
enum HydrationUpdate {
    Guild(Box<GuildData>),
    Members {
        guild_id: Snowflake,
        members: Vec<MemberData>,
    },
}

/// A resilient gateway client session
pub struct GatewaySession {
    config: GatewayConfig,
    connector: Arc<dyn TransportConnector>,
    rest: Arc<dyn RestClient>,
    store: Arc<EntityStore>,
    dispatcher: Arc<EventDispatcher>,
    shared: Arc<SessionShared>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewaySession {
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        connector: Arc<dyn TransportConnector>,
        rest: Arc<dyn RestClient>,
        store: Arc<EntityStore>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            connector,
            rest,
            store,
            dispatcher,
            shared: Arc::new(SessionShared::new()),
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Handle for observing state and requesting shutdown
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
            shutdown: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Drive the session until shutdown or a terminal failure
    ///
    /// Reconnects on transient failures with exponential backoff. Returns
    /// `Ok(())` on requested shutdown, `Err` on fatal auth failure or an
    /// exhausted reconnect budget.
    pub async fn run(self) -> Result<(), GatewayError> {
        let mut backoff = Backoff::new(&self.config.reconnect);
        let mut shutdown = self.shutdown_rx.clone();

        loop {
            if *shutdown.borrow() {
                self.shared.set_state(SessionState::Offline);
                return Ok(());
            }

            match self.run_connection(&mut backoff).await {
                Ok(ConnectionEnd::Shutdown) => {
                    self.shared.set_state(SessionState::Offline);
                    tracing::info!("Session shut down");
                    return Ok(());
                }
                Ok(ConnectionEnd::Reconnect) => {}
                Err(e @ GatewayError::Auth(_)) => {
                    self.shared.set_state(SessionState::Offline);
                    tracing::error!(error = %e, "Fatal authentication failure, giving up");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Connection ended with error");
                }
            }

            if backoff.attempt() >= self.config.reconnect.max_attempts {
                self.shared.set_state(SessionState::Offline);
                return Err(GatewayError::ReconnectExhausted {
                    attempts: backoff.attempt(),
                });
            }

            let delay = backoff.next_delay();
            tracing::info!(
                attempt = backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                resume = self.shared.session_id().is_some(),
                "Reconnecting after backoff"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    /// Run one connection from connect to disconnect
    async fn run_connection(&self, backoff: &mut Backoff) -> Result<ConnectionEnd, GatewayError> {
        self.shared.set_state(SessionState::Connecting);
        let mut transport = self.connector.connect().await?;

        // The server speaks first
        let hello = loop {
            match transport.next_frame().await {
                Ok(Some(frame)) if frame.op == OpCode::Hello => {
                    break frame.as_hello().ok_or_else(|| {
                        GatewayError::Protocol("Hello without heartbeat_interval".to_string())
                    })?;
                }
                Ok(Some(frame)) => {
                    return Err(GatewayError::Protocol(format!("expected Hello, got {frame}")));
                }
                Ok(None) => {
                    return Err(GatewayError::Transport(TransportError::Closed {
                        code: None,
                    }));
                }
                Err(e) if e.is_decode() => {
                    tracing::warn!(error = %e, "Skipping malformed frame before Hello");
                }
                Err(e) => return self.classify_disconnect(e),
            }
        };

        // Resume when a prior session identity survives, identify otherwise
        match (self.shared.session_id(), self.shared.last_sequence()) {
            (Some(session_id), Some(seq)) => {
                self.shared.set_state(SessionState::Resuming);
                tracing::info!(session_id = %session_id, seq, "Resuming session");
                transport
                    .send_frame(&GatewayFrame::resume(&ResumePayload {
                        token: self.config.token.clone(),
                        session_id,
                        seq,
                    }))
                    .await?;
            }
            _ => {
                self.shared.set_state(SessionState::Identifying);
                tracing::info!("Identifying fresh session");
                transport
                    .send_frame(&GatewayFrame::identify(&IdentifyPayload {
                        token: self.config.token.clone(),
                        properties: ClientProperties::default(),
                        capabilities: 0,
                    }))
                    .await?;
                self.shared.set_state(SessionState::AwaitingReady);
            }
        }

        let (outbound_tx, mut outbound_rx) =
            mpsc::channel::<GatewayFrame>(self.config.outbound_buffer);
        let (zombie_tx, mut zombie_rx) = mpsc::channel::<()>(1);
        let (hydration_tx, mut hydration_rx) = mpsc::channel::<HydrationUpdate>(16);
        let mut shutdown = self.shutdown_rx.clone();

        self.shared.arm_heartbeat();
        let heartbeat_task = tokio::spawn(heartbeat::run_heartbeat(
            Duration::from_millis(hello.heartbeat_interval),
            Arc::clone(&self.shared),
            outbound_tx,
            zombie_tx,
            self.shutdown_rx.clone(),
        ));

        let end = loop {
            tokio::select! {
                frame = transport.next_frame() => {
                    match frame {
                        Ok(Some(frame)) => {
                            match self
                                .handle_frame(frame, &mut transport, &hydration_tx, backoff)
                                .await
                            {
                                Ok(None) => {}
                                Ok(Some(end)) => break Ok(end),
                                Err(e) => break Err(e),
                            }
                        }
                        Ok(None) => {
                            tracing::info!("Connection closed cleanly by peer");
                            break Ok(ConnectionEnd::Reconnect);
                        }
                        Err(e) if e.is_decode() => {
                            tracing::warn!(error = %e, "Skipping malformed frame");
                        }
                        Err(e) => break self.classify_disconnect(e),
                    }
                }
                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = transport.send_frame(&frame).await {
                        break self.classify_disconnect(e);
                    }
                }
                Some(update) = hydration_rx.recv() => {
                    match update {
                        HydrationUpdate::Guild(data) => {
                            let guild_id = data.guild.id;
                            if self.dispatcher.sync_guild(*data) {
                                self.spawn_hydration(
                                    vec![HydrationNeed::Members { guild_id }],
                                    &hydration_tx,
                                );
                            }
                            tracing::debug!(guild_id = %guild_id, "Hydrated unavailable guild");
                        }
                        HydrationUpdate::Members { guild_id, members } => {
                            self.dispatcher.merge_members(guild_id, members);
                        }
                    }
                }
                Some(()) = zombie_rx.recv() => {
                    tracing::warn!("Zombie connection detected, reconnecting");
                    let _ = transport.close().await;
                    break Ok(ConnectionEnd::Reconnect);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        let _ = transport.close().await;
                        break Ok(ConnectionEnd::Shutdown);
                    }
                }
            }
        };

        heartbeat_task.abort();
        end
    }

    /// Handle one inbound frame; `Some(end)` terminates the connection
    async fn handle_frame(
        &self,
        frame: GatewayFrame,
        transport: &mut Box<dyn FrameTransport>,
        hydration_tx: &mpsc::Sender<HydrationUpdate>,
        backoff: &mut Backoff,
    ) -> Result<Option<ConnectionEnd>, GatewayError> {
        match frame.op {
            OpCode::Dispatch => {
                self.handle_dispatch(frame, hydration_tx, backoff);
                Ok(None)
            }
            OpCode::Heartbeat => {
                // The server asked for an immediate beat
                transport
                    .send_frame(&GatewayFrame::heartbeat(self.shared.last_sequence()))
                    .await?;
                Ok(None)
            }
            OpCode::HeartbeatAck => {
                tracing::trace!("Heartbeat acknowledged");
                self.shared.ack_heartbeat();
                Ok(None)
            }
            OpCode::Reconnect => {
                tracing::info!("Server requested reconnect");
                let _ = transport.close().await;
                Ok(Some(ConnectionEnd::Reconnect))
            }
            OpCode::InvalidSession => {
                let resumable = frame.as_invalid_session().unwrap_or(false);
                if resumable {
                    tracing::warn!("Session invalidated, resume still possible");
                } else {
                    tracing::warn!("Session invalidated, flushing state and re-identifying");
                    self.shared.clear_session();
                    self.store.flush();
                }
                let _ = transport.close().await;
                Ok(Some(ConnectionEnd::Reconnect))
            }
            OpCode::Hello => {
                tracing::warn!("Unexpected Hello mid-session, ignoring");
                Ok(None)
            }
            OpCode::Identify | OpCode::Resume => {
                tracing::warn!(op = %frame.op, "Server sent a client-only op, ignoring");
                Ok(None)
            }
        }
    }

    fn handle_dispatch(
        &self,
        frame: GatewayFrame,
        hydration_tx: &mpsc::Sender<HydrationUpdate>,
        backoff: &mut Backoff,
    ) {
        let Some(seq) = frame.s else {
            tracing::warn!("Dispatch without sequence, skipping");
            return;
        };

        // Replays arrive during resume; anything at or below the applied
        // sequence has already taken effect
        if let Some(last) = self.shared.last_sequence() {
            if seq <= last {
                tracing::trace!(seq, last, "Skipping already-applied dispatch");
                return;
            }
        }

        let event_type = frame.t.unwrap_or_default();
        let data = frame.d.unwrap_or(Value::Null);

        match event_type.as_str() {
            "READY" => match serde_json::from_value::<ReadyPayload>(data) {
                Ok(ready) => {
                    let session_id = ready.session_id.clone();
                    self.shared.record_sequence(seq);
                    self.shared.set_session_id(session_id.clone());

                    let guild_count = ready.guilds.len();
                    let needs = self.dispatcher.apply_ready(ready);
                    let pending = needs.len();
                    self.spawn_hydration(needs, hydration_tx);

                    self.shared.set_state(SessionState::Ready);
                    backoff.reset();
                    tracing::info!(
                        session_id = %session_id,
                        guilds = guild_count,
                        pending_hydrations = pending,
                        "Session ready"
                    );
                    self.dispatcher.emit(&Event::Ready { session_id });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Malformed READY payload");
                }
            },
            "RESUMED" => {
                self.shared.record_sequence(seq);
                self.shared.set_state(SessionState::Ready);
                backoff.reset();
                tracing::info!(seq, "Session resumed");
                self.dispatcher.emit(&Event::Resumed);
            }
            other => {
                self.shared.record_sequence(seq);
                let needs = self.dispatcher.dispatch(other, data);
                self.spawn_hydration(needs, hydration_tx);
            }
        }
    }

    /// Run REST hydration on worker tasks; results merge back through the
    /// hydration queue so the session loop stays the only store writer
    fn spawn_hydration(&self, needs: Vec<HydrationNeed>, tx: &mpsc::Sender<HydrationUpdate>) {
        for need in needs {
            let rest = Arc::clone(&self.rest);
            let tx = tx.clone();
            tokio::spawn(async move {
                match need {
                    HydrationNeed::FullGuild { guild_id } => {
                        match rest::fetch_guild(rest.as_ref(), guild_id).await {
                            Ok(data) => {
                                let _ = tx.send(HydrationUpdate::Guild(Box::new(data))).await;
                            }
                            Err(e) => {
                                tracing::warn!(guild_id = %guild_id, error = %e, "Guild hydration failed");
                            }
                        }
                    }
                    HydrationNeed::Members { guild_id } => {
                        match rest::fetch_members(rest.as_ref(), guild_id).await {
                            Ok(members) => {
                                let _ = tx
                                    .send(HydrationUpdate::Members { guild_id, members })
                                    .await;
                            }
                            Err(e) => {
                                tracing::warn!(guild_id = %guild_id, error = %e, "Member hydration failed");
                            }
                        }
                    }
                }
            });
        }
    }

    /// Map a transport failure to what the session should do next
    fn classify_disconnect(&self, err: TransportError) -> Result<ConnectionEnd, GatewayError> {
        if let Some(code) = err.close_code() {
            if code.is_fatal() {
                return Err(GatewayError::Auth(code.to_string()));
            }
            if code.can_resume() {
                tracing::info!(code = %code, "Connection closed, will resume");
            } else {
                tracing::warn!(code = %code, "Close code invalidates the session, will re-identify");
                self.shared.clear_session();
                self.store.flush();
            }
            return Ok(ConnectionEnd::Reconnect);
        }

        match err {
            TransportError::Closed { .. } | TransportError::Io(_) => {
                tracing::warn!("Connection lost, will reconnect");
                Ok(ConnectionEnd::Reconnect)
            }
            other => Err(GatewayError::Transport(other)),
        }
    }
}
