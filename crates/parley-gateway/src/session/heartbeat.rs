//! Heartbeat task
//!
//! Runs beside the session's read loop. Every interval it checks that the
//! previous beat was acknowledged, then enqueues the next one carrying the
//! last applied sequence. A missed ack means the connection is a zombie:
//! the task signals the session and exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::protocol::GatewayFrame;

use super::SessionShared;

pub(crate) async fn run_heartbeat(
    interval: Duration,
    shared: Arc<SessionShared>,
    outbound: mpsc::Sender<GatewayFrame>,
    zombie: mpsc::Sender<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() fires immediately; the first beat waits a full interval
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !shared.take_heartbeat_ack() {
                    tracing::warn!("Heartbeat not acknowledged within interval, flagging zombie connection");
                    let _ = zombie.send(()).await;
                    return;
                }

                let frame = GatewayFrame::heartbeat(shared.last_sequence());
                tracing::trace!(seq = ?shared.last_sequence(), "Sending heartbeat");
                if outbound.send(frame).await.is_err() {
                    // Session loop is gone
                    return;
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
