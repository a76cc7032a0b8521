//! Push connection lifecycle.
//!
//! Owns at most one live WebSocket per instance: connect, identity binding,
//! reconnect-on-drop with bounded backoff, explicit disconnect. Inbound
//! frames are handed to the dispatcher one at a time from a single reader
//! task, which is what preserves wire order for subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::constants::events as log_events;
use crate::dispatcher::EventDispatcher;
use crate::session::SessionProvider;

use super::state::{CloseOutcome, ConnectionMachine, ConnectionState, RetryPolicy};

pub struct PushConnection {
    machine: Mutex<ConnectionMachine>,
    session: Arc<dyn SessionProvider>,
    dispatcher: EventDispatcher,
    stream_url: Url,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
    writer_task: Mutex<Option<JoinHandle<()>>>,
    reconnect_timer: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every explicit disconnect, under the machine lock. Every
    /// connect attempt carries the epoch it was started under and re-checks
    /// it before each state transition, so neither a pending reconnect
    /// timer nor an in-flight handshake can open a connection after the
    /// caller asked to stop.
    epoch: AtomicU64,
}

impl PushConnection {
    /// `stream_url` is the scheme-translated push endpoint without identity
    /// parameters; venue and token are appended per attempt from the
    /// session provider.
    pub fn new(
        stream_url: Url,
        session: Arc<dyn SessionProvider>,
        dispatcher: EventDispatcher,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            machine: Mutex::new(ConnectionMachine::new(policy)),
            session,
            dispatcher,
            stream_url,
            outbound: Mutex::new(None),
            reader_task: Mutex::new(None),
            writer_task: Mutex::new(None),
            reconnect_timer: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.lock().unwrap().state()
    }

    pub fn attempts(&self) -> u32 {
        self.machine.lock().unwrap().attempts()
    }

    pub fn last_error(&self) -> Option<String> {
        self.machine.lock().unwrap().last_error().map(String::from)
    }

    pub fn is_enabled(&self) -> bool {
        self.machine.lock().unwrap().is_enabled()
    }

    /// Explicitly open the connection. No-op when already open or opening,
    /// and when the session lacks a venue or token (a stream without
    /// identity would deliver ambiguous, unauthenticated events).
    pub async fn connect(self: &Arc<Self>) {
        let epoch = {
            let mut machine = self.machine.lock().unwrap();
            machine.reset_attempts();
            self.epoch.load(Ordering::SeqCst)
        };
        self.clone().attempt_connect(epoch).await;
    }

    async fn attempt_connect(self: Arc<Self>, epoch: u64) {
        // Re-derive identity on every attempt; tokens rotate between
        // reconnects and a cached one may already be invalid.
        let identity = match self.session.current_identity().await {
            Some(id) if id.is_complete() => id,
            _ => {
                warn!("No venue/token in session; refusing to connect");
                return;
            }
        };

        {
            let mut machine = self.machine.lock().unwrap();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!("Connection stopped since this attempt was scheduled; ignoring");
                return;
            }
            if !machine.is_enabled() {
                debug!("Realtime updates disabled; ignoring connect");
                return;
            }
            if !machine.begin_connect() {
                debug!("Connection already open or opening; ignoring connect");
                return;
            }
        }

        let mut url = self.stream_url.clone();
        url.query_pairs_mut()
            .append_pair("venueId", &identity.venue_id)
            .append_pair("token", &identity.token);

        info!("Connecting to order stream: {}", self.stream_url);

        match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => {
                // The state transition and task installation happen under
                // one lock, re-checking the epoch: a disconnect that ran
                // while the handshake was in flight already settled the
                // state, and this socket must not go live.
                let stale_socket = {
                    let mut machine = self.machine.lock().unwrap();
                    if self.epoch.load(Ordering::SeqCst) != epoch || !machine.is_enabled() {
                        Some(ws_stream)
                    } else {
                        machine.on_open();

                        let (mut write, mut read) = ws_stream.split();
                        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
                        *self.outbound.lock().unwrap() = Some(tx.clone());

                        let writer = tokio::spawn(async move {
                            while let Some(msg) = rx.recv().await {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            }
                        });
                        *self.writer_task.lock().unwrap() = Some(writer);

                        let conn = self.clone();
                        let reader = tokio::spawn(async move {
                            let mut close_reason = "stream ended".to_string();
                            while let Some(msg) = read.next().await {
                                match msg {
                                    Ok(Message::Text(text)) => conn.dispatcher.on_raw_frame(&text),
                                    Ok(Message::Ping(payload)) => {
                                        tx.send(Message::Pong(payload)).ok();
                                    }
                                    Ok(Message::Close(frame)) => {
                                        close_reason = format!("closed by server: {:?}", frame);
                                        break;
                                    }
                                    Err(e) => {
                                        close_reason = e.to_string();
                                        break;
                                    }
                                    _ => {}
                                }
                            }
                            conn.handle_unexpected_close(close_reason);
                        });
                        *self.reader_task.lock().unwrap() = Some(reader);
                        None
                    }
                };

                match stale_socket {
                    Some(mut ws_stream) => {
                        debug!("Stopped while the handshake was in flight; dropping the fresh socket");
                        ws_stream.close(None).await.ok();
                    }
                    None => {
                        info!(event = log_events::CONNECTION_OPENED, venue = %identity.venue_id, "Order stream connected");
                    }
                }
            }
            Err(e) => {
                self.handle_unexpected_close(format!("connect failed: {e}"));
            }
        }
    }

    /// Uniform handling for every non-explicit close: network errors,
    /// abrupt EOF and auth rejections all land here.
    fn handle_unexpected_close(self: &Arc<Self>, reason: String) {
        *self.outbound.lock().unwrap() = None;

        // Snapshot the epoch under the same lock that records the close,
        // so a disconnect that lands in between invalidates the retry.
        let (outcome, epoch) = {
            let mut machine = self.machine.lock().unwrap();
            let outcome = machine.on_unexpected_close(reason.clone());
            (outcome, self.epoch.load(Ordering::SeqCst))
        };
        match outcome {
            CloseOutcome::Retry { attempt, delay } => {
                warn!(
                    event = log_events::RECONNECT_SCHEDULED,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Order stream dropped; reconnect scheduled"
                );
                let conn = self.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    conn.attempt_connect(epoch).await;
                });
                if let Some(old) = self.reconnect_timer.lock().unwrap().replace(timer) {
                    old.abort();
                }
            }
            CloseOutcome::Exhausted => {
                error!(
                    event = log_events::CONNECTION_FAILED,
                    reason = %reason,
                    "Reconnect attempts exhausted; order stream offline until reconnected manually"
                );
            }
            CloseOutcome::Suppressed => {
                debug!(reason = %reason, "Close already handled");
            }
        }
    }

    /// Close the connection and cancel any pending reconnect. Idempotent;
    /// always leaves the state in `Closed`. The machine lock is held for
    /// the whole teardown so it serializes against a connect attempt
    /// installing tasks; the epoch bump invalidates any attempt whose
    /// handshake is still in flight.
    pub fn disconnect(&self) {
        let mut machine = self.machine.lock().unwrap();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = self.reconnect_timer.lock().unwrap().take() {
            timer.abort();
        }
        if let Some(reader) = self.reader_task.lock().unwrap().take() {
            reader.abort();
        }
        if let Some(writer) = self.writer_task.lock().unwrap().take() {
            writer.abort();
        }
        *self.outbound.lock().unwrap() = None;
        machine.on_disconnect();
        info!(event = log_events::CONNECTION_CLOSED, "Order stream disconnected");
    }

    /// Transmit only when open. The boolean means "attempted", not
    /// acknowledged; this protocol has no ack layer.
    pub fn send(&self, data: &Value) -> bool {
        if self.state() != ConnectionState::Open {
            return false;
        }
        match self.outbound.lock().unwrap().as_ref() {
            Some(tx) => tx.send(Message::Text(data.to_string())).is_ok(),
            None => false,
        }
    }

    /// Flip the user preference. Disabling tears down any live connection
    /// and cancels a pending reconnect timer.
    pub fn set_enabled(&self, enabled: bool) {
        self.machine.lock().unwrap().set_enabled(enabled);
        if !enabled {
            self.disconnect();
        }
    }
}
