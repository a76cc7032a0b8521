//! Typed fan-out of inbound order frames.
//!
//! The dispatcher is the sole owner of the subscriber registry and the
//! "last event" slot. Frames arrive from the push connection's read loop one
//! at a time; each event is enqueued to every interested subscriber before
//! the next frame is parsed, so all subscribers observe the wire order.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::events as log_events;
use crate::events::{parse_frame, OrderEvent, OrderEventKind};

struct Registration {
    kinds: HashSet<OrderEventKind>,
    tx: mpsc::UnboundedSender<OrderEvent>,
}

struct DispatcherInner {
    subscribers: DashMap<Uuid, Registration>,
    last_event: Mutex<Option<OrderEvent>>,
}

/// Handle returned from [`EventDispatcher::subscribe`]. Receive events via
/// [`Subscription::recv`]; dropping the handle unsubscribes.
pub struct Subscription {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<OrderEvent>,
    inner: Arc<DispatcherInner>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<OrderEvent> {
        self.rx.recv().await
    }

    /// Non-blocking drain of whatever is already queued.
    pub fn try_recv(&mut self) -> Option<OrderEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.inner.subscribers.remove(&self.id);
    }
}

#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                subscribers: DashMap::new(),
                last_event: Mutex::new(None),
            }),
        }
    }

    /// Register interest in a subset of event kinds. An empty set means all
    /// kinds. Multiple subscribers may hold overlapping or disjoint sets.
    pub fn subscribe(&self, kinds: impl IntoIterator<Item = OrderEventKind>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.inner.subscribers.insert(
            id,
            Registration {
                kinds: kinds.into_iter().collect(),
                tx,
            },
        );
        Subscription {
            id,
            rx,
            inner: self.inner.clone(),
        }
    }

    /// Parse and dispatch one inbound frame.
    ///
    /// Malformed frames and frames with an unrecognized `type` are dropped
    /// here with a diagnostic; they never break the stream for consumers.
    pub fn on_raw_frame(&self, text: &str) {
        match parse_frame(text) {
            Ok(Some(event)) => self.dispatch(event),
            Ok(None) => {
                debug!(event = log_events::FRAME_IGNORED, frame = text, "Ignoring frame with unrecognized type");
            }
            Err(e) => {
                warn!(event = log_events::FRAME_DROPPED, error = %e, "Dropping malformed frame");
            }
        }
    }

    fn dispatch(&self, event: OrderEvent) {
        {
            let mut last = self.inner.last_event.lock().unwrap();
            *last = Some(event.clone());
        }

        // Unbounded sends never block, so this event is fully enqueued to
        // every subscriber before the caller hands us the next frame.
        let mut closed: Vec<Uuid> = Vec::new();
        for entry in self.inner.subscribers.iter() {
            let reg = entry.value();
            if !reg.kinds.is_empty() && !reg.kinds.contains(&event.kind) {
                continue;
            }
            if reg.tx.send(event.clone()).is_err() {
                closed.push(*entry.key());
            }
        }
        for id in closed {
            self.inner.subscribers.remove(&id);
        }
    }

    /// The single most-recently-dispatched event, for components that only
    /// need "what changed last" rather than a full subscription.
    pub fn last_event(&self) -> Option<OrderEvent> {
        self.inner.last_event.lock().unwrap().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}
