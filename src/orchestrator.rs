//! Composition root for the realtime order pipeline.
//!
//! Wires the session provider, persisted preference, push connection and
//! dispatcher into the single contract the dashboard consumes. Operators
//! configure one REST endpoint; the push URL is derived from it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::config::AppConfig;
use crate::constants::push as push_constants;
use crate::dispatcher::{EventDispatcher, Subscription};
use crate::error::OrdercastError;
use crate::events::{OrderEvent, OrderEventKind};
use crate::prefs::PreferenceStore;
use crate::push::{ConnectionState, PushConnection, RetryPolicy};
use crate::session::SessionProvider;

/// Connectivity snapshot exposed to the dashboard so it can render a
/// "live / reconnecting / offline, use refresh" indicator.
#[derive(Clone, Debug, Serialize)]
pub struct LiveStatus {
    pub connected: bool,
    pub connecting: bool,
    pub error: Option<String>,
    pub last_event: Option<OrderEvent>,
    pub reconnect_attempts: u32,
    pub is_enabled: bool,
}

/// Rewrite the REST base URL into the push endpoint: `https→wss`,
/// `http→ws`, fixed stream path, no query (identity is appended per
/// connect attempt).
pub fn derive_stream_url(base_url: &str) -> Result<Url, OrdercastError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| OrdercastError::Config(format!("invalid api base url {base_url:?}: {e}")))?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(OrdercastError::Config(format!(
                "unsupported api base url scheme: {other}"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| OrdercastError::Config("cannot rewrite url scheme".to_string()))?;
    url.set_path(push_constants::STREAM_PATH);
    url.set_query(None);
    Ok(url)
}

pub struct LiveOrderService {
    connection: Arc<PushConnection>,
    dispatcher: EventDispatcher,
    session: Arc<dyn SessionProvider>,
    prefs: PreferenceStore,
}

impl LiveOrderService {
    pub fn new(
        config: &AppConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, OrdercastError> {
        let dispatcher = EventDispatcher::new();
        let stream_url = derive_stream_url(&config.api.base_url)?;
        let prefs = PreferenceStore::new(config.preferences_path.clone().into());
        let policy = RetryPolicy {
            base_interval_ms: config.push.base_interval_ms,
            max_attempts: config.push.max_attempts,
        };

        let connection = Arc::new(PushConnection::new(
            stream_url,
            session.clone(),
            dispatcher.clone(),
            policy,
        ));
        connection.set_enabled(prefs.realtime_enabled());

        Ok(Self {
            connection,
            dispatcher,
            session,
            prefs,
        })
    }

    /// Authenticated session present AND venue identity present AND the
    /// user has not disabled realtime updates.
    pub async fn should_connect(&self) -> bool {
        if !self.prefs.realtime_enabled() {
            return false;
        }
        matches!(self.session.current_identity().await, Some(id) if id.is_complete())
    }

    /// Open the push connection when the predicate allows it.
    pub async fn start(&self) {
        if self.should_connect().await {
            self.connection.connect().await;
        } else {
            info!("Realtime updates disabled or session incomplete; staying on the REST read path");
        }
    }

    pub fn status(&self) -> LiveStatus {
        let state = self.connection.state();
        LiveStatus {
            connected: state == ConnectionState::Open,
            connecting: state == ConnectionState::Connecting,
            error: self.connection.last_error(),
            last_event: self.dispatcher.last_event(),
            reconnect_attempts: self.connection.attempts(),
            is_enabled: self.prefs.realtime_enabled(),
        }
    }

    /// Manual connect/disconnect flip from the dashboard.
    pub async fn toggle_connection(&self) {
        match self.connection.state() {
            ConnectionState::Open | ConnectionState::Connecting => self.connection.disconnect(),
            _ => self.start().await,
        }
    }

    /// Persist the enable preference. Disabling tears down the connection
    /// and cancels any pending reconnect; re-enabling does not reconnect by
    /// itself; callers invoke `start()`/`toggle_connection()` explicitly.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), OrdercastError> {
        self.prefs.set_realtime_enabled(enabled)?;
        self.connection.set_enabled(enabled);
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.prefs.realtime_enabled()
    }

    pub fn send_message(&self, data: &Value) -> bool {
        self.connection.send(data)
    }

    pub fn subscribe(&self, kinds: impl IntoIterator<Item = OrderEventKind>) -> Subscription {
        self.dispatcher.subscribe(kinds)
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }
}
