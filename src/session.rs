use std::env;
use std::sync::Mutex;

use async_trait::async_trait;

/// Venue identity plus bearer token for one authenticated staff session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub venue_id: String,
    pub token: String,
}

impl SessionIdentity {
    /// A connection must never be opened without both halves of the
    /// identity; an empty venue or token is treated as "no session".
    pub fn is_complete(&self) -> bool {
        !self.venue_id.is_empty() && !self.token.is_empty()
    }
}

/// Source of the current session identity.
///
/// Implementations are queried on every (re)connect attempt; tokens rotate
/// and sessions can be invalidated between attempts, so the connection layer
/// never caches what this returns.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_identity(&self) -> Option<SessionIdentity>;
}

/// Reads the bearer token from the environment on each call, with the venue
/// fixed at construction. Token rotation between reconnects is picked up
/// automatically.
pub struct EnvSession {
    venue_id: String,
    token_var: String,
}

impl EnvSession {
    pub fn new(venue_id: String, token_var: String) -> Self {
        Self { venue_id, token_var }
    }
}

#[async_trait]
impl SessionProvider for EnvSession {
    async fn current_identity(&self) -> Option<SessionIdentity> {
        let token = env::var(&self.token_var).unwrap_or_default();
        Some(SessionIdentity {
            venue_id: self.venue_id.clone(),
            token,
        })
    }
}

/// In-memory session, settable at runtime. Used by tests and embedded
/// consumers that manage their own auth flow.
pub struct StaticSession {
    identity: Mutex<Option<SessionIdentity>>,
}

impl StaticSession {
    pub fn new(identity: Option<SessionIdentity>) -> Self {
        Self {
            identity: Mutex::new(identity),
        }
    }

    pub fn set(&self, identity: Option<SessionIdentity>) {
        *self.identity.lock().unwrap() = identity;
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_identity(&self) -> Option<SessionIdentity> {
        self.identity.lock().unwrap().clone()
    }
}
