//! Explicit connection state machine.
//!
//! Pure and clock-free: the async manager asks it what to do and owns the
//! actual timers, so tests can drive every transition deterministically.

use std::time::Duration;

use serde::Serialize;

use crate::constants::push;

/// Lifecycle of one logical push connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
    Failed,
}

/// Governs reconnect scheduling after unexpected closes.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub base_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_interval_ms: push::DEFAULT_BASE_INTERVAL_MS,
            max_attempts: push::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given 1-based attempt: linear in the attempt
    /// number, capped. Monotonic non-decreasing by construction.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = self
            .base_interval_ms
            .saturating_mul(attempt as u64)
            .min(push::MAX_BACKOFF_MS);
        Duration::from_millis(ms)
    }
}

/// What the manager should do after an unexpected close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Schedule a reconnect timer for this attempt after this delay.
    Retry { attempt: u32, delay: Duration },
    /// Attempts exhausted; terminal until an explicit connect().
    Exhausted,
    /// Nothing to do: disabled by the user, or the close was already
    /// handled by an explicit disconnect.
    Suppressed,
}

/// State, attempt counter and user preference for one connection.
///
/// Invariants: the attempt counter resets to zero on every transition into
/// `Open`; no retry is ever produced while disabled or once the counter has
/// reached `max_attempts`.
#[derive(Debug)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempts: u32,
    last_error: Option<String>,
    enabled: bool,
    policy: RetryPolicy,
}

impl ConnectionMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            attempts: 0,
            last_error: None,
            enabled: true,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// An explicit connect() wipes the retry history, so a `Failed`
    /// connection gets a fresh budget of attempts.
    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
        self.last_error = None;
    }

    /// Move to `Connecting`. Returns false (and does nothing) when a
    /// connection is already open or being opened; only one live
    /// connection per instance is permitted.
    pub fn begin_connect(&mut self) -> bool {
        if matches!(self.state, ConnectionState::Open | ConnectionState::Connecting) {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Open;
        self.attempts = 0;
        self.last_error = None;
    }

    /// Explicit disconnect. Idempotent; always lands in `Closed`.
    pub fn on_disconnect(&mut self) {
        self.state = ConnectionState::Closed;
    }

    /// Record an unexpected close (network error, abrupt EOF, auth
    /// rejection, all observed as the same signal) and decide whether a
    /// reconnect should be scheduled. The attempt counter increments when
    /// the retry is produced, before the timer fires.
    pub fn on_unexpected_close(&mut self, error: String) -> CloseOutcome {
        if matches!(
            self.state,
            ConnectionState::Closed | ConnectionState::Idle | ConnectionState::Failed
        ) {
            // Already settled by an explicit disconnect or a prior close.
            return CloseOutcome::Suppressed;
        }

        self.last_error = Some(error);

        if !self.enabled {
            self.state = ConnectionState::Closed;
            return CloseOutcome::Suppressed;
        }

        if self.attempts >= self.policy.max_attempts {
            self.state = ConnectionState::Failed;
            return CloseOutcome::Exhausted;
        }

        self.attempts += 1;
        self.state = ConnectionState::Closed;
        CloseOutcome::Retry {
            attempt: self.attempts,
            delay: self.policy.delay_for(self.attempts),
        }
    }
}
