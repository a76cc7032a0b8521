//! Application-wide constants and magic numbers
//!
//! This module centralizes all hardcoded values so thresholds and retry
//! behavior can be tuned in one place.

/// Push connection constants
pub mod push {
    /// Fixed path appended to the derived WebSocket base URL
    pub const STREAM_PATH: &str = "/realtime/orders";

    /// Default delay before the first reconnect attempt
    pub const DEFAULT_BASE_INTERVAL_MS: u64 = 3_000;

    /// Default number of automatic reconnect attempts before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Upper bound on any single backoff delay
    pub const MAX_BACKOFF_MS: u64 = 30_000;
}

/// Urgency classification constants (minutes unless noted)
pub mod urgency {
    /// Orders still in `new` reach warning at this elapsed time
    pub const HIGHLIGHT_NEW_AFTER_MIN: f64 = 5.0;

    /// Orders in `preparing` reach warning at this elapsed time
    pub const HIGHLIGHT_PREPARING_AFTER_MIN: f64 = 15.0;

    /// Critical multiplier applied to the `new` warning threshold
    pub const NEW_CRITICAL_FACTOR: f64 = 1.5;

    /// Critical multiplier applied to the `preparing` warning threshold
    pub const PREPARING_CRITICAL_FACTOR: f64 = 1.3;

    /// Fixed thresholds for orders sitting in `ready`
    pub const READY_WARNING_MIN: f64 = 3.0;
    pub const READY_CRITICAL_MIN: f64 = 5.0;

    /// Service standard during the lunch window
    pub const LUNCH_STANDARD_MIN: f64 = 15.0;

    /// Service standard outside the lunch window
    pub const DINNER_STANDARD_MIN: f64 = 25.0;

    /// Local hours treated as lunch service: [start, end)
    pub const LUNCH_HOUR_START: u32 = 11;
    pub const LUNCH_HOUR_END: u32 = 16;
}

/// Rush detection constants
pub mod rush {
    /// Rolling window over which arrivals are counted
    pub const WINDOW_MINUTES: i64 = 10;

    /// Arrivals within the window that signal a rush
    pub const THRESHOLD: usize = 8;
}

/// Logging event names for structured logging
pub mod events {
    pub const CONNECTION_OPENED: &str = "connection_opened";
    pub const CONNECTION_CLOSED: &str = "connection_closed";
    pub const CONNECTION_FAILED: &str = "connection_failed";
    pub const RECONNECT_SCHEDULED: &str = "reconnect_scheduled";
    pub const FRAME_DROPPED: &str = "frame_dropped";
    pub const FRAME_IGNORED: &str = "frame_ignored";
}
