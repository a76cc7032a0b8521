//! Time-based urgency classification for the kitchen dashboard.
//!
//! Pure functions of `(status, created_at, now)`; nothing here holds state
//! about an order. Callers re-invoke on a recurring timer (typically every
//! 15-30s) so urgency escalates visibly even when no new events arrive.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, FixedOffset, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{rush, urgency};
use crate::events::{Order, OrderStatus};

/// Staff-facing severity derived from elapsed time and order status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Normal,
    Warning,
    Critical,
}

/// Named, overridable thresholds. Defaults match the service contract.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    pub highlight_new_after_minutes: f64,
    pub highlight_preparing_after_minutes: f64,
    pub lunch_standard_minutes: f64,
    pub dinner_standard_minutes: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            highlight_new_after_minutes: urgency::HIGHLIGHT_NEW_AFTER_MIN,
            highlight_preparing_after_minutes: urgency::HIGHLIGHT_PREPARING_AFTER_MIN,
            lunch_standard_minutes: urgency::LUNCH_STANDARD_MIN,
            dinner_standard_minutes: urgency::DINNER_STANDARD_MIN,
        }
    }
}

fn elapsed_minutes(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / 60_000.0
}

/// Classify one order's urgency at instant `now`.
///
/// Thresholds per status (warning / critical, minutes):
/// new 5 / 7.5, preparing 15 / 19.5, ready 3 / 5. Served and unknown
/// statuses are always normal.
pub fn classify(
    status: OrderStatus,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &UrgencyConfig,
) -> UrgencyLevel {
    let elapsed = elapsed_minutes(created_at, now);

    let (warning, critical) = match status {
        OrderStatus::New => (
            config.highlight_new_after_minutes,
            config.highlight_new_after_minutes * urgency::NEW_CRITICAL_FACTOR,
        ),
        OrderStatus::Preparing => (
            config.highlight_preparing_after_minutes,
            config.highlight_preparing_after_minutes * urgency::PREPARING_CRITICAL_FACTOR,
        ),
        OrderStatus::Ready => (urgency::READY_WARNING_MIN, urgency::READY_CRITICAL_MIN),
        OrderStatus::Served | OrderStatus::Other => return UrgencyLevel::Normal,
    };

    if elapsed >= critical {
        UrgencyLevel::Critical
    } else if elapsed >= warning {
        UrgencyLevel::Warning
    } else {
        UrgencyLevel::Normal
    }
}

/// Convenience wrapper over [`classify`] with the current wall clock.
pub fn classify_order(order: &Order, config: &UrgencyConfig) -> UrgencyLevel {
    classify(order.status, order.created_at, Utc::now(), config)
}

/// Active service standard for the given local hour: lunch for hours in
/// `[11, 16)`, dinner otherwise.
pub fn service_standard_minutes(local_hour: u32, config: &UrgencyConfig) -> f64 {
    if (urgency::LUNCH_HOUR_START..urgency::LUNCH_HOUR_END).contains(&local_hour) {
        config.lunch_standard_minutes
    } else {
        config.dinner_standard_minutes
    }
}

/// Coarse SLA-breach signal, independent of status.
///
/// `now` carries the local offset so the lunch/dinner band is read from the
/// wall clock the kitchen actually runs on.
pub fn is_order_late_at(
    created_at: DateTime<Utc>,
    now: DateTime<FixedOffset>,
    config: &UrgencyConfig,
) -> bool {
    let standard = service_standard_minutes(now.hour(), config);
    elapsed_minutes(created_at, now.with_timezone(&Utc)) > standard
}

/// [`is_order_late_at`] against the current local clock.
pub fn is_order_late(order: &Order, config: &UrgencyConfig) -> bool {
    is_order_late_at(order.created_at, Local::now().fixed_offset(), config)
}

/// Rolling-window arrival counter used to flag aggregate kitchen load
/// ("rush mode"): 8 or more orders within 10 minutes.
#[derive(Clone, Debug)]
pub struct RushWindow {
    window: Duration,
    threshold: usize,
    arrivals: VecDeque<DateTime<Utc>>,
}

impl Default for RushWindow {
    fn default() -> Self {
        Self {
            window: Duration::minutes(rush::WINDOW_MINUTES),
            threshold: rush::THRESHOLD,
            arrivals: VecDeque::new(),
        }
    }
}

impl RushWindow {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            window,
            threshold,
            arrivals: VecDeque::new(),
        }
    }

    /// Record one order arrival.
    pub fn record(&mut self, at: DateTime<Utc>) {
        self.arrivals.push_back(at);
    }

    /// Whether the kitchen is in a rush at instant `now`. Arrivals older
    /// than the window are pruned as a side effect.
    pub fn is_rush(&mut self, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.window;
        while let Some(front) = self.arrivals.front() {
            if *front < cutoff {
                self.arrivals.pop_front();
            } else {
                break;
            }
        }
        self.arrivals.len() >= self.threshold
    }
}
