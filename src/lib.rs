//! Ordercast - realtime order-event delivery for restaurant kitchens
//!
//! This library provides the push-connection manager, typed event
//! dispatcher and urgency classifier behind the staff dashboard.

pub mod api;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod prefs;
pub mod push;
pub mod rest;
pub mod session;
pub mod urgency;

// Re-export commonly used types
pub use dispatcher::{EventDispatcher, Subscription};
pub use events::{Order, OrderEvent, OrderEventKind, OrderStatus};
pub use orchestrator::{LiveOrderService, LiveStatus};
pub use push::{ConnectionState, PushConnection, RetryPolicy};
pub use urgency::{UrgencyConfig, UrgencyLevel};

#[cfg(test)]
mod urgency_tests;
