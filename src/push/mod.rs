pub mod manager;
pub mod state;

pub use manager::PushConnection;
pub use state::{CloseOutcome, ConnectionMachine, ConnectionState, RetryPolicy};

#[cfg(test)]
mod state_tests;
