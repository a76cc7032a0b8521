//! Unit tests for the connection state machine - driven deterministically,
//! no timers involved.

#[cfg(test)]
mod state_tests {
    use crate::push::state::{CloseOutcome, ConnectionMachine, ConnectionState, RetryPolicy};
    use std::time::Duration;

    fn policy(base_ms: u64, max: u32) -> RetryPolicy {
        RetryPolicy {
            base_interval_ms: base_ms,
            max_attempts: max,
        }
    }

    #[test]
    fn test_initial_state() {
        let machine = ConnectionMachine::new(RetryPolicy::default());
        assert_eq!(machine.state(), ConnectionState::Idle);
        assert_eq!(machine.attempts(), 0);
        assert!(machine.last_error().is_none());
        assert!(machine.is_enabled());
    }

    #[test]
    fn test_open_resets_attempts() {
        let mut machine = ConnectionMachine::new(policy(100, 5));
        assert!(machine.begin_connect());
        machine.on_unexpected_close("connect failed".to_string());
        assert_eq!(machine.attempts(), 1);

        assert!(machine.begin_connect());
        machine.on_open();
        assert_eq!(machine.state(), ConnectionState::Open);
        assert_eq!(machine.attempts(), 0);
        assert!(machine.last_error().is_none());
    }

    #[test]
    fn test_single_live_connection() {
        let mut machine = ConnectionMachine::new(policy(100, 5));
        assert!(machine.begin_connect());
        // Second connect while Connecting is refused
        assert!(!machine.begin_connect());
        machine.on_open();
        // And while Open
        assert!(!machine.begin_connect());
    }

    #[test]
    fn test_backoff_monotonic_and_capped() {
        let p = policy(1_000, 100);
        let mut previous = Duration::ZERO;
        for attempt in 1..=100 {
            let delay = p.delay_for(attempt);
            assert!(delay >= previous, "delay shrank at attempt {attempt}");
            assert!(delay <= Duration::from_millis(30_000));
            previous = delay;
        }
        // Cap actually engages for late attempts
        assert_eq!(p.delay_for(100), Duration::from_millis(30_000));
    }

    #[test]
    fn test_retry_increments_before_firing() {
        let mut machine = ConnectionMachine::new(policy(100, 3));
        machine.begin_connect();
        machine.on_open();

        match machine.on_unexpected_close("eof".to_string()) {
            CloseOutcome::Retry { attempt, delay } => {
                assert_eq!(attempt, 1);
                assert_eq!(delay, Duration::from_millis(100));
            }
            other => panic!("expected Retry, got {other:?}"),
        }
        assert_eq!(machine.attempts(), 1);
        assert_eq!(machine.state(), ConnectionState::Closed);
        assert_eq!(machine.last_error(), Some("eof"));
    }

    #[test]
    fn test_attempts_exhaust_to_failed() {
        let mut machine = ConnectionMachine::new(policy(100, 2));
        machine.begin_connect();
        machine.on_open();

        let first = machine.on_unexpected_close("drop 1".to_string());
        assert!(matches!(first, CloseOutcome::Retry { attempt: 1, .. }));

        machine.begin_connect();
        let second = machine.on_unexpected_close("drop 2".to_string());
        assert!(matches!(second, CloseOutcome::Retry { attempt: 2, .. }));

        machine.begin_connect();
        let third = machine.on_unexpected_close("drop 3".to_string());
        assert_eq!(third, CloseOutcome::Exhausted);
        assert_eq!(machine.state(), ConnectionState::Failed);

        // No further retries out of Failed
        assert_eq!(
            machine.on_unexpected_close("drop 4".to_string()),
            CloseOutcome::Suppressed
        );
    }

    #[test]
    fn test_explicit_connect_restores_budget() {
        let mut machine = ConnectionMachine::new(policy(100, 1));
        machine.begin_connect();
        machine.on_unexpected_close("drop".to_string());
        machine.begin_connect();
        assert_eq!(
            machine.on_unexpected_close("drop".to_string()),
            CloseOutcome::Exhausted
        );
        assert_eq!(machine.state(), ConnectionState::Failed);

        // connect() resets the retry history before attempting
        machine.reset_attempts();
        assert!(machine.begin_connect());
        machine.on_open();
        assert_eq!(machine.state(), ConnectionState::Open);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn test_disabled_suppresses_retry() {
        let mut machine = ConnectionMachine::new(policy(100, 5));
        machine.begin_connect();
        machine.on_open();
        machine.set_enabled(false);

        assert_eq!(
            machine.on_unexpected_close("drop".to_string()),
            CloseOutcome::Suppressed
        );
        assert_eq!(machine.state(), ConnectionState::Closed);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn test_disconnect_idempotent() {
        let mut machine = ConnectionMachine::new(policy(100, 5));
        machine.begin_connect();
        machine.on_open();

        machine.on_disconnect();
        assert_eq!(machine.state(), ConnectionState::Closed);
        machine.on_disconnect();
        assert_eq!(machine.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_close_after_explicit_disconnect_is_suppressed() {
        let mut machine = ConnectionMachine::new(policy(100, 5));
        machine.begin_connect();
        machine.on_open();
        machine.on_disconnect();

        // The reader task may still observe the stream ending; that must
        // not schedule a reconnect.
        assert_eq!(
            machine.on_unexpected_close("stream ended".to_string()),
            CloseOutcome::Suppressed
        );
        assert_eq!(machine.attempts(), 0);
        assert_eq!(machine.state(), ConnectionState::Closed);
    }
}
