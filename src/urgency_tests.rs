//! Unit tests for the urgency classifier - the thresholds kitchen staff
//! rely on are exact contracts, so boundary values are pinned here.

#[cfg(test)]
mod urgency_tests {
    use crate::events::OrderStatus;
    use crate::urgency::{
        classify, is_order_late_at, service_standard_minutes, RushWindow, UrgencyConfig,
        UrgencyLevel,
    };
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

    fn at_elapsed_minutes(minutes: f64) -> (DateTime<Utc>, DateTime<Utc>) {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let now = created + Duration::milliseconds((minutes * 60_000.0) as i64);
        (created, now)
    }

    fn classify_at(status: OrderStatus, minutes: f64) -> UrgencyLevel {
        let cfg = UrgencyConfig::default();
        let (created, now) = at_elapsed_minutes(minutes);
        classify(status, created, now, &cfg)
    }

    #[test]
    fn test_new_order_thresholds() {
        assert_eq!(classify_at(OrderStatus::New, 0.0), UrgencyLevel::Normal);
        assert_eq!(classify_at(OrderStatus::New, 4.9), UrgencyLevel::Normal);
        assert_eq!(classify_at(OrderStatus::New, 5.0), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::New, 7.0), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::New, 7.5), UrgencyLevel::Critical);
        assert_eq!(classify_at(OrderStatus::New, 60.0), UrgencyLevel::Critical);
    }

    #[test]
    fn test_preparing_order_thresholds() {
        assert_eq!(classify_at(OrderStatus::Preparing, 14.9), UrgencyLevel::Normal);
        assert_eq!(classify_at(OrderStatus::Preparing, 15.0), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::Preparing, 19.0), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::Preparing, 19.5), UrgencyLevel::Critical);
    }

    #[test]
    fn test_ready_order_thresholds() {
        assert_eq!(classify_at(OrderStatus::Ready, 2.9), UrgencyLevel::Normal);
        assert_eq!(classify_at(OrderStatus::Ready, 3.0), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::Ready, 4.9), UrgencyLevel::Warning);
        assert_eq!(classify_at(OrderStatus::Ready, 5.0), UrgencyLevel::Critical);
    }

    #[test]
    fn test_served_always_normal() {
        for minutes in [0.0, 10.0, 100.0, 1000.0] {
            assert_eq!(classify_at(OrderStatus::Served, minutes), UrgencyLevel::Normal);
            assert_eq!(classify_at(OrderStatus::Other, minutes), UrgencyLevel::Normal);
        }
    }

    #[test]
    fn test_overridden_thresholds_scale_critical() {
        let cfg = UrgencyConfig {
            highlight_new_after_minutes: 10.0,
            ..UrgencyConfig::default()
        };
        let (created, now) = at_elapsed_minutes(14.0);
        assert_eq!(
            classify(OrderStatus::New, created, now, &cfg),
            UrgencyLevel::Warning
        );
        // Critical tracks the override: 10 * 1.5 = 15
        let (created, now) = at_elapsed_minutes(15.0);
        assert_eq!(
            classify(OrderStatus::New, created, now, &cfg),
            UrgencyLevel::Critical
        );
    }

    #[test]
    fn test_service_standard_by_hour() {
        let cfg = UrgencyConfig::default();
        assert_eq!(service_standard_minutes(10, &cfg), 25.0);
        assert_eq!(service_standard_minutes(11, &cfg), 15.0);
        assert_eq!(service_standard_minutes(15, &cfg), 15.0);
        assert_eq!(service_standard_minutes(16, &cfg), 25.0);
        assert_eq!(service_standard_minutes(23, &cfg), 25.0);
        assert_eq!(service_standard_minutes(0, &cfg), 25.0);
    }

    fn local_now(hour: u32, minute: u32) -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_is_order_late_lunch_window() {
        let cfg = UrgencyConfig::default();
        let now = local_now(12, 30);
        let created = now.with_timezone(&Utc) - Duration::minutes(14);
        assert!(!is_order_late_at(created, now, &cfg));

        // Exactly at the standard is not yet late
        let created = now.with_timezone(&Utc) - Duration::minutes(15);
        assert!(!is_order_late_at(created, now, &cfg));

        let created = now.with_timezone(&Utc) - Duration::minutes(16);
        assert!(is_order_late_at(created, now, &cfg));
    }

    #[test]
    fn test_is_order_late_dinner_window() {
        let cfg = UrgencyConfig::default();
        let now = local_now(19, 0);

        // 20 minutes would be late at lunch but not at dinner
        let created = now.with_timezone(&Utc) - Duration::minutes(20);
        assert!(!is_order_late_at(created, now, &cfg));

        let created = now.with_timezone(&Utc) - Duration::minutes(26);
        assert!(is_order_late_at(created, now, &cfg));
    }

    #[test]
    fn test_lateness_independent_of_status() {
        // is_order_late takes only timestamps; the classifier handles
        // status. A served order 30 minutes old still reads as late.
        let cfg = UrgencyConfig::default();
        let now = local_now(19, 0);
        let created = now.with_timezone(&Utc) - Duration::minutes(30);
        assert!(is_order_late_at(created, now, &cfg));
    }

    #[test]
    fn test_rush_window_threshold() {
        let mut rush = RushWindow::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        for i in 0..7 {
            rush.record(now - Duration::minutes(9) + Duration::seconds(i));
        }
        assert!(!rush.is_rush(now));

        rush.record(now);
        assert!(rush.is_rush(now));
    }

    #[test]
    fn test_rush_window_ages_out() {
        let mut rush = RushWindow::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        for i in 0..8 {
            rush.record(now - Duration::minutes(9) + Duration::seconds(i));
        }
        assert!(rush.is_rush(now));

        // Two minutes later those arrivals fall outside the 10-minute window
        assert!(!rush.is_rush(now + Duration::minutes(2)));
    }

    #[test]
    fn test_rush_window_custom_bounds() {
        let mut rush = RushWindow::new(Duration::minutes(5), 3);
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        rush.record(now - Duration::minutes(4));
        rush.record(now - Duration::minutes(2));
        assert!(!rush.is_rush(now));
        rush.record(now);
        assert!(rush.is_rush(now));
    }
}
