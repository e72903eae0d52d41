// tests/restart_policy.rs

use proptest::prelude::*;

use warden::engine::policy::{RestartDecision, RestartPolicy, decide};
use warden::types::NotificationType;

#[test]
fn restarts_disabled_always_quits() {
    assert_eq!(decide(false, 0, 1), RestartDecision::QuitDisabled);
    assert_eq!(decide(false, 3, 1), RestartDecision::QuitDisabled);
    assert_eq!(decide(false, 3, 10), RestartDecision::QuitDisabled);
}

#[test]
fn limit_is_reached_at_max_restarts() {
    assert_eq!(decide(true, 3, 1), RestartDecision::Restart);
    assert_eq!(decide(true, 3, 2), RestartDecision::Restart);
    assert_eq!(decide(true, 3, 3), RestartDecision::QuitLimit);
    assert_eq!(decide(true, 3, 4), RestartDecision::QuitLimit);
}

#[test]
fn zero_max_restarts_means_unlimited() {
    assert_eq!(decide(true, 0, 1), RestartDecision::Restart);
    assert_eq!(decide(true, 0, u32::MAX), RestartDecision::Restart);
}

#[test]
fn decision_maps_to_notification_type() {
    assert_eq!(
        RestartDecision::Restart.notification_type(),
        NotificationType::Crash
    );
    assert_eq!(
        RestartDecision::QuitLimit.notification_type(),
        NotificationType::RestartLimitReached
    );
    assert_eq!(
        RestartDecision::QuitDisabled.notification_type(),
        NotificationType::NoRestartAllowed
    );
    assert_eq!(NotificationType::Crash.code(), "app-crash");
    assert_eq!(NotificationType::RestartLimitReached.code(), "app-restart-limit");
    assert_eq!(NotificationType::NoRestartAllowed.code(), "app-no-restart");
}

#[test]
fn restart_count_is_formatted_against_the_limit() {
    assert_eq!(RestartPolicy::new(true, 0).format_count(4), "4");
    assert_eq!(RestartPolicy::new(true, 5).format_count(2), "2/5");
}

proptest! {
    #[test]
    fn finite_limit_restarts_below_and_quits_at_limit(max in 1u32..200) {
        let policy = RestartPolicy::new(true, max);
        for count in 1..max {
            prop_assert_eq!(policy.decide(count), RestartDecision::Restart);
        }
        prop_assert_eq!(policy.decide(max), RestartDecision::QuitLimit);
    }

    #[test]
    fn disabled_restarts_ignore_count_and_limit(max in any::<u32>(), count in any::<u32>()) {
        prop_assert_eq!(decide(false, max, count), RestartDecision::QuitDisabled);
    }

    #[test]
    fn decision_is_deterministic(
        enabled in any::<bool>(),
        max in any::<u32>(),
        count in any::<u32>()
    ) {
        prop_assert_eq!(decide(enabled, max, count), decide(enabled, max, count));
    }
}
