// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn civil_from_minutes_recovers_the_unix_epoch() {
    let (year, month, day, day_of_week, hour, minute) = civil_from_minutes(0);
    assert_eq!((year, month, day, day_of_week, hour, minute), (1970, 1, 1, 4, 0, 0));
}

#[test]
fn once_fires_only_if_still_in_the_future() {
    let schedule = Schedule::Once { at_epoch_ms: 10_000 };
    assert_eq!(next_fire_ms(&schedule, 5_000), Some(10_000));
    assert_eq!(next_fire_ms(&schedule, 10_000), None);
    assert_eq!(next_fire_ms(&schedule, 20_000), None);
}

#[test]
fn interval_adds_the_period_to_the_reference_time() {
    let schedule = Schedule::Interval { seconds: 60 };
    assert_eq!(next_fire_ms(&schedule, 0), Some(60_000));
}

#[test]
fn manual_never_fires_on_its_own() {
    assert_eq!(next_fire_ms(&Schedule::Manual, 0), None);
}

#[test]
fn cron_every_minute_fires_one_minute_later() {
    let schedule = Schedule::Cron { expr: "* * * * *".to_string() };
    let after_ms = 0;
    let next = next_fire_ms(&schedule, after_ms).unwrap();
    assert_eq!(next, 60_000);
}

#[test]
fn cron_daily_at_midnight_skips_ahead_to_the_next_day() {
    // 1970-01-01T00:30 -> next midnight fire is 1970-01-02T00:00.
    let after_ms = 30 * 60_000;
    let schedule = Schedule::Cron { expr: "0 0 * * *".to_string() };
    let next = next_fire_ms(&schedule, after_ms).unwrap();
    assert_eq!(next, 24 * 60 * 60_000);
}

#[test]
fn cron_specific_weekday_matches_day_of_week_field() {
    // Day of week 4 (Thursday) at minute 0 matches 1970-01-01T00:00 exactly,
    // which is excluded since it is not strictly after `after_ms = -1`
    // equivalent (we start from 0 so the first candidate is minute 1).
    let schedule = Schedule::Cron { expr: "0 0 * * 4".to_string() };
    let next = next_fire_ms(&schedule, 0).unwrap();
    let (_, _, _, day_of_week, hour, minute) = civil_from_minutes(next / 60_000);
    assert_eq!((day_of_week, hour, minute), (4, 0, 0));
}

#[test]
fn invalid_cron_expression_yields_no_fire() {
    let schedule = Schedule::Cron { expr: "not a cron expr".to_string() };
    assert_eq!(next_fire_ms(&schedule, 0), None);
}

#[test]
fn misfire_within_grace_window_is_coalesced() {
    assert!(within_misfire_grace(1_000, 5_000, Duration::from_secs(10)));
    assert!(!within_misfire_grace(1_000, 20_000, Duration::from_secs(10)));
}
