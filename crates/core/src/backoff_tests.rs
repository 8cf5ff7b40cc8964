// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct NoJitter;
impl JitterSource for NoJitter {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

struct FixedJitter(f64);
impl JitterSource for FixedJitter {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

#[test]
fn delays_grow_exponentially_up_to_cap() {
    let mut engine = BackoffEngine::new(
        BackoffConfig::default()
            .initial(Duration::from_secs(1))
            .max(Duration::from_secs(8))
            .multiplier(2.0)
            .jitter(0.0),
    );
    let mut j = NoJitter;
    assert_eq!(engine.next_with(&mut j), Duration::from_secs(1));
    assert_eq!(engine.next_with(&mut j), Duration::from_secs(2));
    assert_eq!(engine.next_with(&mut j), Duration::from_secs(4));
    assert_eq!(engine.next_with(&mut j), Duration::from_secs(8));
    // capped, does not keep growing
    assert_eq!(engine.next_with(&mut j), Duration::from_secs(8));
}

#[test]
fn reset_zeroes_attempt_counter() {
    let mut engine = BackoffEngine::new(BackoffConfig::default().jitter(0.0));
    engine.next_with(&mut NoJitter);
    engine.next_with(&mut NoJitter);
    assert_eq!(engine.attempt(), 2);
    engine.reset();
    assert_eq!(engine.attempt(), 0);
    assert_eq!(engine.next_with(&mut NoJitter), engine.config.initial);
}

#[test]
fn jitter_is_applied_symmetrically() {
    let mut engine = BackoffEngine::new(
        BackoffConfig::default()
            .initial(Duration::from_secs(10))
            .max(Duration::from_secs(100))
            .multiplier(1.0)
            .jitter(0.5),
    );
    let up = engine.next_with(&mut FixedJitter(1.0));
    let mut engine2 = BackoffEngine::new(
        BackoffConfig::default()
            .initial(Duration::from_secs(10))
            .max(Duration::from_secs(100))
            .multiplier(1.0)
            .jitter(0.5),
    );
    let down = engine2.next_with(&mut FixedJitter(-1.0));
    assert_eq!(up, Duration::from_secs(15));
    assert_eq!(down, Duration::from_secs(5));
}

#[test]
fn default_jitter_source_stays_in_bounds() {
    let mut jitter = DefaultJitter::default();
    for _ in 0..1000 {
        let s = jitter.sample();
        assert!((-1.0..=1.0).contains(&s));
    }
}

#[test]
fn fresh_engine_per_series_does_not_share_attempt_state() {
    let mut a = BackoffEngine::new(BackoffConfig::default());
    let mut b = BackoffEngine::new(BackoffConfig::default());
    a.next();
    a.next();
    assert_eq!(a.attempt(), 2);
    assert_eq!(b.attempt(), 0);
}
