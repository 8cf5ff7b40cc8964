// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential + jittered backoff (spec §4.1, component C2).
//!
//! Shared by the Scheduler's retry orchestration and the Gateway
//! transport's reconnect loop. Each logical backoff series owns its own
//! [`BackoffEngine`]; the attempt counter lives on the engine, not in a
//! caller-managed side table.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction parameters for a [`BackoffEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
    /// Jitter fraction applied symmetrically: `d' = d * (1 + U(-jitter, jitter))`.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

impl BackoffConfig {
    crate::setters! {
        set {
            initial: Duration,
            max: Duration,
            multiplier: f64,
            jitter: f64,
        }
    }
}

/// A pure value object yielding successive retry delays.
///
/// `next()` advances the internal attempt counter; `reset()` zeroes it.
/// Construct a fresh engine per logical backoff series (one per reconnect
/// loop, one per retrying Run) — the engine is not meant to be shared.
#[derive(Debug, Clone)]
pub struct BackoffEngine {
    config: BackoffConfig,
    attempt: u32,
}

/// Source of randomness for jitter, injectable so tests are deterministic.
pub trait JitterSource {
    /// Returns a value in `[-1.0, 1.0]`.
    fn sample(&mut self) -> f64;
}

/// Jitter source backed by `rand`-free `std` PRNG state (splitmix64),
/// seeded from the process's monotonic clock so distinct engines diverge.
#[derive(Debug, Clone)]
pub struct DefaultJitter {
    state: u64,
}

impl Default for DefaultJitter {
    fn default() -> Self {
        let seed = std::time::Instant::now().elapsed().as_nanos() as u64 ^ 0x9E37_79B9_7F4A_7C15;
        Self {
            state: seed | 1,
        }
    }
}

impl JitterSource for DefaultJitter {
    fn sample(&mut self) -> f64 {
        // splitmix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
        unit * 2.0 - 1.0
    }
}

impl BackoffEngine {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Returns the delay for the current attempt and advances the counter,
    /// using the default jitter source.
    pub fn next(&mut self) -> Duration {
        self.next_with(&mut DefaultJitter::default())
    }

    /// Same as [`Self::next`] but with an injectable jitter source, for
    /// deterministic tests.
    pub fn next_with(&mut self, jitter: &mut impl JitterSource) -> Duration {
        let exp = self.config.multiplier.powi(self.attempt as i32);
        let base = (self.config.initial.as_secs_f64() * exp).min(self.config.max.as_secs_f64());
        let jittered = base * (1.0 + jitter.sample() * self.config.jitter);
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_secs_f64(jittered.max(0.0))
    }

    /// Zero the attempt counter without changing configuration.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
