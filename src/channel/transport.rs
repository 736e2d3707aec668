// ABOUTME: Reconnection policy for the push channel transport
// ABOUTME: Holds transport defaults and the jittered exponential backoff between attempts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Transport tuning for the push channel
///
/// Defaults match the stock Socket.IO client: unlimited attempts, one second
/// initial delay doubling to a five second ceiling with 50% jitter, and a
/// twenty second connect timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    /// Reconnect automatically after the connection is lost
    pub reconnection: bool,
    /// Give up after this many consecutive failed attempts (`None` = never)
    pub reconnection_attempts: Option<u32>,
    /// Delay before the first reconnection attempt
    pub reconnection_delay: Duration,
    /// Upper bound on the delay between attempts
    pub reconnection_delay_max: Duration,
    /// Fraction of each delay applied as random jitter, in `0.0..=1.0`
    pub randomization_factor: f64,
    /// Time allowed for the WebSocket and namespace handshakes
    pub connect_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            reconnection: true,
            reconnection_attempts: None,
            reconnection_delay: Duration::from_millis(1_000),
            reconnection_delay_max: Duration::from_millis(5_000),
            randomization_factor: 0.5,
            connect_timeout: Duration::from_millis(20_000),
        }
    }
}

impl TransportOptions {
    /// Whether another attempt is allowed after `failed` consecutive failures
    #[must_use]
    pub fn allows_attempt(&self, failed: u32) -> bool {
        if !self.reconnection {
            return false;
        }
        match self.reconnection_attempts {
            Some(max) => failed < max,
            None => true,
        }
    }
}

/// Exponential backoff with jitter
#[derive(Debug)]
pub struct Backoff {
    base_ms: f64,
    max_ms: f64,
    jitter: f64,
    attempts: u32,
    rng: StdRng,
}

impl Backoff {
    const FACTOR: f64 = 2.0;
    const MAX_EXPONENT: u32 = 31;

    /// Backoff seeded from OS entropy
    #[must_use]
    pub fn new(options: &TransportOptions) -> Self {
        Self::with_rng(options, StdRng::from_entropy())
    }

    /// Backoff with a caller-supplied generator, for reproducible delays
    #[must_use]
    pub fn with_rng(options: &TransportOptions, rng: StdRng) -> Self {
        Self {
            base_ms: options.reconnection_delay.as_secs_f64() * 1_000.0,
            max_ms: options.reconnection_delay_max.as_secs_f64() * 1_000.0,
            jitter: options.randomization_factor.clamp(0.0, 1.0),
            attempts: 0,
            rng,
        }
    }

    /// Delay before the next attempt; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        // Past 2^31 the product overflows to inf
        let exponent = i32::try_from(self.attempts.min(Self::MAX_EXPONENT)).unwrap_or(0);
        let mut ms = (self.base_ms * Self::FACTOR.powi(exponent)).min(self.max_ms);
        self.attempts = self.attempts.saturating_add(1);

        if self.jitter > 0.0 {
            let roll: f64 = self.rng.gen();
            let deviation = (roll * self.jitter * ms).floor();
            ms = if self.rng.gen_bool(0.5) {
                ms - deviation
            } else {
                ms + deviation
            };
        }

        if !ms.is_finite() {
            ms = self.max_ms;
        }
        Duration::try_from_secs_f64(ms.clamp(0.0, self.max_ms) / 1_000.0)
            .unwrap_or(Duration::ZERO)
    }

    /// Consecutive failures since the last reset
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forget previous failures after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
