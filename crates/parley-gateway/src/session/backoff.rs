//! Reconnect backoff
//!
//! Exponential backoff with full jitter: each delay is drawn uniformly from
//! zero up to the exponential cap, so a fleet of clients dropped by the same
//! outage does not reconnect in lockstep.

use std::time::Duration;

use rand::Rng;

use crate::config::ReconnectConfig;

pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            base: config.base_delay,
            max: config.max_delay,
            attempt: 0,
        }
    }

    /// Consecutive failed attempts since the last reset
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failure and compute the delay before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        let exp = self
            .base
            .saturating_mul(2_u32.saturating_pow(self.attempt))
            .min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let cap = exp.as_millis() as u64;
        if cap == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=cap))
    }

    /// Reset after a connection reaches Ready
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
