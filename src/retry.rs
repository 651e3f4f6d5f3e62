//! Backoff schedule shared by the conflict refresh loop and the HTTP client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Upper bound (exclusive) of the random delay added to every backoff.
    pub jitter_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`: doubling from the base, capped, plus jitter.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let base = self.base_delay_ms.max(1);
        let cap = self.max_delay_ms.max(base);

        let mut delay_ms = base;
        for _ in 0..attempt {
            delay_ms = delay_ms.saturating_mul(2).min(cap);
        }

        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::random::<u64>() % self.jitter_ms
        };
        Duration::from_millis(delay_ms + jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 150,
            max_delay_ms: 1200,
            jitter_ms: 50,
        }
    }
}
