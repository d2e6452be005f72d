//! Process-wide call budget for outbound API requests.
//!
//! Keeps a sliding log of the most recent acquisition instants. A caller
//! that would exceed `calls` within `period` waits until the oldest entry
//! ages out of the window instead of failing.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Sliding-window limiter shared by every request the client issues.
#[derive(Debug)]
pub struct RateLimiter {
    calls: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `calls` acquisitions per `period`.
    ///
    /// `calls` must be non-zero; `AppConfig::validate` enforces this.
    pub fn new(calls: usize, period: Duration) -> Self {
        Self {
            calls: calls.max(1),
            period,
            window: Mutex::new(VecDeque::with_capacity(calls.max(1))),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait until a slot is free, then consume it.
    ///
    /// The lock is held across the wait so callers are served in order.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;

        let now = Instant::now();
        evict_expired(&mut window, now, self.period);

        if window.len() >= self.calls {
            if let Some(&oldest) = window.front() {
                let ready_at = oldest + self.period;
                debug!(
                    wait_ms = ready_at.saturating_duration_since(now).as_millis() as u64,
                    limit = self.calls,
                    "Rate limit reached, waiting for capacity"
                );
                sleep_until(ready_at).await;
                evict_expired(&mut window, Instant::now(), self.period);
            }
        }

        window.push_back(Instant::now());
    }

    /// Remaining calls available in the current window without waiting.
    pub async fn available(&self) -> usize {
        let mut window = self.window.lock().await;
        evict_expired(&mut window, Instant::now(), self.period);
        self.calls.saturating_sub(window.len())
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(&front) = window.front() {
        if now.saturating_duration_since(front) >= period {
            window.pop_front();
        } else {
            break;
        }
    }
}
