//! Fixed-window requests-per-minute limiter.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    started: Instant,
    used: u32,
}

/// Caps outbound calls to one provider per 60 second window.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Mutex<Window>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self {
            limit,
            window: Mutex::new(Window {
                started: Instant::now(),
                used: 0,
            }),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Take one permit if the current window has room.
    pub fn try_acquire(&self) -> bool {
        let mut window = self.window.lock();
        if window.started.elapsed() >= WINDOW {
            window.started = Instant::now();
            window.used = 0;
        }
        if window.used < self.limit {
            window.used += 1;
            true
        } else {
            false
        }
    }

    /// Permits left in the current window.
    pub fn remaining(&self) -> u32 {
        let window = self.window.lock();
        if window.started.elapsed() >= WINDOW {
            self.limit
        } else {
            self.limit.saturating_sub(window.used)
        }
    }
}
