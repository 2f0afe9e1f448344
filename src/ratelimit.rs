//! Creation rate limiting.
//!
//! A fixed window per client network identity bounds how fast documents
//! can be created. Only the creation endpoint is throttled; reads and
//! updates go through unthrottled.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Prune stale windows once the map grows past this many clients.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// Fixed-window rate limiter keyed by client identity.
pub struct RateLimiter {
    ceiling: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            ceiling: config.max_creations,
            window: Duration::from_secs(config.window_seconds),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one creation attempt from `client`. Over the ceiling,
    /// returns the seconds until the window resets so the caller can
    /// back off and retry.
    pub fn try_acquire(&self, client: &str) -> Result<(), u64> {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: &str, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started_at) < window);
        }

        let entry = windows.entry(client.to_string()).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.count = 0;
            entry.started_at = now;
        }

        if entry.count >= self.ceiling {
            let elapsed = now.duration_since(entry.started_at);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_creations: max,
            window_seconds,
        })
    }

    #[test]
    fn test_ceiling_enforced_within_window() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.try_acquire_at("1.2.3.4", now).is_ok());
        }

        // The fourth is rejected with a retry hint
        let retry_after = limiter.try_acquire_at("1.2.3.4", now).unwrap_err();
        assert!(retry_after >= 1 && retry_after <= 60);
    }

    #[test]
    fn test_window_reset_allows_again() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(limiter.try_acquire_at("1.2.3.4", start).is_ok());
        assert!(limiter.try_acquire_at("1.2.3.4", start).is_err());

        let later = start + Duration::from_secs(61);
        assert!(limiter.try_acquire_at("1.2.3.4", later).is_ok());
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.try_acquire_at("1.2.3.4", now).is_ok());
        assert!(limiter.try_acquire_at("5.6.7.8", now).is_ok());
        assert!(limiter.try_acquire_at("1.2.3.4", now).is_err());
    }

    #[test]
    fn test_prune_drops_stale_windows() {
        let limiter = limiter(1, 1);
        let start = Instant::now();

        for i in 0..=PRUNE_THRESHOLD {
            limiter.try_acquire_at(&format!("client-{i}"), start).unwrap();
        }

        // All windows are stale by now; the next call prunes them
        let later = start + Duration::from_secs(2);
        limiter.try_acquire_at("fresh", later).unwrap();
        assert!(limiter.windows.lock().unwrap().len() <= 2);
    }
}
