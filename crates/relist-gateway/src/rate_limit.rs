//! Request-level rate limiting.
//!
//! A fixed-window counter keyed by actor and action. The in-memory
//! implementation below is per-process; a multi-instance deployment swaps
//! in a shared TTL counter store behind the same [`RateLimiter`] trait.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use relist_core::ActorId;
use tracing::debug;

use crate::api::ApiError;

/// Limiter capability the gateway dispatches through.
pub trait RateLimiter: Send + Sync {
    /// Checks and records one request for `actor` performing `action`.
    fn check(&self, actor: ActorId, action: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by actor and action.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: RwLock<HashMap<(ActorId, String), Window>>,
}

impl FixedWindowLimiter {
    /// Creates a limiter allowing `max_requests` per `window` per
    /// actor/action pair.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// One request per second per action, sixty per minute.
    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Drops expired windows. Called opportunistically when the map grows.
    fn prune(&self, now: Instant) {
        let mut windows = self.windows.write();
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

/// Map size at which a check triggers a prune pass.
const PRUNE_THRESHOLD: usize = 10_000;

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, actor: ActorId, action: &str) -> Result<(), ApiError> {
        let now = Instant::now();
        if self.windows.read().len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut windows = self.windows.write();
        let window = windows
            .entry((actor, action.to_string()))
            .or_insert(Window { started: now, count: 0 });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            debug!(actor = %actor, action, count = window.count, "rate limit exceeded");
            return Err(ApiError::rate_limited(action));
        }
        window.count += 1;
        Ok(())
    }
}

/// Limiter that admits everything. For tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedLimiter;

impl RateLimiter for UnlimitedLimiter {
    fn check(&self, _actor: ActorId, _action: &str) -> Result<(), ApiError> {
        Ok(())
    }
}
