//! Per-caller sliding window rate limiting
//!
//! Each caller key keeps the instants of its admitted requests inside the
//! trailing window. Check and record happen under one lock acquisition, so
//! two concurrent requests can never both take the last slot.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_MAX_REQUESTS: usize = 20;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rate-limit partition key: the caller's network address, port ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerKey(IpAddr);

impl From<IpAddr> for CallerKey {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}

impl From<SocketAddr> for CallerKey {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.ip())
    }
}

impl fmt::Display for CallerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller has used up its window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded, retry in {}s", .retry_after.as_secs())]
pub struct RateLimited {
    pub retry_after: Duration,
}

pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    callers: Mutex<HashMap<CallerKey, VecDeque<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            window,
            max_requests,
            callers: Mutex::new(HashMap::new()),
        }
    }

    /// Admit one request for `caller`, recording it on success.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] with the wait until the oldest request leaves
    /// the window when the caller is already at the limit.
    pub async fn admit(&self, caller: CallerKey) -> Result<(), RateLimited> {
        let now = Instant::now();
        let mut callers = self.callers.lock().await;
        let admitted = callers.entry(caller).or_default();
        Self::expire(admitted, now, self.window);

        if admitted.len() >= self.max_requests {
            let oldest = admitted.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(oldest))
                .max(Duration::from_secs(1));
            return Err(RateLimited { retry_after });
        }

        admitted.push_back(now);
        Ok(())
    }

    /// Requests still counted against `caller`
    pub async fn in_window(&self, caller: CallerKey) -> usize {
        let now = Instant::now();
        let mut callers = self.callers.lock().await;
        callers.get_mut(&caller).map_or(0, |admitted| {
            Self::expire(admitted, now, self.window);
            admitted.len()
        })
    }

    /// Drop expired instants and callers with nothing left in the window.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut callers = self.callers.lock().await;
        callers.retain(|_, admitted| {
            Self::expire(admitted, now, self.window);
            !admitted.is_empty()
        });
    }

    pub async fn tracked_callers(&self) -> usize {
        self.callers.lock().await.len()
    }

    /// Sweep stale callers once per window until the runtime shuts down.
    #[must_use]
    pub fn spawn_cleanup(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.window);
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        })
    }

    fn expire(admitted: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = admitted.front() {
            if now.duration_since(oldest) >= window {
                admitted.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}
