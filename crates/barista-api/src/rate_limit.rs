//! Fixed-window rate limiter middleware.
//!
//! Counts requests per wall-clock second. The window's second and its count
//! share one atomic word (second in the high 32 bits, count in the low 32),
//! so a window reset and the first permit of the new window are a single
//! compare-exchange.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::ApiError;

const COUNT_MASK: u64 = 0xFFFF_FFFF;

fn pack(second: u64, count: u64) -> u64 {
    ((second & COUNT_MASK) << 32) | (count & COUNT_MASK)
}

fn unpack(state: u64) -> (u64, u64) {
    (state >> 32, state & COUNT_MASK)
}

/// Shared limiter state. Clones share the same window.
#[derive(Clone)]
pub struct RateLimiter {
    max_per_sec: u64,
    state: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec: max_per_sec.clamp(1, COUNT_MASK),
            state: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Take a permit for the current second.
    pub fn try_acquire(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(now)
    }

    /// A request stamped with a second older than the current window is
    /// counted against the current window; it never moves the window back.
    fn try_acquire_at(&self, second: u64) -> bool {
        let second = second & COUNT_MASK;
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (window, count) = unpack(current);
            let next = if second > window {
                pack(second, 1)
            } else if count < self.max_per_sec {
                pack(window, count + 1)
            } else {
                return false;
            };
            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Reject requests over the limit with a 429 JSON body.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(req).await
    } else {
        warn!(path = %req.uri().path(), "Rate limit exceeded");
        ApiError::TooManyRequests.into_response()
    }
}
