//! Sliding window throttle for model calls
//!
//! Keeps outbound model traffic under a provider quota: at most the effective
//! cap of requests per 60 second window, and never closer together than
//! 60 s / cap. Callers block instead of failing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::RateLimitConfig;
use crate::infrastructure::observability::record_rate_limit_wait;

const WINDOW: Duration = Duration::from_secs(60);

/// Window accounting, created lazily on the first call
#[derive(Debug, Default)]
struct WindowState {
    window_start: Option<Instant>,
    count: u32,
    last_request: Option<Instant>,
}

/// Process-wide limiter shared by every model call
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    /// 0 disables throttling
    effective_cap: u32,
    min_interval: Duration,
    window: Duration,
    state: Mutex<WindowState>,
}

impl SlidingWindowLimiter {
    /// Limiter for a provider quota of `requests_per_minute`, using only
    /// `safety_margin` of it
    pub fn new(requests_per_minute: u32, safety_margin: f64) -> Self {
        if requests_per_minute == 0 {
            return Self::disabled();
        }

        let cap = ((requests_per_minute as f64 * safety_margin).floor() as u32).max(1);
        Self::with_limits(cap, WINDOW / cap, WINDOW)
    }

    /// Limiter that never waits
    pub fn disabled() -> Self {
        Self::with_limits(0, Duration::ZERO, WINDOW)
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_minute, config.safety_margin)
    }

    pub fn with_limits(effective_cap: u32, min_interval: Duration, window: Duration) -> Self {
        Self {
            effective_cap,
            min_interval,
            window,
            state: Mutex::new(WindowState::default()),
        }
    }

    pub fn effective_cap(&self) -> u32 {
        self.effective_cap
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call is allowed and count it
    ///
    /// The state lock is held across the wait so concurrent callers queue in
    /// order. Returns the time spent waiting.
    pub async fn acquire(&self) -> Duration {
        if self.effective_cap == 0 {
            return Duration::ZERO;
        }

        let mut state = self.state.lock().await;
        let mut waited = Duration::ZERO;
        let now = Instant::now();

        let window_expired = state
            .window_start
            .is_none_or(|start| now.duration_since(start) >= self.window);
        if window_expired {
            debug!(limit = self.effective_cap, "Starting new rate limit window");
            state.window_start = Some(now);
            state.count = 0;
        }

        if state.count >= self.effective_cap {
            let elapsed = state
                .window_start
                .map(|start| now.duration_since(start))
                .unwrap_or_default();
            let wait = self.window.saturating_sub(elapsed);
            if !wait.is_zero() {
                info!(
                    count = state.count,
                    limit = self.effective_cap,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limit window exhausted, waiting"
                );
                tokio::time::sleep(wait).await;
                waited += wait;
            }
            state.window_start = Some(Instant::now());
            state.count = 0;
        }

        if let Some(last) = state.last_request {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!(wait_ms = delay.as_millis() as u64, "Spacing model requests");
                tokio::time::sleep(delay).await;
                waited += delay;
            }
        }

        state.last_request = Some(Instant::now());
        state.count += 1;

        if !waited.is_zero() {
            record_rate_limit_wait(waited);
        }

        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Paused-clock timers fire on millisecond ticks
    fn assert_about(actual: Duration, expected: Duration) {
        let diff = actual.abs_diff(expected);
        assert!(
            diff <= Duration::from_millis(5),
            "expected about {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_effective_cap_uses_safety_margin() {
        let limiter = SlidingWindowLimiter::new(10, 0.8);
        assert_eq!(limiter.effective_cap(), 8);
        assert_eq!(limiter.min_interval(), Duration::from_millis(7500));

        assert_eq!(SlidingWindowLimiter::new(1, 0.8).effective_cap(), 1);
        assert_eq!(SlidingWindowLimiter::new(0, 0.8).effective_cap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_window_after_cap_calls() {
        let limiter = SlidingWindowLimiter::with_limits(3, Duration::ZERO, WINDOW);
        let start = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        let waited = limiter.acquire().await;

        assert_eq!(waited, WINDOW);
        assert_about(start.elapsed(), WINDOW);
        assert_eq!(limiter.state.lock().await.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_sixty_seconds() {
        let limiter = SlidingWindowLimiter::with_limits(2, Duration::ZERO, WINDOW);

        limiter.acquire().await;
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(limiter.acquire().await, Duration::ZERO);
        assert_eq!(limiter.state.lock().await.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_interval_spaces_requests() {
        let limiter = SlidingWindowLimiter::new(10, 0.8);

        assert_eq!(limiter.acquire().await, Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_about(limiter.acquire().await, Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_limiter_never_waits() {
        let limiter = SlidingWindowLimiter::disabled();
        for _ in 0..100 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_requests_per_minute_disables_throttling() {
        let limiter = SlidingWindowLimiter::new(0, 0.8);
        let start = Instant::now();

        for _ in 0..50 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.min_interval(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialized() {
        let limiter = Arc::new(SlidingWindowLimiter::with_limits(
            100,
            Duration::from_secs(1),
            WINDOW,
        ));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_about(start.elapsed(), Duration::from_secs(3));
        assert_eq!(limiter.state.lock().await.count, 4);
    }
}
