//! Request pacing
//!
//! Time source and sleep seam shared by the review client and the batch
//! driver, plus the spacing and exponential backoff policy. Production code
//! runs on [`TokioClock`]; tests drive [`ManualClock`], which returns
//! immediately from `sleep` while advancing its virtual time and recording
//! every wait.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source with an awaitable sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` advances `now` instantly and is recorded.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    origin: Instant,
    offset: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState {
                origin: Instant::now(),
                offset: Duration::ZERO,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Move virtual time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        self.inner.lock().offset += duration;
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().sleeps.clone()
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().offset
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock();
        state.origin + state.offset
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.inner.lock();
        state.offset += duration;
        state.sleeps.push(duration);
    }
}

/// Spacing and retry parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum seconds between consecutive outbound requests
    #[serde(default = "default_min_request_interval")]
    pub min_request_interval_secs: f64,

    /// Base of the exponential backoff, in seconds
    #[serde(default = "default_base_wait")]
    pub base_wait_secs: u64,

    /// Total attempts per review, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after each saved review, in seconds
    #[serde(default = "default_post_success_delay")]
    pub post_success_delay_secs: f64,
}

/// Longest spacing or pause accepted from configuration (one day).
pub const MAX_DELAY_SECS: f64 = 86_400.0;

fn default_min_request_interval() -> f64 {
    6.0
}

fn default_base_wait() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_post_success_delay() -> f64 {
    10.0
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_request_interval_secs: default_min_request_interval(),
            base_wait_secs: default_base_wait(),
            max_attempts: default_max_attempts(),
            post_success_delay_secs: default_post_success_delay(),
        }
    }
}

impl PacingConfig {
    pub fn min_request_interval(&self) -> Duration {
        seconds(self.min_request_interval_secs)
    }

    pub fn post_success_delay(&self) -> Duration {
        seconds(self.post_success_delay_secs)
    }

    /// `base_wait * 2^attempt`, with `attempt` counted from zero.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_secs(self.base_wait_secs.saturating_mul(factor))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        check_delay("min_request_interval_secs", self.min_request_interval_secs)?;
        check_delay("post_success_delay_secs", self.post_success_delay_secs)?;
        Ok(())
    }
}

fn check_delay(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&value) {
        return Err(format!(
            "{} must be between 0 and {} seconds, got {}",
            name, MAX_DELAY_SECS, value
        ));
    }
    Ok(())
}

/// Seconds to a `Duration`; negative or NaN is zero, overflow saturates.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Time left before another request may go out.
pub fn remaining_interval(
    last_request: Option<Instant>,
    now: Instant,
    min_interval: Duration,
) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last_request?);
    if elapsed < min_interval {
        Some(min_interval - elapsed)
    } else {
        None
    }
}
