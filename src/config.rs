//! Engine configuration.
//!
//! All tunables in one place, with builder-style setters. The defaults
//! reproduce standard production behavior; embedders override only what
//! they need:
//!
//! ```
//! use agro_schedule::EngineConfig;
//!
//! let config = EngineConfig::new()
//!     .with_horizon_days(90)
//!     .with_default_device("205");
//! assert_eq!(config.horizon_days, 90);
//! ```

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::conflict::{DEFAULT_CONFLICT_LOOKAHEAD_DAYS, DEFAULT_HORMONE_BUFFER_DAYS};
use crate::evaluator::{DEFAULT_AI_STOP_CONFIDENCE, DEFAULT_STOP_BUFFER};
use crate::expand::DEFAULT_HORIZON_DAYS;
use crate::safe_date::{DEFAULT_RESCHEDULE_DAYS, DEFAULT_SAFE_DATE_LOOKAHEAD_DAYS};

/// Bounded retry with doubling backoff, for feed calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (first call included).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries (single attempt, no sleeping). Used
    /// in tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Runs `op` until it succeeds or attempts run out, sleeping with
    /// doubling backoff between attempts. Returns the last error when
    /// all attempts fail.
    pub fn run<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts => {
                    warn!(%err, attempt, "{label} failed, retrying");
                    if !backoff.is_zero() {
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Engine tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Schedule generation horizon past the plot start date (days).
    pub horizon_days: i64,
    /// Fallback reschedule offset when no safe day is found (days).
    pub reschedule_days: i64,
    /// Forward scan window of the safe-date finder (days).
    pub safe_date_lookahead_days: u32,
    /// Forward scan bound of the conflict resolver (days).
    pub conflict_lookahead_days: u32,
    /// Default hormone buffer when tasks carry no override (days).
    pub hormone_buffer_days: u32,
    /// Tolerance separating a soft breach (Pending) from a hard one
    /// (Stop).
    pub stop_buffer: f64,
    /// Minimum predictor confidence to escalate to Stop.
    pub ai_stop_confidence: f64,
    /// Sensor device used for plots without one of their own.
    pub default_device_id: String,
    /// Historical days requested from the weather feed.
    pub weather_past_days: u32,
    /// Forecast days requested from the weather feed.
    pub weather_forecast_days: u32,
    /// Retry policy for weather calls.
    pub weather_retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            reschedule_days: DEFAULT_RESCHEDULE_DAYS,
            safe_date_lookahead_days: DEFAULT_SAFE_DATE_LOOKAHEAD_DAYS,
            conflict_lookahead_days: DEFAULT_CONFLICT_LOOKAHEAD_DAYS,
            hormone_buffer_days: DEFAULT_HORMONE_BUFFER_DAYS,
            stop_buffer: DEFAULT_STOP_BUFFER,
            ai_stop_confidence: DEFAULT_AI_STOP_CONFIDENCE,
            default_device_id: "205".to_string(),
            weather_past_days: 1,
            weather_forecast_days: 14,
            weather_retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generation horizon.
    pub fn with_horizon_days(mut self, days: i64) -> Self {
        self.horizon_days = days;
        self
    }

    /// Sets the fallback reschedule offset.
    pub fn with_reschedule_days(mut self, days: i64) -> Self {
        self.reschedule_days = days;
        self
    }

    /// Sets the safe-date lookahead.
    pub fn with_safe_date_lookahead(mut self, days: u32) -> Self {
        self.safe_date_lookahead_days = days;
        self
    }

    /// Sets the default hormone buffer.
    pub fn with_hormone_buffer_days(mut self, days: u32) -> Self {
        self.hormone_buffer_days = days;
        self
    }

    /// Sets the stop buffer.
    pub fn with_stop_buffer(mut self, buffer: f64) -> Self {
        self.stop_buffer = buffer;
        self
    }

    /// Sets the AI Stop-confidence floor.
    pub fn with_ai_stop_confidence(mut self, confidence: f64) -> Self {
        self.ai_stop_confidence = confidence;
        self
    }

    /// Sets the fallback sensor device.
    pub fn with_default_device(mut self, device_id: impl Into<String>) -> Self {
        self.default_device_id = device_id.into();
        self
    }

    /// Sets the weather retry policy.
    pub fn with_weather_retry(mut self, policy: RetryPolicy) -> Self {
        self.weather_retry = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.horizon_days, 120);
        assert_eq!(config.reschedule_days, 2);
        assert_eq!(config.safe_date_lookahead_days, 7);
        assert_eq!(config.hormone_buffer_days, 7);
        assert_eq!(config.stop_buffer, 10.0);
        assert_eq!(config.ai_stop_confidence, 0.70);
        assert_eq!(config.default_device_id, "205");
    }

    #[test]
    fn test_retry_succeeds_after_failures() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::ZERO,
        };
        let result: Result<u32, String> = policy.run("op", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("transient".to_string())
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_returns_last_error() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::ZERO,
        };
        let result: Result<u32, String> = policy.run("op", || {
            calls.set(calls.get() + 1);
            Err(format!("attempt {}", calls.get()))
        });
        assert_eq!(result, Err("attempt 3".to_string()));
    }

    #[test]
    fn test_retry_none_runs_once() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = RetryPolicy::none().run("op", || {
            calls.set(calls.get() + 1);
            Err("down".to_string())
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
