//! Exponential backoff with symmetric, relative jitter.
//!
//! Each consumed step waits `current_delay * (1 + jitter)` where `jitter` is
//! drawn uniformly from `[-jitter_fraction / 2, jitter_fraction / 2)`. The
//! jitter is resampled after every step, so callers sharing the same
//! parameters drift apart instead of retrying in lockstep.

use std::time::Duration;

use rand::Rng;

use crate::error::NotifierError;

/// Parameters for an [`ExponentialBackoff`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Delay of the first step
    pub base_delay: Duration,
    /// Growth factor applied after each step, must be > 1
    pub multiplier: f64,
    /// Number of steps before the backoff reports exhaustion
    pub max_attempts: u32,
    /// Jitter fraction in [0, 1)
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_attempts: 10,
            jitter_fraction: 0.5,
        }
    }
}

impl BackoffConfig {
    /// Check the parameters without building a backoff.
    pub fn validate(&self) -> Result<(), NotifierError> {
        if !(0.0..1.0).contains(&self.jitter_fraction) {
            return Err(NotifierError::InvalidBackoff(format!(
                "jitter fraction must be in [0, 1), got {}",
                self.jitter_fraction
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(NotifierError::InvalidBackoff(format!(
                "multiplier must be a finite value greater than 1, got {}",
                self.multiplier
            )));
        }
        if self.base_delay.is_zero() {
            return Err(NotifierError::InvalidBackoff(
                "base delay must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stateful delay generator owned by a single dispatch.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    attempts_used: u32,
    current_delay: Duration,
    current_jitter: f64,
}

impl ExponentialBackoff {
    pub fn new(config: BackoffConfig) -> Result<Self, NotifierError> {
        config.validate()?;

        Ok(Self {
            config,
            attempts_used: 0,
            current_delay: config.base_delay,
            current_jitter: sample_jitter(config.jitter_fraction),
        })
    }

    /// True once `max_attempts` steps have been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.attempts_used >= self.config.max_attempts
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Delay the next step will use, before jitter.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Consume one step and return how long to wait for it.
    pub fn next_delay(&mut self) -> Result<Duration, NotifierError> {
        if self.is_exhausted() {
            return Err(NotifierError::BackoffExhausted);
        }

        let jittered = (self.current_delay.as_secs_f64() * (1.0 + self.current_jitter)).max(0.0);
        let delay = Duration::try_from_secs_f64(jittered).unwrap_or(Duration::MAX);

        self.current_delay = Duration::try_from_secs_f64(
            self.current_delay.as_secs_f64() * self.config.multiplier,
        )
        .unwrap_or(Duration::MAX);
        self.current_jitter = sample_jitter(self.config.jitter_fraction);
        self.attempts_used += 1;

        Ok(delay)
    }

    /// Consume one step and sleep for its delay.
    pub async fn delay_and_advance(&mut self) -> Result<Duration, NotifierError> {
        let delay = self.next_delay()?;
        tokio::time::sleep(delay).await;
        Ok(delay)
    }
}

fn sample_jitter(fraction: f64) -> f64 {
    if fraction == 0.0 {
        return 0.0;
    }
    let half = fraction / 2.0;
    rand::rng().random_range(-half..half)
}
