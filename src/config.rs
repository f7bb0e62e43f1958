// src/config.rs

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_MIN_STEP_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_STEP_DELAY_MS: u64 = 3000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_ERROR_RATE: f64 = 0.1;

pub const DEFAULT_BROWSER_ENGINE: &str = "Playwright";
pub const DEFAULT_LLM_MODEL: &str = "GPT-4";

/// Runtime settings for the simulated agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Step delays are drawn from `min_step_delay..max_step_delay`.
    pub min_step_delay: Duration,
    pub max_step_delay: Duration,
    pub retry_delay: Duration,
    /// Chance that a step passes through the transient error state.
    pub error_rate: f64,
    pub seed: Option<u64>,
    /// Skip all delays and never fail a step.
    pub instant: bool,
    pub browser_engine: String,
    pub llm_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_step_delay: Duration::from_millis(DEFAULT_MIN_STEP_DELAY_MS),
            max_step_delay: Duration::from_millis(DEFAULT_MAX_STEP_DELAY_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            error_rate: DEFAULT_ERROR_RATE,
            seed: None,
            instant: false,
            browser_engine: DEFAULT_BROWSER_ENGINE.into(),
            llm_model: DEFAULT_LLM_MODEL.into(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_step_delay > self.max_step_delay {
            return Err(ConfigError::InvalidDelayRange {
                min_ms: self.min_step_delay.as_millis() as u64,
                max_ms: self.max_step_delay.as_millis() as u64,
            });
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ConfigError::InvalidErrorRate(self.error_rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_step_delay, Duration::from_secs(1));
        assert_eq!(config.max_step_delay, Duration::from_secs(3));
        assert_eq!(config.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let config = Config {
            min_step_delay: Duration::from_millis(500),
            max_step_delay: Duration::from_millis(100),
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDelayRange {
                min_ms: 500,
                max_ms: 100
            })
        );
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let config = Config {
            min_step_delay: Duration::ZERO,
            max_step_delay: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn error_rate_must_be_a_probability() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let config = Config {
                error_rate: rate,
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidErrorRate(_))),
                "{rate}"
            );
        }
        for rate in [0.0, 1.0] {
            let config = Config {
                error_rate: rate,
                ..Config::default()
            };
            assert!(config.validate().is_ok());
        }
    }
}
