//! Runtime configuration for session acquisition and casting.
//!
//! All fields have protocol-derived defaults from [`crate::protocol_constants`];
//! embedders tune them through [`Config`] and validate before use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    CONTROL_TIMEOUT_SECS, DEFAULT_DEVICE_NAME, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY_SECS,
    LOUNGE_TIMEOUT_SECS, MAX_RESPONSE_BODY_BYTES, MIN_FREE_MEMORY_FOR_TLS,
};

/// Configuration for the DIAL session engine and cast coordinator.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    // Session acquisition
    /// Number of app-status polls before a device is marked failed.
    pub poll_attempts: u32,

    /// Fixed delay between app-status polls (seconds). No backoff, no
    /// jitter; the cadence matches application-startup latency on target
    /// hardware.
    pub poll_delay_secs: u64,

    // Timeouts
    /// Timeout for device control-plane and command calls (seconds).
    pub control_timeout_secs: u64,

    /// Timeout for lounge token and cast-launch calls (seconds).
    pub lounge_timeout_secs: u64,

    // Resource guard
    /// Minimum free memory required before any TLS call (bytes).
    pub min_free_memory_bytes: u64,

    // Identity
    /// Remote-control name shown on the device during a bound session.
    pub device_name: String,

    // HTTP
    /// Cap on response body bytes read from any endpoint.
    pub max_response_bytes: usize,
}

impl Config {
    /// Creates a new `Config` with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if any value would cause runtime issues.
    pub fn new(poll_attempts: u32, poll_delay_secs: u64) -> Result<Self, String> {
        let config = Self {
            poll_attempts,
            poll_delay_secs,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_attempts == 0 {
            return Err("poll_attempts must be >= 1".to_string());
        }
        if self.control_timeout_secs == 0 || self.lounge_timeout_secs == 0 {
            return Err("timeouts must be >= 1 second".to_string());
        }
        if self.max_response_bytes == 0 {
            return Err("max_response_bytes must be >= 1".to_string());
        }
        if self.device_name.is_empty() {
            return Err("device_name must not be empty".to_string());
        }
        Ok(())
    }

    /// Timeout for device control-plane and command calls.
    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }

    /// Timeout for lounge token and cast-launch calls.
    pub fn lounge_timeout(&self) -> Duration {
        Duration::from_secs(self.lounge_timeout_secs)
    }

    /// Delay between app-status polls.
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_delay_secs: DEFAULT_POLL_DELAY_SECS,
            control_timeout_secs: CONTROL_TIMEOUT_SECS,
            lounge_timeout_secs: LOUNGE_TIMEOUT_SECS,
            min_free_memory_bytes: MIN_FREE_MEMORY_FOR_TLS,
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            max_response_bytes: MAX_RESPONSE_BODY_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_poll_attempts_rejected() {
        let config = Config {
            poll_attempts: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_device_name_rejected() {
        let config = Config {
            device_name: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
