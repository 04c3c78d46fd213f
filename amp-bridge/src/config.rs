//! Bridge configuration
//!
//! Configuration comes from the environment, the way the bridge is
//! deployed in practice (one process per controller chain, configured by
//! its supervisor):
//!
//! - `AMP_DEVICE` - serial device path (default `/dev/ttyUSB0`)
//! - `AMP_BAUDRATE` - baud rate (default 9600)
//! - `AMP_COUNT` - controllers in the daisy chain, 1-9 (default 1)
//! - `AMP_REQUERY` - `true` to requery the chain on every read
//! - `AMP_WAIT_TIMEOUT_MS` - per-wait deadline in milliseconds

use std::time::Duration;

use thiserror::Error;

/// A configuration environment variable could not be interpreted
#[derive(Debug, Error)]
#[error("invalid value '{value}' for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Runtime configuration for one bridge instance
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Serial device path
    pub device: String,

    /// Serial baud rate
    pub baud_rate: u32,

    /// Number of controller units in the chain (1-9)
    pub controller_count: u8,

    /// Requery the whole chain on every read instead of serving cached
    /// state
    pub requery: bool,

    /// Deadline applied to every wait on the zone registry
    pub wait_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            controller_count: 1,
            requery: false,
            wait_timeout: Duration::from_millis(3000),
        }
    }
}

impl BridgeConfig {
    /// Builds a configuration from the environment, defaulting anything
    /// unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let device = std::env::var("AMP_DEVICE").unwrap_or(defaults.device);

        let baud_rate = parse_var("AMP_BAUDRATE", defaults.baud_rate, "not a number")?;

        let controller_count: u8 =
            parse_var("AMP_COUNT", defaults.controller_count, "not a number")?;
        if !(1..=9).contains(&controller_count) {
            return Err(ConfigError {
                var: "AMP_COUNT",
                value: controller_count.to_string(),
                reason: "controller count must be 1-9",
            });
        }

        let requery = std::env::var("AMP_REQUERY")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.requery);

        let timeout_ms: u64 = parse_var(
            "AMP_WAIT_TIMEOUT_MS",
            defaults.wait_timeout.as_millis() as u64,
            "not a number",
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError {
                var: "AMP_WAIT_TIMEOUT_MS",
                value: timeout_ms.to_string(),
                reason: "waits must be bounded by a nonzero deadline",
            });
        }

        Ok(Self {
            device,
            baud_rate,
            controller_count,
            requery,
            wait_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Total zones across the configured chain
    pub fn zone_count(&self) -> usize {
        self.controller_count as usize * amp_protocol::ZONES_PER_CONTROLLER as usize
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    default: T,
    reason: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError {
            var,
            value,
            reason,
        }),
        Err(_) => Ok(default),
    }
}
