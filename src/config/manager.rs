//! Manager timing and scan configuration.
//!
//! Every bounded wait in the controller takes its limit from here. The
//! defaults are the values the radio integration has always used; a JSON
//! document can override any subset of them.
//!
//! ```
//! use wfx_wifi::config::ManagerConfig;
//!
//! let config = ManagerConfig::from_json(r#"{ "scan_timeout_ms": 2500 }"#).unwrap();
//! assert_eq!(config.scan_timeout_ms, 2500);
//! assert_eq!(config.connect_timeout_ms, 10_000);
//! ```

use super::wifi::{ConfigError, MAX_CHANNEL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum time a caller waits for the control lock.
pub const DEFAULT_LOCK_WAIT_MS: u64 = 60_000;

/// Join and access-point start bound.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Disconnect and access-point stop bound.
pub const DEFAULT_DISCONNECT_TIMEOUT_MS: u64 = 10_000;

/// Scan completion bound.
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 1_000;

/// Channels swept by an active scan.
pub const DEFAULT_SCAN_CHANNELS: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

/// Timeouts and scan settings for one manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// How long an operation waits for the control lock.
    pub lock_wait_ms: u64,
    /// Wait for the join result.
    pub connect_timeout_ms: u64,
    /// Wait for the radio to confirm the station left.
    pub disconnect_timeout_ms: u64,
    /// Wait for the access point start result.
    pub ap_start_timeout_ms: u64,
    /// Wait for the access point to report it stopped.
    pub ap_stop_timeout_ms: u64,
    /// Wait for the scan to complete.
    // TODO: revisit once scan dwell time per channel is configurable; 13
    // active channels rarely finish inside one second on busy air.
    pub scan_timeout_ms: u64,
    /// Channels swept by an active scan, each in 1..=14.
    pub scan_channels: Vec<u8>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            lock_wait_ms: DEFAULT_LOCK_WAIT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            disconnect_timeout_ms: DEFAULT_DISCONNECT_TIMEOUT_MS,
            ap_start_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            ap_stop_timeout_ms: DEFAULT_DISCONNECT_TIMEOUT_MS,
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            scan_channels: DEFAULT_SCAN_CHANNELS.to_vec(),
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_wait_ms == 0 {
            return Err(ConfigError::InvalidTiming("lock_wait_ms must be > 0"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("connect_timeout_ms must be > 0"));
        }
        if self.disconnect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming(
                "disconnect_timeout_ms must be > 0",
            ));
        }
        if self.ap_start_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("ap_start_timeout_ms must be > 0"));
        }
        if self.ap_stop_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("ap_stop_timeout_ms must be > 0"));
        }
        if self.scan_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("scan_timeout_ms must be > 0"));
        }
        if self.scan_channels.is_empty() {
            return Err(ConfigError::EmptyChannelList);
        }
        if let Some(&ch) = self
            .scan_channels
            .iter()
            .find(|&&ch| ch == 0 || ch > MAX_CHANNEL)
        {
            return Err(ConfigError::InvalidChannel(ch));
        }
        Ok(())
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }

    pub fn ap_start_timeout(&self) -> Duration {
        Duration::from_millis(self.ap_start_timeout_ms)
    }

    pub fn ap_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.ap_stop_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManagerConfig::default();
        assert_eq!(config.lock_wait_ms, 60_000);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.disconnect_timeout_ms, 10_000);
        assert_eq!(config.ap_start_timeout_ms, 10_000);
        assert_eq!(config.ap_stop_timeout_ms, 10_000);
        assert_eq!(config.scan_timeout_ms, 1_000);
        assert_eq!(config.scan_channels, (1..=13).collect::<Vec<u8>>());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ManagerConfig::from_json(r#"{ "connect_timeout_ms": 500 }"#).unwrap();
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.scan_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ManagerConfig {
            scan_channels: vec![1, 6, 11],
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ManagerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let result = ManagerConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ManagerConfig::from_json(r#"{ "scan_timeout_ms": 0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidTiming(_))));
    }

    #[test]
    fn test_empty_channel_list_rejected() {
        let config = ManagerConfig {
            scan_channels: Vec::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyChannelList));
    }

    #[test]
    fn test_out_of_range_channel_rejected() {
        let config = ManagerConfig {
            scan_channels: vec![1, 6, 36],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidChannel(36)));
    }
}
