//! Controller configuration.
//!
//! # Components
//!
//! - [`NetworkParams`] and [`Security`] - validated network parameters
//! - [`ManagerConfig`] - timeouts and scan channel plan, loadable from JSON

mod manager;
mod wifi;

pub use manager::{
    ManagerConfig, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DISCONNECT_TIMEOUT_MS,
    DEFAULT_LOCK_WAIT_MS, DEFAULT_SCAN_CHANNELS, DEFAULT_SCAN_TIMEOUT_MS,
};
pub use wifi::{
    ConfigError, NetworkParams, Security, SecurityMode, MAX_BSSID_LEN, MAX_CHANNEL,
    MAX_PASSPHRASE_LEN, MAX_SSID_LEN,
};
