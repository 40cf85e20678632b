//! WFX wireless control library.
//!
//! Connection lifecycle and mode arbitration for a WiFi radio whose
//! firmware completes commands asynchronously. Everything here is
//! platform-independent and tested on the host; a concrete radio binding
//! implements [`wifi::RadioDriver`].

pub mod config;
pub mod network;
pub mod wifi;

// Re-export commonly used items
pub use config::{ConfigError, ManagerConfig, NetworkParams, Security};
pub use network::{AddressDecision, AddressPhase, NetworkStack};
pub use wifi::{DeviceMode, ScanResult, WifiError, WifiManager};
