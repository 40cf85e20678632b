//! Radio driver adapter interface.
//!
//! The manager never talks to the radio firmware directly. It submits
//! commands through [`RadioDriver`], which returns as soon as the command is
//! queued; the outcome arrives later through the
//! [`RadioEvents`](super::RadioEvents) callbacks on the driver's own
//! execution context.

use crate::config::{SecurityMode, MAX_BSSID_LEN};
use std::fmt;

/// Firmware status value meaning success.
pub const STATUS_SUCCESS: u32 = 0;

/// Radio interface a command or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    Station,
    AccessPoint,
}

/// 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; MAX_BSSID_LEN]);

impl MacAddress {
    pub const fn new(octets: [u8; MAX_BSSID_LEN]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; MAX_BSSID_LEN] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

/// Scan mode requested from the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Probe requests are sent on every channel.
    Active,
    /// Listen for beacons only.
    Passive,
}

/// Outcome of a join attempt as reported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Success,
    NoMatchingAp,
    ConnectionAborted,
    ConnectionTimeout,
    RejectedByAp,
    AuthFailure,
    Other(u32),
}

impl ConnectStatus {
    /// Decode the firmware status value.
    pub fn from_code(code: u32) -> Self {
        match code {
            STATUS_SUCCESS => Self::Success,
            0x06 => Self::NoMatchingAp,
            0x07 => Self::ConnectionAborted,
            0x08 => Self::ConnectionTimeout,
            0x09 => Self::RejectedByAp,
            0x0A => Self::AuthFailure,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Success => STATUS_SUCCESS,
            Self::NoMatchingAp => 0x06,
            Self::ConnectionAborted => 0x07,
            Self::ConnectionTimeout => 0x08,
            Self::RejectedByAp => 0x09,
            Self::AuthFailure => 0x0A,
            Self::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ConnectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "connection succeeded"),
            Self::NoMatchingAp => write!(f, "access point not found"),
            Self::ConnectionAborted => write!(f, "connection aborted"),
            Self::ConnectionTimeout => write!(f, "connection timeout"),
            Self::RejectedByAp => write!(f, "rejected by the access point"),
            Self::AuthFailure => write!(f, "authentication failure"),
            Self::Other(code) => write!(f, "connection attempt error (status {})", code),
        }
    }
}

/// Security capability bitfield carried in a scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(pub u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const WEP: Self = Self(1 << 0);
    pub const WPA: Self = Self(1 << 1);
    pub const WPA2: Self = Self(1 << 2);
    pub const PMF: Self = Self(1 << 4);
    pub const PSK: Self = Self(1 << 6);
    pub const EAP: Self = Self(1 << 7);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// One scan result exactly as the radio reports it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawScanResult {
    /// SSID bytes, possibly longer than the 802.11 maximum.
    pub ssid: Vec<u8>,
    pub bssid: MacAddress,
    pub channel: u16,
    /// Received channel power indicator.
    pub rcpi: u16,
    pub capabilities: Capabilities,
}

/// Errors reported by the driver when a command cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The radio has not been initialised or was shut down.
    NotStarted,
    /// The firmware rejected the command with a status value.
    Status(u32),
    /// The host-to-radio transport failed.
    Transport(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "radio not started"),
            Self::Status(code) => write!(f, "firmware status {}", code),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

/// Asynchronous command interface of the radio.
///
/// Every `issue_*` method only submits the command. Completion is signalled
/// later through the event sink the driver was constructed with; an `Err`
/// means no completion will follow.
pub trait RadioDriver: Send {
    /// Bring the radio up (firmware load, interface setup).
    fn init(&mut self) -> Result<(), DriverError>;

    /// Whether [`init`](Self::init) has completed and no shutdown followed.
    fn is_started(&self) -> bool;

    fn shutdown(&mut self) -> Result<(), DriverError>;

    /// Hardware address of the given interface.
    fn mac_address(&self, iface: Interface) -> MacAddress;

    fn issue_join(
        &mut self,
        ssid: &[u8],
        channel: u8,
        security: SecurityMode,
        passphrase: &[u8],
    ) -> Result<(), DriverError>;

    fn issue_disconnect(&mut self) -> Result<(), DriverError>;

    fn issue_scan(&mut self, mode: ScanMode, channels: &[u8]) -> Result<(), DriverError>;

    fn issue_start_ap(
        &mut self,
        channel: u8,
        ssid: &[u8],
        security: SecurityMode,
        passphrase: &[u8],
    ) -> Result<(), DriverError>;

    fn issue_stop_ap(&mut self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display() {
        let mac = MacAddress::new([0x00, 0x0d, 0x6f, 0xab, 0xcd, 0x01]);
        assert_eq!(mac.to_string(), "00:0d:6f:ab:cd:01");
    }

    #[test]
    fn test_connect_status_codes() {
        assert_eq!(ConnectStatus::from_code(0), ConnectStatus::Success);
        assert_eq!(ConnectStatus::from_code(0x0A), ConnectStatus::AuthFailure);
        assert_eq!(ConnectStatus::from_code(0x55), ConnectStatus::Other(0x55));
        assert_eq!(ConnectStatus::RejectedByAp.code(), 0x09);
        assert!(!ConnectStatus::NoMatchingAp.is_success());
    }

    #[test]
    fn test_capabilities_bits() {
        let caps = Capabilities::WPA2 | Capabilities::PSK;
        assert!(caps.contains(Capabilities::WPA2));
        assert!(caps.contains(Capabilities::PSK));
        assert!(!caps.contains(Capabilities::EAP));
        assert!(Capabilities::NONE.is_empty());
    }
}
