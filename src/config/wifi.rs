//! Network parameter types.
//!
//! This module contains platform-independent types describing the network a
//! station joins or an access point advertises. They are validated on
//! construction so the manager only ever sees well-formed parameters.
//!
//! # Example
//!
//! ```
//! use wfx_wifi::config::{NetworkParams, Security, SecurityMode};
//!
//! let params = NetworkParams::new("home", "secret123", 6, Security::Wpa2).unwrap();
//! assert_eq!(params.ssid(), b"home");
//! assert_eq!(params.security().to_mode(), Some(SecurityMode::Wpa2Psk));
//! ```

use std::fmt;
use zeroize::Zeroizing;

/// Maximum SSID length per IEEE 802.11 standard.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum passphrase length (64 hex digits for a raw WPA2 key).
pub const MAX_PASSPHRASE_LEN: usize = 64;

/// Length of a hardware address.
pub const MAX_BSSID_LEN: usize = 6;

/// Highest 2.4 GHz channel number accepted.
pub const MAX_CHANNEL: u8 = 14;

/// Security selector as chosen by the application.
///
/// This is the caller-facing vocabulary. Only the first four values can be
/// mapped onto a radio security mode; the rest exist because scan results
/// can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Security {
    /// No authentication.
    #[default]
    Open,
    /// Legacy WEP.
    Wep,
    /// WPA personal (joins in mixed WPA/WPA2 mode).
    Wpa,
    /// WPA2 personal.
    Wpa2,
    /// WPA2 with 802.1X/EAP authentication.
    Wpa2Enterprise,
    /// Anything the radio cannot classify.
    NotSupported,
}

impl Security {
    /// Map the selector onto the radio's security mode.
    ///
    /// Returns `None` for selectors the radio cannot join or advertise.
    pub fn to_mode(self) -> Option<SecurityMode> {
        match self {
            Self::Open => Some(SecurityMode::Open),
            Self::Wep => Some(SecurityMode::Wep),
            Self::Wpa => Some(SecurityMode::WpaWpa2Psk),
            Self::Wpa2 => Some(SecurityMode::Wpa2Psk),
            Self::Wpa2Enterprise | Self::NotSupported => None,
        }
    }

    /// Short lowercase name, used in logs and tool output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Wep => "wep",
            Self::Wpa => "wpa",
            Self::Wpa2 => "wpa2",
            Self::Wpa2Enterprise => "wpa2-enterprise",
            Self::NotSupported => "unsupported",
        }
    }
}

impl TryFrom<u8> for Security {
    type Error = ConfigError;

    /// Decode the numeric selector used by the C-style control API.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Open),
            1 => Ok(Self::Wep),
            2 => Ok(Self::Wpa),
            3 => Ok(Self::Wpa2),
            4 => Ok(Self::Wpa2Enterprise),
            5 => Ok(Self::NotSupported),
            _ => Err(ConfigError::UnknownSecurity(value)),
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Security mode understood by the radio firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityMode {
    Open,
    Wep,
    /// Mixed WPA/WPA2 pre-shared key.
    WpaWpa2Psk,
    Wpa2Psk,
}

impl SecurityMode {
    /// Firmware encoding of the mode.
    pub fn wire_value(self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Wep => 1,
            Self::WpaWpa2Psk => 2,
            Self::Wpa2Psk => 4,
        }
    }
}

/// Parameters of a network to join or to advertise.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkParams {
    ssid: Vec<u8>,
    passphrase: Zeroizing<Vec<u8>>,
    channel: u8,
    security: Security,
}

impl NetworkParams {
    /// Create validated network parameters.
    ///
    /// The security selector is not checked here; whether the radio can use
    /// it is decided by the operation that consumes the parameters.
    pub fn new(
        ssid: impl AsRef<[u8]>,
        passphrase: impl AsRef<[u8]>,
        channel: u8,
        security: Security,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            ssid: ssid.as_ref().to_vec(),
            passphrase: Zeroizing::new(passphrase.as_ref().to_vec()),
            channel,
            security,
        };
        params.validate()?;
        Ok(params)
    }

    /// Parameters for an open network.
    pub fn open(ssid: impl AsRef<[u8]>, channel: u8) -> Result<Self, ConfigError> {
        Self::new(ssid, b"", channel, Security::Open)
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() {
            return Err(ConfigError::SsidEmpty);
        }
        if self.ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::SsidTooLong {
                len: self.ssid.len(),
                max: MAX_SSID_LEN,
            });
        }
        if self.passphrase.len() > MAX_PASSPHRASE_LEN {
            return Err(ConfigError::PassphraseTooLong {
                len: self.passphrase.len(),
                max: MAX_PASSPHRASE_LEN,
            });
        }
        if self.channel == 0 || self.channel > MAX_CHANNEL {
            return Err(ConfigError::InvalidChannel(self.channel));
        }
        Ok(())
    }

    pub fn ssid(&self) -> &[u8] {
        &self.ssid
    }

    /// SSID as text, replacing invalid UTF-8.
    pub fn ssid_lossy(&self) -> String {
        String::from_utf8_lossy(&self.ssid).into_owned()
    }

    pub fn passphrase(&self) -> &[u8] {
        &self.passphrase
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn security(&self) -> Security {
        self.security
    }
}

// Hand-written so the passphrase never reaches a log line.
impl fmt::Debug for NetworkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkParams")
            .field("ssid", &self.ssid_lossy())
            .field("passphrase_len", &self.passphrase.len())
            .field("channel", &self.channel)
            .field("security", &self.security)
            .finish()
    }
}

/// Errors that can occur during configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SSID is empty.
    SsidEmpty,
    /// SSID exceeds maximum length.
    SsidTooLong { len: usize, max: usize },
    /// Passphrase exceeds maximum length.
    PassphraseTooLong { len: usize, max: usize },
    /// Channel outside 1..=14.
    InvalidChannel(u8),
    /// Numeric security selector with no meaning.
    UnknownSecurity(u8),
    /// A timing value is unusable.
    InvalidTiming(&'static str),
    /// The scan channel list is empty.
    EmptyChannelList,
    /// Invalid data format during deserialization.
    InvalidFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SsidEmpty => write!(f, "SSID cannot be empty"),
            Self::SsidTooLong { len, max } => {
                write!(f, "SSID too long: {} bytes (max {})", len, max)
            }
            Self::PassphraseTooLong { len, max } => {
                write!(f, "passphrase too long: {} bytes (max {})", len, max)
            }
            Self::InvalidChannel(ch) => {
                write!(f, "invalid channel {} (expected 1-{})", ch, MAX_CHANNEL)
            }
            Self::UnknownSecurity(v) => write!(f, "unknown security selector: {}", v),
            Self::InvalidTiming(msg) => write!(f, "invalid timing: {}", msg),
            Self::EmptyChannelList => write!(f, "scan channel list is empty"),
            Self::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== NetworkParams Tests ====================

    #[test]
    fn test_valid_params() {
        let params = NetworkParams::new("home", "secret123", 6, Security::Wpa2).unwrap();
        assert_eq!(params.ssid(), b"home");
        assert_eq!(params.passphrase(), b"secret123");
        assert_eq!(params.channel(), 6);
        assert_eq!(params.security(), Security::Wpa2);
    }

    #[test]
    fn test_open_network() {
        let params = NetworkParams::open("cafe", 1).unwrap();
        assert!(params.passphrase().is_empty());
        assert_eq!(params.security(), Security::Open);
    }

    #[test]
    fn test_empty_ssid() {
        let result = NetworkParams::new("", "secret123", 6, Security::Wpa2);
        assert_eq!(result, Err(ConfigError::SsidEmpty));
    }

    #[test]
    fn test_ssid_too_long() {
        let long_ssid = "a".repeat(33);
        let result = NetworkParams::new(long_ssid, "secret123", 6, Security::Wpa2);
        assert!(matches!(result, Err(ConfigError::SsidTooLong { len: 33, .. })));
    }

    #[test]
    fn test_ssid_max_length() {
        let params = NetworkParams::new("a".repeat(32), "", 6, Security::Open).unwrap();
        assert_eq!(params.ssid().len(), MAX_SSID_LEN);
    }

    #[test]
    fn test_passphrase_too_long() {
        let result = NetworkParams::new("home", "p".repeat(65), 6, Security::Wpa2);
        assert!(matches!(
            result,
            Err(ConfigError::PassphraseTooLong { len: 65, .. })
        ));
    }

    #[test]
    fn test_channel_bounds() {
        assert_eq!(
            NetworkParams::open("home", 0),
            Err(ConfigError::InvalidChannel(0))
        );
        assert_eq!(
            NetworkParams::open("home", 15),
            Err(ConfigError::InvalidChannel(15))
        );
        assert!(NetworkParams::open("home", 14).is_ok());
    }

    #[test]
    fn test_debug_hides_passphrase() {
        let params = NetworkParams::new("home", "secret123", 6, Security::Wpa2).unwrap();
        let debug = format!("{:?}", params);
        assert!(debug.contains("home"));
        assert!(!debug.contains("secret123"));
    }

    // ==================== Security Tests ====================

    #[test]
    fn test_security_mapping_exact() {
        assert_eq!(Security::Open.to_mode(), Some(SecurityMode::Open));
        assert_eq!(Security::Wep.to_mode(), Some(SecurityMode::Wep));
        assert_eq!(Security::Wpa.to_mode(), Some(SecurityMode::WpaWpa2Psk));
        assert_eq!(Security::Wpa2.to_mode(), Some(SecurityMode::Wpa2Psk));
    }

    #[test]
    fn test_security_unmappable() {
        assert_eq!(Security::Wpa2Enterprise.to_mode(), None);
        assert_eq!(Security::NotSupported.to_mode(), None);
    }

    #[test]
    fn test_security_from_selector() {
        assert_eq!(Security::try_from(3), Ok(Security::Wpa2));
        assert_eq!(Security::try_from(9), Err(ConfigError::UnknownSecurity(9)));
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(SecurityMode::Open.wire_value(), 0);
        assert_eq!(SecurityMode::WpaWpa2Psk.wire_value(), 2);
        assert_eq!(SecurityMode::Wpa2Psk.wire_value(), 4);
    }
}
