//! Access-point configuration store.
//!
//! Holds the last validated soft-AP parameters. A start request reads them;
//! only a successful configure call writes them.

use super::error::WifiError;
use crate::config::{NetworkParams, SecurityMode};
use zeroize::Zeroizing;

/// Parameters the access point is started with.
#[derive(Clone, PartialEq, Eq)]
pub struct ApProfile {
    pub ssid: Vec<u8>,
    pub passphrase: Zeroizing<Vec<u8>>,
    pub channel: u8,
    pub security: SecurityMode,
}

impl std::fmt::Debug for ApProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApProfile")
            .field("ssid", &String::from_utf8_lossy(&self.ssid))
            .field("channel", &self.channel)
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}

/// Stored access-point settings plus the "configured" flag.
#[derive(Debug, Default)]
pub struct ApSettings {
    profile: Option<ApProfile>,
}

impl ApSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `params` and store them.
    ///
    /// On an unmappable security selector the stored settings are left as
    /// they were.
    pub fn configure(&mut self, params: &NetworkParams) -> Result<(), WifiError> {
        let security = params
            .security()
            .to_mode()
            .ok_or(WifiError::UnsupportedParameter("security mode"))?;

        self.profile = Some(ApProfile {
            ssid: params.ssid().to_vec(),
            passphrase: Zeroizing::new(params.passphrase().to_vec()),
            channel: params.channel(),
            security,
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile(&self) -> Option<&ApProfile> {
        self.profile.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Security;

    #[test]
    fn test_unconfigured_by_default() {
        let settings = ApSettings::new();
        assert!(!settings.is_configured());
        assert!(settings.profile().is_none());
    }

    #[test]
    fn test_configure_stores_params() {
        let mut settings = ApSettings::new();
        let params = NetworkParams::new("hotspot", "letmein99", 11, Security::Wpa).unwrap();
        settings.configure(&params).unwrap();

        let profile = settings.profile().unwrap();
        assert_eq!(profile.ssid, b"hotspot");
        assert_eq!(profile.passphrase.as_slice(), b"letmein99");
        assert_eq!(profile.channel, 11);
        assert_eq!(profile.security, SecurityMode::WpaWpa2Psk);
    }

    #[test]
    fn test_invalid_selector_leaves_settings_unchanged() {
        let mut settings = ApSettings::new();
        let good = NetworkParams::new("hotspot", "letmein99", 11, Security::Wpa2).unwrap();
        settings.configure(&good).unwrap();

        let bad = NetworkParams::new("other", "", 1, Security::Wpa2Enterprise).unwrap();
        assert!(matches!(
            settings.configure(&bad),
            Err(WifiError::UnsupportedParameter(_))
        ));

        let profile = settings.profile().unwrap();
        assert_eq!(profile.ssid, b"hotspot");
        assert_eq!(profile.security, SecurityMode::Wpa2Psk);
    }

    #[test]
    fn test_invalid_selector_on_empty_store() {
        let mut settings = ApSettings::new();
        let bad = NetworkParams::new("other", "", 1, Security::NotSupported).unwrap();
        assert!(settings.configure(&bad).is_err());
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_debug_hides_passphrase() {
        let mut settings = ApSettings::new();
        let params = NetworkParams::new("hotspot", "letmein99", 11, Security::Wpa2).unwrap();
        settings.configure(&params).unwrap();
        assert!(!format!("{:?}", settings).contains("letmein99"));
    }
}
