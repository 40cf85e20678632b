//! Scan result assembly.
//!
//! Per-result notifications from the radio are converted into
//! [`ScanResult`] entries and appended to a capacity-bounded
//! [`ScanCollector`]. Conversion covers SSID truncation, the RCPI to dBm
//! transform and security classification from the capability bitfield.

use super::driver::{Capabilities, MacAddress, RawScanResult};
use crate::config::{Security, MAX_SSID_LEN};

/// RCPI value corresponding to 0 dBm.
pub const RCPI_ZERO_DBM: i32 = 220;

/// Convert a received channel power indicator to dBm.
///
/// `rssi = (rcpi - 220) / 2`, truncating toward zero.
pub fn rcpi_to_dbm(rcpi: u16) -> i16 {
    // Fits: (u16::MAX - 220) / 2 < i16::MAX
    ((i32::from(rcpi) - RCPI_ZERO_DBM) / 2) as i16
}

/// Classify the security of a network from its capability bits.
///
/// An empty bitfield is open. Otherwise the checks run WEP, then WPA, then
/// WPA2, each later match overriding the earlier one; within WPA2 the PSK bit
/// wins over EAP. No match at all is [`Security::NotSupported`].
pub fn classify_security(caps: Capabilities) -> Security {
    if caps.is_empty() {
        return Security::Open;
    }

    let mut security = Security::NotSupported;
    if caps.contains(Capabilities::WEP) {
        security = Security::Wep;
    }
    if caps.contains(Capabilities::WPA) {
        security = Security::Wpa;
    }
    if caps.contains(Capabilities::WPA2) {
        if caps.contains(Capabilities::PSK) {
            security = Security::Wpa2;
        } else if caps.contains(Capabilities::EAP) {
            security = Security::Wpa2Enterprise;
        }
    }
    security
}

/// A network found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResult {
    /// SSID, at most 32 bytes.
    pub ssid: Vec<u8>,
    pub bssid: MacAddress,
    pub channel: u8,
    /// Always false; the radio does not report hidden networks.
    pub hidden: bool,
    /// Signal strength in dBm.
    pub rssi: i16,
    pub security: Security,
}

impl ScanResult {
    pub fn from_raw(raw: &RawScanResult) -> Self {
        let ssid_len = raw.ssid.len().min(MAX_SSID_LEN);
        Self {
            ssid: raw.ssid[..ssid_len].to_vec(),
            bssid: raw.bssid,
            channel: u8::try_from(raw.channel).unwrap_or(u8::MAX),
            hidden: false,
            rssi: rcpi_to_dbm(raw.rcpi),
            security: classify_security(raw.capabilities),
        }
    }

    pub fn ssid_lossy(&self) -> String {
        String::from_utf8_lossy(&self.ssid).into_owned()
    }
}

/// Capacity-bounded scan result buffer with a write cursor.
#[derive(Debug)]
pub struct ScanCollector {
    entries: Vec<ScanResult>,
    capacity: usize,
    dropped: usize,
}

impl ScanCollector {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append one result if there is room.
    ///
    /// Returns `false` when the result was dropped because the buffer is full.
    pub fn push(&mut self, raw: &RawScanResult) -> bool {
        if self.entries.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.entries.push(ScanResult::from_raw(raw));
        true
    }

    /// Number of entries written so far.
    pub fn cursor(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Results that arrived after the buffer was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Copy the collected entries to the front of `out`.
    ///
    /// Returns the number of entries copied.
    pub fn copy_into(self, out: &mut [ScanResult]) -> usize {
        let mut count = 0;
        for (slot, entry) in out.iter_mut().zip(self.entries) {
            *slot = entry;
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ssid: &str, rcpi: u16, caps: Capabilities) -> RawScanResult {
        RawScanResult {
            ssid: ssid.as_bytes().to_vec(),
            bssid: MacAddress::new([2, 0, 0, 0, 0, 1]),
            channel: 6,
            rcpi,
            capabilities: caps,
        }
    }

    // ==================== RSSI Tests ====================

    #[test]
    fn test_rcpi_zero_point() {
        assert_eq!(rcpi_to_dbm(220), 0);
    }

    #[test]
    fn test_rcpi_negative() {
        assert_eq!(rcpi_to_dbm(200), -10);
        assert_eq!(rcpi_to_dbm(0), -110);
    }

    #[test]
    fn test_rcpi_truncates_toward_zero() {
        // (201 - 220) / 2 = -9.5 -> -9
        assert_eq!(rcpi_to_dbm(201), -9);
        assert_eq!(rcpi_to_dbm(223), 1);
    }

    // ==================== Security Classification Tests ====================

    #[test]
    fn test_classify_open() {
        assert_eq!(classify_security(Capabilities::NONE), Security::Open);
    }

    #[test]
    fn test_classify_wep() {
        assert_eq!(classify_security(Capabilities::WEP), Security::Wep);
    }

    #[test]
    fn test_classify_wpa() {
        assert_eq!(
            classify_security(Capabilities::WPA | Capabilities::PSK),
            Security::Wpa
        );
    }

    #[test]
    fn test_classify_wpa2_psk() {
        assert_eq!(
            classify_security(Capabilities::WPA2 | Capabilities::PSK),
            Security::Wpa2
        );
    }

    #[test]
    fn test_classify_wpa2_eap() {
        assert_eq!(
            classify_security(Capabilities::WPA2 | Capabilities::EAP),
            Security::Wpa2Enterprise
        );
    }

    #[test]
    fn test_classify_psk_beats_eap() {
        let caps = Capabilities::WPA2 | Capabilities::PSK | Capabilities::EAP;
        assert_eq!(classify_security(caps), Security::Wpa2);
    }

    #[test]
    fn test_classify_wpa2_overrides_wpa() {
        let caps = Capabilities::WPA | Capabilities::WPA2 | Capabilities::PSK;
        assert_eq!(classify_security(caps), Security::Wpa2);
    }

    #[test]
    fn test_classify_wpa2_without_key_type_keeps_earlier_match() {
        let caps = Capabilities::WPA | Capabilities::WPA2;
        assert_eq!(classify_security(caps), Security::Wpa);
    }

    #[test]
    fn test_classify_unknown_bits() {
        assert_eq!(
            classify_security(Capabilities::PMF),
            Security::NotSupported
        );
    }

    // ==================== ScanResult Tests ====================

    #[test]
    fn test_from_raw() {
        let result = ScanResult::from_raw(&raw("cafe", 180, Capabilities::NONE));
        assert_eq!(result.ssid, b"cafe");
        assert_eq!(result.channel, 6);
        assert!(!result.hidden);
        assert_eq!(result.rssi, -20);
        assert_eq!(result.security, Security::Open);
    }

    #[test]
    fn test_from_raw_truncates_ssid() {
        let long = "x".repeat(40);
        let result = ScanResult::from_raw(&raw(&long, 220, Capabilities::NONE));
        assert_eq!(result.ssid.len(), MAX_SSID_LEN);
    }

    // ==================== Collector Tests ====================

    #[test]
    fn test_collector_respects_capacity() {
        let mut collector = ScanCollector::new(2);
        assert!(collector.push(&raw("a", 200, Capabilities::NONE)));
        assert!(collector.push(&raw("b", 200, Capabilities::NONE)));
        assert!(!collector.push(&raw("c", 200, Capabilities::NONE)));
        assert_eq!(collector.cursor(), 2);
        assert_eq!(collector.dropped(), 1);
    }

    #[test]
    fn test_collector_zero_capacity() {
        let mut collector = ScanCollector::new(0);
        assert!(!collector.push(&raw("a", 200, Capabilities::NONE)));
        assert_eq!(collector.cursor(), 0);
    }

    #[test]
    fn test_copy_into_leaves_tail_untouched() {
        let mut collector = ScanCollector::new(4);
        collector.push(&raw("a", 200, Capabilities::WEP));
        let mut out = vec![ScanResult::default(); 4];
        assert_eq!(collector.copy_into(&mut out), 1);
        assert_eq!(out[0].ssid, b"a");
        assert_eq!(out[1], ScanResult::default());
    }
}
