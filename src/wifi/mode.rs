//! Device mode and transition planning.

use super::driver::Interface;
use super::error::WifiError;
use std::fmt;

/// Operating mode of the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceMode {
    /// Before the first power-on.
    Uninitialized,
    Station,
    AccessPoint,
    /// Recognised but never accepted.
    PeerToPeer,
}

impl DeviceMode {
    /// Interface whose hardware address identifies the device in this mode.
    pub fn interface(self) -> Option<Interface> {
        match self {
            Self::Station => Some(Interface::Station),
            Self::AccessPoint => Some(Interface::AccessPoint),
            Self::Uninitialized | Self::PeerToPeer => None,
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Station => "station",
            Self::AccessPoint => "access point",
            Self::PeerToPeer => "peer-to-peer",
        };
        write!(f, "{}", name)
    }
}

/// What has to happen before the mode can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already in the requested mode.
    Stay,
    /// Stop any running access point, then enter station mode.
    StopAccessPoint,
    /// Drop any station association, then enter access-point mode.
    DisconnectStation,
}

/// Decide how to move from `current` to `target`.
pub fn plan_transition(current: DeviceMode, target: DeviceMode) -> Result<Transition, WifiError> {
    if current == target {
        return Ok(Transition::Stay);
    }
    match target {
        DeviceMode::Station => Ok(Transition::StopAccessPoint),
        DeviceMode::AccessPoint => Ok(Transition::DisconnectStation),
        DeviceMode::PeerToPeer | DeviceMode::Uninitialized => {
            Err(WifiError::UnsupportedParameter("device mode"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_mode_is_noop() {
        assert_eq!(
            plan_transition(DeviceMode::Station, DeviceMode::Station),
            Ok(Transition::Stay)
        );
        assert_eq!(
            plan_transition(DeviceMode::AccessPoint, DeviceMode::AccessPoint),
            Ok(Transition::Stay)
        );
    }

    #[test]
    fn test_station_to_ap_disconnects() {
        assert_eq!(
            plan_transition(DeviceMode::Station, DeviceMode::AccessPoint),
            Ok(Transition::DisconnectStation)
        );
    }

    #[test]
    fn test_ap_to_station_stops_ap() {
        assert_eq!(
            plan_transition(DeviceMode::AccessPoint, DeviceMode::Station),
            Ok(Transition::StopAccessPoint)
        );
        assert_eq!(
            plan_transition(DeviceMode::Uninitialized, DeviceMode::Station),
            Ok(Transition::StopAccessPoint)
        );
    }

    #[test]
    fn test_peer_to_peer_rejected() {
        assert!(matches!(
            plan_transition(DeviceMode::Station, DeviceMode::PeerToPeer),
            Err(WifiError::UnsupportedParameter(_))
        ));
        assert!(matches!(
            plan_transition(DeviceMode::Station, DeviceMode::Uninitialized),
            Err(WifiError::UnsupportedParameter(_))
        ));
    }

    #[test]
    fn test_interfaces() {
        assert_eq!(DeviceMode::Station.interface(), Some(Interface::Station));
        assert_eq!(
            DeviceMode::AccessPoint.interface(),
            Some(Interface::AccessPoint)
        );
        assert_eq!(DeviceMode::Uninitialized.interface(), None);
    }
}
