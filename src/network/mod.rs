//! Network-stack collaborator.
//!
//! The controller does not own IP state. It tells the network stack when a
//! link goes down so the stack can tear down its interface state, and it
//! answers the stack's address-assignment question: an access point uses
//! its default static address, a station asks DHCP.
//!
//! # Example
//!
//! ```
//! use std::net::Ipv4Addr;
//! use wfx_wifi::network::{address_decision, AddressDecision, AddressPhase};
//! use wfx_wifi::wifi::DeviceMode;
//!
//! let ip = Ipv4Addr::new(192, 168, 4, 1);
//! assert_eq!(
//!     address_decision(DeviceMode::AccessPoint, AddressPhase::PreDiscover, ip),
//!     AddressDecision::UseDefaults
//! );
//! ```

use crate::wifi::{DeviceMode, Interface};
use log::info;
use std::net::Ipv4Addr;

/// Receiver of link-down notifications.
///
/// Called from the radio callback context: implementations must not block
/// and must not call back into the manager.
pub trait NetworkStack: Send + Sync {
    fn link_down(&self, iface: Interface);
}

/// Network stack that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNetworkStack;

impl NetworkStack for LoggingNetworkStack {
    fn link_down(&self, iface: Interface) {
        info!("Network down on {:?} interface", iface);
    }
}

/// Step of the address-assignment exchange being decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressPhase {
    /// Before a discover is sent.
    PreDiscover,
    /// An offer arrived; a request is about to be sent.
    PreRequest,
}

/// Answer to the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressDecision {
    /// Proceed with DHCP.
    Continue,
    /// Skip DHCP and use the statically configured address.
    UseDefaults,
}

/// Choose between static and DHCP addressing for the given mode.
pub fn address_decision(mode: DeviceMode, phase: AddressPhase, ip: Ipv4Addr) -> AddressDecision {
    if mode == DeviceMode::AccessPoint {
        info!("DHCP client not used in access-point mode");
        info!("Using default IP address {}", ip);
        return AddressDecision::UseDefaults;
    }

    if phase == AddressPhase::PreRequest {
        info!("DHCP assigned IP address {}", ip);
    }
    AddressDecision::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 7);

    #[test]
    fn test_access_point_uses_defaults() {
        for phase in [AddressPhase::PreDiscover, AddressPhase::PreRequest] {
            assert_eq!(
                address_decision(DeviceMode::AccessPoint, phase, IP),
                AddressDecision::UseDefaults
            );
        }
    }

    #[test]
    fn test_station_continues() {
        assert_eq!(
            address_decision(DeviceMode::Station, AddressPhase::PreDiscover, IP),
            AddressDecision::Continue
        );
        assert_eq!(
            address_decision(DeviceMode::Station, AddressPhase::PreRequest, IP),
            AddressDecision::Continue
        );
    }

    #[test]
    fn test_uninitialized_continues() {
        assert_eq!(
            address_decision(DeviceMode::Uninitialized, AddressPhase::PreRequest, IP),
            AddressDecision::Continue
        );
    }
}
