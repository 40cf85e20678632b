//! Callback translation layer.
//!
//! The radio driver reports completions through [`RadioEvents`], on its own
//! thread and at any time relative to the manager. [`Signals`] is the
//! implementation the manager hands to the driver: each entry point updates
//! the link state, the event bus and the scan collector, resolves the
//! matching completion token, and notifies the network stack of link loss.
//!
//! None of these entry points take the control guard or block. A manager
//! call may be waiting for them while holding the guard.

use super::completion::{CommandKind, Outcome, PendingCommands};
use super::driver::{ConnectStatus, Interface, MacAddress, RawScanResult, STATUS_SUCCESS};
use super::event_bus::{EventBus, EventFlags};
use super::scan::ScanCollector;
use crate::network::NetworkStack;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Completion callbacks raised by a radio driver.
pub trait RadioEvents: Send + Sync {
    /// A join attempt finished.
    fn on_connect(&self, mac: MacAddress, status: ConnectStatus);

    /// The station association ended, requested or not.
    fn on_disconnect(&self, mac: MacAddress, reason: u16);

    /// One network was found by the running scan.
    fn on_scan_result(&self, result: &RawScanResult);

    fn on_scan_complete(&self, status: u32);

    fn on_ap_start(&self, status: u32);

    fn on_ap_stop(&self);
}

/// Link flags maintained by the callbacks.
///
/// Reads are eventually consistent with in-flight operations.
#[derive(Debug, Default)]
pub struct LinkState {
    station_connected: AtomicBool,
    ap_up: AtomicBool,
}

impl LinkState {
    pub fn station_connected(&self) -> bool {
        self.station_connected.load(Ordering::Acquire)
    }

    pub fn ap_up(&self) -> bool {
        self.ap_up.load(Ordering::Acquire)
    }

    fn set_station_connected(&self, connected: bool) {
        self.station_connected.store(connected, Ordering::Release);
    }

    fn set_ap_up(&self, up: bool) {
        self.ap_up.store(up, Ordering::Release);
    }
}

/// State shared between the manager and the driver's callback context.
pub struct Signals {
    pub(crate) bus: EventBus,
    pub(crate) link: LinkState,
    pub(crate) pending: PendingCommands,
    collector: Mutex<Option<ScanCollector>>,
    network: Arc<dyn NetworkStack>,
}

impl Signals {
    pub fn new(network: Arc<dyn NetworkStack>) -> Self {
        Self {
            bus: EventBus::new(),
            link: LinkState::default(),
            pending: PendingCommands::new(),
            collector: Mutex::new(None),
            network,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn link(&self) -> &LinkState {
        &self.link
    }

    /// Open a fresh collector with room for `capacity` results.
    pub(crate) fn begin_scan(&self, capacity: usize) {
        *self.collector.lock() = Some(ScanCollector::new(capacity));
    }

    /// Close the running collector. Results arriving afterwards are dropped.
    pub(crate) fn end_scan(&self) -> Option<ScanCollector> {
        self.collector.lock().take()
    }

    /// Forget every link after the radio was shut down.
    pub(crate) fn reset_link(&self) {
        self.link.set_station_connected(false);
        self.link.set_ap_up(false);
        self.bus
            .clear(EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STARTED);
    }
}

impl RadioEvents for Signals {
    fn on_connect(&self, mac: MacAddress, status: ConnectStatus) {
        if status.is_success() {
            info!("Connection succeeded ({})", mac);
            self.link.set_station_connected(true);
            self.bus.set(EventFlags::CONNECT_SUCCEEDED);
            self.pending.resolve(CommandKind::Join, Outcome::Success);
        } else {
            warn!("Connection failed: {}", status);
            self.link.set_station_connected(false);
            self.bus.set(EventFlags::CONNECT_FAILED);
            self.pending
                .resolve(CommandKind::Join, Outcome::Failed(status.code()));
        }
    }

    fn on_disconnect(&self, mac: MacAddress, reason: u16) {
        info!("Disconnected from {} (reason {})", mac, reason);
        self.link.set_station_connected(false);
        self.bus.clear(EventFlags::CONNECT_SUCCEEDED);
        self.bus.set(EventFlags::DISCONNECTED);
        self.network.link_down(Interface::Station);
        self.pending.resolve(CommandKind::Disconnect, Outcome::Success);
    }

    fn on_scan_result(&self, result: &RawScanResult) {
        let mut collector = self.collector.lock();
        match collector.as_mut() {
            Some(collector) => {
                if !collector.push(result) {
                    debug!(
                        "Scan buffer full ({}), dropping {}",
                        collector.capacity(),
                        result.bssid
                    );
                }
            }
            None => debug!("Scan result outside a scan, dropping {}", result.bssid),
        }
    }

    fn on_scan_complete(&self, status: u32) {
        debug!("Scan complete (status {})", status);
        self.bus.set(EventFlags::SCAN_COMPLETE);
        let outcome = if status == STATUS_SUCCESS {
            Outcome::Success
        } else {
            Outcome::Failed(status)
        };
        self.pending.resolve(CommandKind::Scan, outcome);
    }

    fn on_ap_start(&self, status: u32) {
        if status == STATUS_SUCCESS {
            info!("AP started");
            self.link.set_ap_up(true);
            self.bus.set(EventFlags::AP_STARTED);
            self.pending.resolve(CommandKind::StartAp, Outcome::Success);
        } else {
            warn!("AP start failed (status {})", status);
            self.link.set_ap_up(false);
            self.bus.set(EventFlags::AP_START_FAILED);
            self.pending
                .resolve(CommandKind::StartAp, Outcome::Failed(status));
        }
    }

    fn on_ap_stop(&self) {
        info!("SoftAP stopped");
        self.link.set_ap_up(false);
        self.bus.clear(EventFlags::AP_STARTED);
        self.bus.set(EventFlags::AP_STOPPED);
        self.network.link_down(Interface::AccessPoint);
        self.pending.resolve(CommandKind::StopAp, Outcome::Success);
    }
}
