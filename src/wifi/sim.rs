//! Simulated radio for host runs and integration tests.
//!
//! [`SimulatedRadio`] implements [`RadioDriver`] with a background driver
//! thread. Submitted commands are queued to that thread, which waits the
//! configured latency and then raises the matching [`RadioEvents`] callback,
//! so completions arrive on a different thread than the caller, as they do
//! on hardware.
//!
//! A join must name the SSID and channel of a configured network. The
//! security mode offered in the join is not compared with the network's;
//! only the passphrase of a protected network is checked. Access points
//! start on any valid channel whatever SSID and security they advertise.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wfx_wifi::config::{ManagerConfig, NetworkParams, Security};
//! use wfx_wifi::network::LoggingNetworkStack;
//! use wfx_wifi::wifi::sim::{SimulatedAp, SimulatedRadio};
//! use wfx_wifi::wifi::WifiManager;
//!
//! let manager = WifiManager::new(
//!     ManagerConfig::default(),
//!     Arc::new(LoggingNetworkStack),
//!     |events| SimulatedRadio::new(events).with_access_point(SimulatedAp::wpa2("home", "secret123", 6)),
//! )
//! .unwrap();
//!
//! manager.power_on().unwrap();
//! let params = NetworkParams::new("home", "secret123", 6, Security::Wpa2).unwrap();
//! manager.connect(&params).unwrap();
//! assert!(manager.is_connected());
//! ```

use super::callbacks::RadioEvents;
use super::driver::{
    Capabilities, ConnectStatus, DriverError, Interface, MacAddress, RadioDriver, RawScanResult,
    ScanMode, STATUS_SUCCESS,
};
use crate::config::{SecurityMode, MAX_CHANNEL};
use crossbeam::channel::{self, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default delay between submission and completion.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(5);

/// Deauthentication reason reported when the station leaves on request.
pub const REASON_LEAVING: u16 = 3;

/// Status reported for an access point start on an invalid channel.
pub const STATUS_INVALID_CHANNEL: u32 = 1;

/// A network visible to the simulated radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedAp {
    pub ssid: Vec<u8>,
    pub passphrase: Vec<u8>,
    pub bssid: MacAddress,
    pub channel: u8,
    pub rcpi: u16,
    pub capabilities: Capabilities,
}

impl SimulatedAp {
    pub fn open(ssid: &str, channel: u8) -> Self {
        Self {
            ssid: ssid.as_bytes().to_vec(),
            passphrase: Vec::new(),
            bssid: bssid_for(ssid),
            channel,
            rcpi: 160,
            capabilities: Capabilities::NONE,
        }
    }

    pub fn wpa2(ssid: &str, passphrase: &str, channel: u8) -> Self {
        Self {
            passphrase: passphrase.as_bytes().to_vec(),
            capabilities: Capabilities::WPA2 | Capabilities::PSK,
            ..Self::open(ssid, channel)
        }
    }

    pub fn with_rcpi(mut self, rcpi: u16) -> Self {
        self.rcpi = rcpi;
        self
    }

    fn is_open(&self) -> bool {
        self.capabilities.is_empty()
    }

    fn to_raw(&self) -> RawScanResult {
        RawScanResult {
            ssid: self.ssid.clone(),
            bssid: self.bssid,
            channel: u16::from(self.channel),
            rcpi: self.rcpi,
            capabilities: self.capabilities,
        }
    }
}

/// Locally administered address derived from the SSID.
fn bssid_for(ssid: &str) -> MacAddress {
    let mut octets = [0x02, 0x5a, 0, 0, 0, 0];
    for (i, byte) in ssid.bytes().enumerate() {
        octets[2 + i % 4] ^= byte;
    }
    MacAddress::new(octets)
}

enum Command {
    Join {
        ssid: Vec<u8>,
        channel: u8,
        passphrase: Vec<u8>,
    },
    Disconnect,
    Scan { channels: Vec<u8> },
    StartAp { ssid: Vec<u8>, channel: u8 },
    StopAp,
}

struct Worker {
    commands: Sender<Command>,
    handle: thread::JoinHandle<()>,
}

/// Host radio driven by a background thread.
pub struct SimulatedRadio {
    events: Arc<dyn RadioEvents>,
    networks: Arc<Vec<SimulatedAp>>,
    latency: Duration,
    station_mac: MacAddress,
    ap_mac: MacAddress,
    worker: Option<Worker>,
}

impl SimulatedRadio {
    pub fn new(events: Arc<dyn RadioEvents>) -> Self {
        Self {
            events,
            networks: Arc::new(Vec::new()),
            latency: DEFAULT_LATENCY,
            station_mac: MacAddress::new([0x00, 0x0d, 0x6f, 0x00, 0x00, 0x01]),
            ap_mac: MacAddress::new([0x00, 0x0d, 0x6f, 0x00, 0x00, 0x02]),
            worker: None,
        }
    }

    /// Add a visible network. Takes effect at the next [`init`](RadioDriver::init).
    pub fn with_access_point(mut self, ap: SimulatedAp) -> Self {
        Arc::make_mut(&mut self.networks).push(ap);
        self
    }

    /// Delay every completion by `latency` instead of [`DEFAULT_LATENCY`].
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn submit(&self, command: Command) -> Result<(), DriverError> {
        let worker = self.worker.as_ref().ok_or(DriverError::NotStarted)?;
        worker
            .commands
            .send(command)
            .map_err(|_| DriverError::Transport("driver thread stopped".into()))
    }
}

impl RadioDriver for SimulatedRadio {
    fn init(&mut self) -> Result<(), DriverError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (tx, rx) = channel::unbounded();
        let mut state = RadioState {
            events: self.events.clone(),
            networks: self.networks.clone(),
            latency: self.latency,
            station_mac: self.station_mac,
            associated: None,
        };
        let handle = thread::Builder::new()
            .name("sim-radio".into())
            .spawn(move || {
                for command in rx {
                    state.handle(command);
                }
                debug!("Simulated radio thread exiting");
            })
            .map_err(|e| DriverError::Transport(e.to_string()))?;

        self.worker = Some(Worker {
            commands: tx,
            handle,
        });
        debug!("Simulated radio up, {} networks", self.networks.len());
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.worker.is_some()
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        if let Some(worker) = self.worker.take() {
            // Closing the channel ends the thread loop
            drop(worker.commands);
            if worker.handle.join().is_err() {
                return Err(DriverError::Transport("driver thread panicked".into()));
            }
        }
        Ok(())
    }

    fn mac_address(&self, iface: Interface) -> MacAddress {
        match iface {
            Interface::Station => self.station_mac,
            Interface::AccessPoint => self.ap_mac,
        }
    }

    fn issue_join(
        &mut self,
        ssid: &[u8],
        channel: u8,
        _security: SecurityMode,
        passphrase: &[u8],
    ) -> Result<(), DriverError> {
        self.submit(Command::Join {
            ssid: ssid.to_vec(),
            channel,
            passphrase: passphrase.to_vec(),
        })
    }

    fn issue_disconnect(&mut self) -> Result<(), DriverError> {
        self.submit(Command::Disconnect)
    }

    fn issue_scan(&mut self, mode: ScanMode, channels: &[u8]) -> Result<(), DriverError> {
        if mode == ScanMode::Passive {
            debug!("Passive scan simulated as active");
        }
        self.submit(Command::Scan {
            channels: channels.to_vec(),
        })
    }

    fn issue_start_ap(
        &mut self,
        channel: u8,
        ssid: &[u8],
        _security: SecurityMode,
        _passphrase: &[u8],
    ) -> Result<(), DriverError> {
        self.submit(Command::StartAp {
            ssid: ssid.to_vec(),
            channel,
        })
    }

    fn issue_stop_ap(&mut self) -> Result<(), DriverError> {
        self.submit(Command::StopAp)
    }
}

impl Drop for SimulatedRadio {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Simulated radio shutdown: {}", e);
        }
    }
}

/// State owned by the driver thread.
struct RadioState {
    events: Arc<dyn RadioEvents>,
    networks: Arc<Vec<SimulatedAp>>,
    latency: Duration,
    station_mac: MacAddress,
    associated: Option<MacAddress>,
}

impl RadioState {
    fn handle(&mut self, command: Command) {
        thread::sleep(self.latency);
        match command {
            Command::Join {
                ssid,
                channel,
                passphrase,
            } => self.join(&ssid, channel, &passphrase),
            Command::Disconnect => {
                let peer = self.associated.take().unwrap_or(self.station_mac);
                self.events.on_disconnect(peer, REASON_LEAVING);
            }
            Command::Scan { channels } => {
                for ap in self.networks.iter() {
                    if channels.contains(&ap.channel) {
                        self.events.on_scan_result(&ap.to_raw());
                    }
                }
                self.events.on_scan_complete(STATUS_SUCCESS);
            }
            Command::StartAp { ssid, channel } => {
                debug!(
                    "Simulated AP '{}' on channel {}",
                    String::from_utf8_lossy(&ssid),
                    channel
                );
                let status = if (1..=MAX_CHANNEL).contains(&channel) {
                    STATUS_SUCCESS
                } else {
                    STATUS_INVALID_CHANNEL
                };
                self.events.on_ap_start(status);
            }
            Command::StopAp => self.events.on_ap_stop(),
        }
    }

    fn join(&mut self, ssid: &[u8], channel: u8, passphrase: &[u8]) {
        let found = self
            .networks
            .iter()
            .find(|ap| ap.ssid == ssid && ap.channel == channel);
        let Some(ap) = found else {
            self.events
                .on_connect(self.station_mac, ConnectStatus::NoMatchingAp);
            return;
        };

        if !ap.is_open() && ap.passphrase != passphrase {
            self.events.on_connect(ap.bssid, ConnectStatus::AuthFailure);
            return;
        }

        self.associated = Some(ap.bssid);
        self.events.on_connect(ap.bssid, ConnectStatus::Success);
    }
}
