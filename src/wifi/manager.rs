//! WiFi connection manager.
//!
//! [`WifiManager`] is the synchronous control API over an asynchronous
//! radio. Each public operation takes the control guard, submits commands
//! through the [`RadioDriver`], and blocks on the completion token of each
//! command until the radio reports back or the configured bound elapses.
//!
//! Public operations are thin wrappers: they acquire the guard, lock the
//! core state and hand off to a session, whose methods call each other
//! freely without touching the guard again.

use super::ap_store::ApSettings;
use super::callbacks::{RadioEvents, Signals};
use super::completion::{CommandKind, Outcome};
use super::driver::{ConnectStatus, DriverError, Interface, MacAddress, RadioDriver, ScanMode};
use super::error::{FailureReason, Operation, WifiError};
use super::event_bus::{EventFlags, WaitFor};
use super::guard::{Guard, GuardToken};
use super::mode::{plan_transition, DeviceMode, Transition};
use super::scan::ScanResult;
use crate::config::{ConfigError, ManagerConfig, NetworkParams};
use crate::network::{address_decision, AddressDecision, AddressPhase, NetworkStack};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

/// Radio power-save policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Normal,
    LowPower,
    AlwaysOn,
}

/// Application-held control lock.
///
/// While alive, no other thread can run a control operation. The holding
/// thread may keep calling the manager.
#[must_use = "dropping the lock releases it immediately"]
pub struct WifiLock<'a> {
    _token: GuardToken<'a>,
}

impl WifiLock<'_> {
    pub fn release(self) {}
}

struct Core<D> {
    driver: D,
    mode: DeviceMode,
    ap: ApSettings,
}

/// WiFi connection manager.
pub struct WifiManager<D: RadioDriver> {
    config: ManagerConfig,
    guard: Guard,
    core: Mutex<Core<D>>,
    signals: Arc<Signals>,
}

impl<D: RadioDriver> WifiManager<D> {
    /// Create a manager around the driver built by `make_driver`.
    ///
    /// The factory receives the callback sink the driver must report
    /// completions to.
    pub fn new<F>(
        config: ManagerConfig,
        network: Arc<dyn NetworkStack>,
        make_driver: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce(Arc<dyn RadioEvents>) -> D,
    {
        config.validate()?;

        let signals = Arc::new(Signals::new(network));
        let events: Arc<dyn RadioEvents> = signals.clone();
        let driver = make_driver(events);

        Ok(Self {
            guard: Guard::new(config.lock_wait()),
            config,
            core: Mutex::new(Core {
                driver,
                mode: DeviceMode::Uninitialized,
                ap: ApSettings::new(),
            }),
            signals,
        })
    }

    /// Configuration the manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Run `f` on a session while holding the guard.
    fn session<T>(
        &self,
        f: impl FnOnce(&mut Session<'_, D>) -> Result<T, WifiError>,
    ) -> Result<T, WifiError> {
        let _token = self.guard.acquire()?;
        let mut core = self.core.lock();
        let mut session = Session {
            core: &mut *core,
            signals: &self.signals,
            config: &self.config,
        };
        f(&mut session)
    }

    // ==================== Power ====================

    /// Bring the radio up.
    ///
    /// Creates the control guard on first success. Calling it again while
    /// the radio is running is a no-op.
    pub fn power_on(&self) -> Result<(), WifiError> {
        let _token = if self.guard.exists() {
            Some(self.guard.acquire()?)
        } else {
            None
        };
        let mut core = self.core.lock();

        let already_started = core.driver.is_started();
        if !already_started {
            core.driver.init().map_err(|e| {
                warn!("Radio init failed: {}", e);
                WifiError::Failure(FailureReason::Driver(e))
            })?;
        }
        if self.guard.create() {
            debug!("Control lock created");
        }
        if core.mode == DeviceMode::Uninitialized {
            core.mode = DeviceMode::Station;
        }
        if already_started {
            debug!("Radio already powered on");
            return Ok(());
        }

        let mac = core.driver.mac_address(Interface::Station);
        info!("Radio powered on (MAC {})", mac);
        Ok(())
    }

    /// Shut the radio down.
    ///
    /// The shutdown is carried out, but the call always reports
    /// [`WifiError::NotSupported`].
    pub fn power_off(&self) -> Result<(), WifiError> {
        let token = self.guard.acquire();
        if let Err(e) = &token {
            warn!("Powering off without control lock: {}", e);
        }

        {
            let mut core = self.core.lock();
            if let Err(e) = core.driver.shutdown() {
                warn!("Radio shutdown failed: {}", e);
            }
        }
        self.signals.reset_link();
        info!("Radio powered off");

        drop(token);
        Err(WifiError::NotSupported("power off"))
    }

    /// Take the control lock for the calling thread.
    pub fn lock(&self) -> Result<WifiLock<'_>, WifiError> {
        self.guard.acquire().map(|token| WifiLock { _token: token })
    }

    // ==================== Station ====================

    /// Join a network, waiting for the radio to report the result.
    pub fn connect(&self, params: &NetworkParams) -> Result<(), WifiError> {
        self.session(|s| s.connect(params))
    }

    /// Leave the current network. A no-op when no station link is up.
    pub fn disconnect(&self) -> Result<(), WifiError> {
        self.session(|s| s.disconnect())
    }

    // ==================== Mode ====================

    /// Switch between station and access-point mode, tearing down the active link first.
    pub fn set_mode(&self, mode: DeviceMode) -> Result<(), WifiError> {
        self.session(|s| s.set_mode(mode))
    }

    /// Current device mode.
    pub fn mode(&self) -> Result<DeviceMode, WifiError> {
        self.session(|s| Ok(s.core.mode))
    }

    // ==================== Access Point ====================

    /// Store the access-point parameters used by [`start_ap`](Self::start_ap).
    pub fn configure_ap(&self, params: &NetworkParams) -> Result<(), WifiError> {
        self.session(|s| s.configure_ap(params))
    }

    /// Start the configured access point, restarting it if already running.
    pub fn start_ap(&self) -> Result<(), WifiError> {
        self.session(|s| s.start_ap())
    }

    /// Stop the access point. A no-op when none is running.
    pub fn stop_ap(&self) -> Result<(), WifiError> {
        self.session(|s| s.stop_ap())
    }

    // ==================== Scan ====================

    /// Scan the configured channels into `out`.
    ///
    /// `out` is reset to default entries first. Returns the number of
    /// entries written; results beyond `out.len()` are dropped.
    pub fn scan(&self, out: &mut [ScanResult]) -> Result<usize, WifiError> {
        self.session(|s| s.scan(out))
    }

    // ==================== Status ====================

    /// True while a station link or an access point is up.
    ///
    /// Reports `false` if the control lock cannot be taken.
    pub fn is_connected(&self) -> bool {
        match self.guard.acquire() {
            Ok(_token) => self
                .signals
                .bus()
                .get()
                .intersects(EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STARTED),
            Err(e) => {
                debug!("Link query failed: {}", e);
                false
            }
        }
    }

    /// Hardware address of the interface of the current mode.
    pub fn mac_address(&self) -> Result<MacAddress, WifiError> {
        self.session(|s| {
            let iface = s
                .core
                .mode
                .interface()
                .ok_or(WifiError::Failure(FailureReason::NoInterface))?;
            Ok(s.core.driver.mac_address(iface))
        })
    }

    /// Block until a link is up or `timeout` elapses, without the guard.
    pub fn wait_for_link(&self, timeout: Duration) -> bool {
        self.signals
            .bus()
            .wait(
                EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STARTED,
                WaitFor::Any,
                false,
                timeout,
            )
            .intersects(EventFlags::CONNECT_SUCCEEDED | EventFlags::AP_STARTED)
    }

    /// Answer the network stack's addressing question for `ip`.
    pub fn address_assignment(&self, phase: AddressPhase, ip: Ipv4Addr) -> AddressDecision {
        let mode = self.mode().unwrap_or_else(|e| {
            debug!("Mode unavailable ({}), assuming station", e);
            DeviceMode::Station
        });
        address_decision(mode, phase, ip)
    }

    /// Station link flag as last reported by the radio.
    pub fn station_connected(&self) -> bool {
        self.signals.link().station_connected()
    }

    /// Access-point flag as last reported by the radio.
    pub fn access_point_up(&self) -> bool {
        self.signals.link().ap_up()
    }

    // ==================== Not Supported ====================

    pub fn reset(&self) -> Result<(), WifiError> {
        Err(WifiError::NotSupported("reset"))
    }

    pub fn network_add(&self, _params: &NetworkParams) -> Result<u16, WifiError> {
        Err(WifiError::NotSupported("network profile storage"))
    }

    pub fn network_get(&self, _index: u16) -> Result<NetworkParams, WifiError> {
        Err(WifiError::NotSupported("network profile storage"))
    }

    pub fn network_delete(&self, _index: u16) -> Result<(), WifiError> {
        Err(WifiError::NotSupported("network profile storage"))
    }

    pub fn ping(&self, _ip: Ipv4Addr, _count: u16, _interval: Duration) -> Result<(), WifiError> {
        Err(WifiError::NotSupported("ping"))
    }

    pub fn get_ip(&self) -> Result<Ipv4Addr, WifiError> {
        Err(WifiError::NotSupported("IP query"))
    }

    pub fn get_host_ip(&self, _host: &str) -> Result<Ipv4Addr, WifiError> {
        Err(WifiError::NotSupported("host name resolution"))
    }

    pub fn set_pm_mode(&self, _mode: PowerMode, _interval: u32) -> Result<(), WifiError> {
        Err(WifiError::NotSupported("power-mode control"))
    }

    pub fn get_pm_mode(&self) -> Result<(PowerMode, u32), WifiError> {
        Err(WifiError::NotSupported("power-mode control"))
    }
}

/// Core state borrowed for the duration of one guarded operation.
struct Session<'a, D> {
    core: &'a mut Core<D>,
    signals: &'a Signals,
    config: &'a ManagerConfig,
}

impl<D: RadioDriver> Session<'_, D> {
    /// Submit one command and wait for its completion token.
    ///
    /// `edge` is the bus flag the completion raises. It is cleared before
    /// the command is issued and again once the completion was consumed.
    fn issue_and_wait(
        &mut self,
        kind: CommandKind,
        edge: EventFlags,
        op: Operation,
        timeout: Duration,
        issue: impl FnOnce(&mut D) -> Result<(), DriverError>,
    ) -> Result<Outcome, WifiError> {
        self.signals.bus().clear(edge);
        let ticket = self.signals.pending.arm(kind);

        if let Err(e) = issue(&mut self.core.driver) {
            self.signals.pending.disarm(kind);
            warn!("{} command not submitted: {}", op, e);
            return Err(WifiError::CommandSubmission(e));
        }
        debug!("{} command submitted, waiting up to {:?}", op, timeout);

        match ticket.wait(&self.signals.pending, timeout) {
            Some(outcome) => {
                self.signals.bus().clear(edge);
                Ok(outcome)
            }
            None => {
                warn!("{} timed out after {:?}", op, timeout);
                Err(WifiError::OperationTimeout(op))
            }
        }
    }

    fn set_mode(&mut self, target: DeviceMode) -> Result<(), WifiError> {
        let current = self.core.mode;
        match plan_transition(current, target)? {
            Transition::Stay => return Ok(()),
            Transition::StopAccessPoint => self.stop_ap()?,
            Transition::DisconnectStation => self.disconnect()?,
        }
        info!("Device mode {} -> {}", current, target);
        self.core.mode = target;
        Ok(())
    }

    fn connect(&mut self, params: &NetworkParams) -> Result<(), WifiError> {
        let security = params
            .security()
            .to_mode()
            .ok_or(WifiError::UnsupportedParameter("security mode"))?;

        self.set_mode(DeviceMode::Station)?;
        self.disconnect()?;

        if self.signals.bus().get().contains(EventFlags::CONNECT_SUCCEEDED) {
            warn!("Stale connect flag with no station link, clearing");
            self.signals.bus().clear(EventFlags::CONNECT_SUCCEEDED);
        }

        info!(
            "Connecting to '{}' on channel {} ({})",
            params.ssid_lossy(),
            params.channel(),
            params.security()
        );
        let timeout = self.config.connect_timeout();
        let outcome = self.issue_and_wait(
            CommandKind::Join,
            EventFlags::CONNECT_FAILED,
            Operation::Connect,
            timeout,
            |driver| {
                driver.issue_join(
                    params.ssid(),
                    params.channel(),
                    security,
                    params.passphrase(),
                )
            },
        )?;

        match outcome {
            Outcome::Success => Ok(()),
            Outcome::Failed(code) => Err(WifiError::Failure(FailureReason::ConnectRejected(
                ConnectStatus::from_code(code),
            ))),
        }
    }

    fn disconnect(&mut self) -> Result<(), WifiError> {
        if !self.signals.link().station_connected() {
            debug!("Not connected, nothing to disconnect");
            return Ok(());
        }

        info!("Disconnecting station");
        let timeout = self.config.disconnect_timeout();
        self.issue_and_wait(
            CommandKind::Disconnect,
            EventFlags::DISCONNECTED,
            Operation::Disconnect,
            timeout,
            |driver| driver.issue_disconnect(),
        )?;
        Ok(())
    }

    fn configure_ap(&mut self, params: &NetworkParams) -> Result<(), WifiError> {
        self.core.ap.configure(params)?;
        info!(
            "AP configured: '{}' on channel {} ({})",
            params.ssid_lossy(),
            params.channel(),
            params.security()
        );
        Ok(())
    }

    fn start_ap(&mut self) -> Result<(), WifiError> {
        let profile = self
            .core
            .ap
            .profile()
            .cloned()
            .ok_or(WifiError::Failure(FailureReason::NotConfigured))?;

        self.set_mode(DeviceMode::AccessPoint)?;
        self.stop_ap()?;

        info!(
            "Starting AP '{}' on channel {}",
            String::from_utf8_lossy(&profile.ssid),
            profile.channel
        );
        let timeout = self.config.ap_start_timeout();
        let outcome = self.issue_and_wait(
            CommandKind::StartAp,
            EventFlags::AP_START_FAILED,
            Operation::StartAp,
            timeout,
            |driver| {
                driver.issue_start_ap(
                    profile.channel,
                    &profile.ssid,
                    profile.security,
                    &profile.passphrase,
                )
            },
        )?;

        match outcome {
            Outcome::Success => Ok(()),
            Outcome::Failed(code) => Err(WifiError::Failure(FailureReason::ApStartRejected(code))),
        }
    }

    fn stop_ap(&mut self) -> Result<(), WifiError> {
        if !self.signals.link().ap_up() {
            debug!("AP not running, nothing to stop");
            return Ok(());
        }

        info!("Stopping AP");
        let timeout = self.config.ap_stop_timeout();
        self.issue_and_wait(
            CommandKind::StopAp,
            EventFlags::AP_STOPPED,
            Operation::StopAp,
            timeout,
            |driver| driver.issue_stop_ap(),
        )?;
        Ok(())
    }

    fn scan(&mut self, out: &mut [ScanResult]) -> Result<usize, WifiError> {
        for slot in out.iter_mut() {
            *slot = ScanResult::default();
        }

        let config = self.config;
        self.signals.begin_scan(out.len());
        let result = self.issue_and_wait(
            CommandKind::Scan,
            EventFlags::SCAN_COMPLETE,
            Operation::Scan,
            config.scan_timeout(),
            |driver| driver.issue_scan(ScanMode::Active, &config.scan_channels),
        );

        let count = match self.signals.end_scan() {
            Some(collector) => {
                if collector.dropped() > 0 {
                    debug!(
                        "Scan buffer of {} full, {} results dropped",
                        collector.capacity(),
                        collector.dropped()
                    );
                }
                collector.copy_into(out)
            }
            None => 0,
        };

        if let Outcome::Failed(status) = result? {
            warn!("Scan completed with status {}", status);
        }
        info!("Scan found {} networks", count);
        Ok(count)
    }
}
