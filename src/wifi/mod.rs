//! WiFi connection lifecycle and mode arbitration.
//!
//! The radio executes every command asynchronously and reports back through
//! callbacks on its own thread. This module turns that into a blocking,
//! serialized control API.
//!
//! # Components
//!
//! - [`WifiManager`] - public operations (connect, scan, access point, mode)
//! - [`RadioDriver`] - command interface a radio binding implements
//! - [`RadioEvents`] - callbacks the binding raises; implemented by [`Signals`]
//! - [`EventBus`] - named link flags with a blocking wait
//! - [`sim`] - threaded host simulation of a radio
//!
//! Parameter and timing types live in [`crate::config`].

mod ap_store;
mod callbacks;
mod completion;
mod driver;
mod error;
mod event_bus;
mod guard;
mod manager;
mod mode;
mod scan;
pub mod sim;

pub use ap_store::{ApProfile, ApSettings};
pub use callbacks::{LinkState, RadioEvents, Signals};
pub use completion::{CommandKind, Outcome, PendingCommands, Ticket};
pub use driver::{
    Capabilities, ConnectStatus, DriverError, Interface, MacAddress, RadioDriver, RawScanResult,
    ScanMode, STATUS_SUCCESS,
};
pub use error::{FailureReason, Operation, ReturnCode, WifiError};
pub use event_bus::{EventBus, EventFlags, WaitFor};
pub use guard::{Guard, GuardToken};
pub use manager::{PowerMode, WifiLock, WifiManager};
pub use mode::{plan_transition, DeviceMode, Transition};
pub use scan::{classify_security, rcpi_to_dbm, ScanCollector, ScanResult, RCPI_ZERO_DBM};
