//! Error taxonomy of the control API.
//!
//! Every public operation reports its outcome synchronously through
//! [`WifiError`]. Nothing is retried at this layer; retry policy belongs to
//! the caller.

use super::driver::{ConnectStatus, DriverError};
use std::fmt;

/// Operation whose completion wait elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Disconnect,
    Scan,
    StartAp,
    StopAp,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Scan => "scan",
            Self::StartAp => "start AP",
            Self::StopAp => "stop AP",
        };
        write!(f, "{}", name)
    }
}

/// Why an operation completed without doing what was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The radio reported the join as failed.
    ConnectRejected(ConnectStatus),
    /// The radio reported the access point start as failed.
    ApStartRejected(u32),
    /// StartAP was requested before ConfigureAP succeeded.
    NotConfigured,
    /// The current device mode has no hardware address.
    NoInterface,
    /// Radio bring-up failed.
    Driver(DriverError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectRejected(status) => write!(f, "connect rejected: {}", status),
            Self::ApStartRejected(code) => write!(f, "AP start rejected (status {})", code),
            Self::NotConfigured => write!(f, "access point not configured"),
            Self::NoInterface => write!(f, "no active interface"),
            Self::Driver(e) => write!(f, "driver: {}", e),
        }
    }
}

/// Errors returned by [`WifiManager`](super::WifiManager) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiError {
    /// The control lock does not exist yet (radio never powered on).
    LockUnavailable,
    /// The control lock could not be taken within the configured bound.
    LockTimeout,
    /// A parameter has no meaning for this radio.
    UnsupportedParameter(&'static str),
    /// The radio driver refused the command.
    CommandSubmission(DriverError),
    /// The expected completion did not arrive in time.
    OperationTimeout(Operation),
    /// The operation completed unsuccessfully.
    Failure(FailureReason),
    /// The operation is intentionally not implemented.
    NotSupported(&'static str),
}

impl WifiError {
    /// Collapse onto the flat result code of the C-style API.
    pub fn code(&self) -> ReturnCode {
        match self {
            Self::LockTimeout | Self::OperationTimeout(_) => ReturnCode::Timeout,
            Self::NotSupported(_) => ReturnCode::NotSupported,
            Self::LockUnavailable
            | Self::UnsupportedParameter(_)
            | Self::CommandSubmission(_)
            | Self::Failure(_) => ReturnCode::Failure,
        }
    }
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockUnavailable => write!(f, "control lock unavailable (radio not powered on)"),
            Self::LockTimeout => write!(f, "timed out waiting for control lock"),
            Self::UnsupportedParameter(what) => write!(f, "unsupported parameter: {}", what),
            Self::CommandSubmission(e) => write!(f, "command submission failed: {}", e),
            Self::OperationTimeout(op) => write!(f, "{} timed out", op),
            Self::Failure(reason) => write!(f, "operation failed: {}", reason),
            Self::NotSupported(what) => write!(f, "{} not supported", what),
        }
    }
}

impl std::error::Error for WifiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CommandSubmission(e) => Some(e),
            Self::Failure(FailureReason::Driver(e)) => Some(e),
            _ => None,
        }
    }
}

/// Flat result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    Failure,
    Timeout,
    NotSupported,
}

impl ReturnCode {
    pub fn from_result<T>(result: &Result<T, WifiError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.code(),
        }
    }
}
