//! Common error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// USB transfer fault kinds crossing the worker/engine channel
///
/// The engine maps `rusb::Error` into this at the transport boundary so
/// that nothing above the worker depends on rusb types. `Timeout` is kept
/// distinct from every other kind: the session layer retries it, everything
/// else surfaces as a transport failure.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsbFault {
    /// Bulk transfer exceeded its bound
    #[error("transfer timed out")]
    Timeout,

    /// No device is currently claimed, or the claimed device went away
    #[error("no device")]
    NoDevice,

    /// Discovery exhausted every candidate without a bulk endpoint match
    #[error("no matching device found")]
    NotFound,

    /// Open or claim refused by the host
    #[error("access denied")]
    Access,

    /// Endpoint stalled
    #[error("endpoint stalled")]
    Pipe,

    /// Any other host-side USB error
    #[error("usb error: {0}")]
    Other(String),
}
