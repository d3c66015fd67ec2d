//! Engine error taxonomy
//!
//! Five kinds, matching how each is handled: transport failures end the
//! connection attempt, timeouts are retried only by the session-open layer,
//! protocol failures carry the device's numeric code plus its readable
//! mapping, parse failures skip the affected record, and state failures
//! surface immediately without touching the bus.

use common::UsbFault;
use protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Device/interface open or claim failure, or a bulk transfer fault
    #[error("transport error: {0}")]
    Transport(UsbFault),

    /// Bounded wait on a device response exceeded
    #[error("timed out waiting for device response")]
    Timeout,

    /// Non-OK, non-substituted response code from the device
    #[error("device returned {code:#06x} ({name})")]
    Protocol { code: u16, name: &'static str },

    /// Malformed payload shorter than its record layout requires
    #[error("parse error: {0}")]
    Parse(#[from] ProtocolError),

    /// Operation requires a detected, claimed device
    #[error("no device connected")]
    NotConnected,

    /// Operation requires an open MTP session
    #[error("session not open")]
    SessionNotOpen,

    /// Only root-directory listings are supported
    #[error("unsupported path: {0:?} (only \"/\" is supported)")]
    UnsupportedPath(String),

    /// The bridge to the USB worker thread is gone
    #[error("usb worker unavailable: {0}")]
    Channel(String),
}

impl EngineError {
    /// Wrap a protocol-level failure with its readable name
    pub(crate) fn protocol(code: u16) -> Self {
        EngineError::Protocol {
            code,
            name: protocol::response_name(code),
        }
    }
}

impl From<UsbFault> for EngineError {
    fn from(fault: UsbFault) -> Self {
        match fault {
            // A worker-level read timeout and a lost deadline race are the
            // same event to callers
            UsbFault::Timeout => EngineError::Timeout,
            other => EngineError::Transport(other),
        }
    }
}

impl From<common::Error> for EngineError {
    fn from(err: common::Error) -> Self {
        EngineError::Channel(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::codes::rc;

    #[test]
    fn test_protocol_error_carries_name() {
        let err = EngineError::protocol(rc::DEVICE_BUSY);
        let msg = err.to_string();
        assert!(msg.contains("0x2019"));
        assert!(msg.contains("DeviceBusy"));
    }

    #[test]
    fn test_fault_timeout_maps_to_timeout_kind() {
        assert!(matches!(
            EngineError::from(UsbFault::Timeout),
            EngineError::Timeout
        ));
        assert!(matches!(
            EngineError::from(UsbFault::Pipe),
            EngineError::Transport(UsbFault::Pipe)
        ));
    }
}
