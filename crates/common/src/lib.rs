//! Common utilities for switch-mtp
//!
//! This crate provides the plumbing shared between the async engine and the
//! blocking USB worker thread: logging setup, the shared error and USB
//! fault types, and the channel bridge carrying transfer commands across
//! the sync/async boundary.

pub mod channel;
pub mod error;
pub mod logging;

pub use channel::{UsbBridge, UsbCommand, UsbWorker, create_usb_bridge};
pub use error::{Error, Result, UsbFault};
pub use logging::{DEFAULT_DIRECTIVE, setup_logging};
