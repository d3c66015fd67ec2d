//! Async channel bridge between the tokio runtime and the USB thread
//!
//! Bulk USB I/O through rusb is blocking, so the engine runs it on a
//! dedicated worker thread and talks to it over this bridge: each command
//! carries a oneshot sender for its reply. The async side may race the
//! oneshot against a deadline; when the deadline wins the receiver is
//! dropped and a late worker reply is silently discarded, which is the
//! required behavior for bulk transfers that cannot be cancelled mid-flight.

use async_channel::{Receiver, Sender, bounded};
use protocol::DeviceSummary;
use std::time::Duration;
use tracing::debug;

use crate::error::UsbFault;

/// Commands from the tokio runtime to the USB thread
#[derive(Debug)]
pub enum UsbCommand {
    /// Scan the bus, claim the first MTP-capable device, keep it claimed
    Detect {
        /// Optional `"vid:pid"` hex filters; empty means every device
        filters: Vec<String>,
        /// Channel to send the claimed device summary back
        response: tokio::sync::oneshot::Sender<Result<DeviceSummary, UsbFault>>,
    },

    /// Write one buffer to the claimed bulk OUT endpoint
    BulkWrite {
        /// Complete container bytes to send
        data: Vec<u8>,
        /// Bound on the blocking write
        timeout: Duration,
        /// Channel to send the written byte count back
        response: tokio::sync::oneshot::Sender<Result<usize, UsbFault>>,
    },

    /// Read one buffer from the claimed bulk IN endpoint
    BulkRead {
        /// Fixed receive buffer capacity
        capacity: usize,
        /// Bound on the blocking read
        timeout: Duration,
        /// Channel to send the received bytes back
        response: tokio::sync::oneshot::Sender<Result<Vec<u8>, UsbFault>>,
    },

    /// Release the claimed interface and close the device, if any
    Release {
        /// Always acknowledged, even when nothing was claimed
        response: tokio::sync::oneshot::Sender<()>,
    },

    /// Stop the USB thread
    Shutdown,
}

/// Handle for the tokio runtime (async side)
#[derive(Clone)]
pub struct UsbBridge {
    cmd_tx: Sender<UsbCommand>,
}

impl UsbBridge {
    /// Send a raw command to the USB thread
    pub async fn send_command(&self, cmd: UsbCommand) -> crate::Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Best-effort, non-blocking send; used from drop paths
    pub fn try_send_command(&self, cmd: UsbCommand) {
        if let Err(e) = self.cmd_tx.try_send(cmd) {
            debug!("command dropped, worker unavailable: {}", e);
        }
    }

    /// Scan and claim a device, waiting for the worker's verdict
    pub async fn detect(&self, filters: Vec<String>) -> crate::Result<Result<DeviceSummary, UsbFault>> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send_command(UsbCommand::Detect {
            filters,
            response: tx,
        })
        .await?;
        rx.await.map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Write to the bulk OUT endpoint
    pub async fn bulk_write(
        &self,
        data: Vec<u8>,
        timeout: Duration,
    ) -> crate::Result<Result<usize, UsbFault>> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send_command(UsbCommand::BulkWrite {
            data,
            timeout,
            response: tx,
        })
        .await?;
        rx.await.map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Read from the bulk IN endpoint
    pub async fn bulk_read(
        &self,
        capacity: usize,
        timeout: Duration,
    ) -> crate::Result<Result<Vec<u8>, UsbFault>> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send_command(UsbCommand::BulkRead {
            capacity,
            timeout,
            response: tx,
        })
        .await?;
        rx.await.map_err(|e| crate::Error::Channel(e.to_string()))
    }

    /// Release any claimed device, waiting for the acknowledgement
    pub async fn release(&self) -> crate::Result<()> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.send_command(UsbCommand::Release { response: tx }).await?;
        rx.await.map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Handle for the USB thread (blocking side)
pub struct UsbWorker {
    cmd_rx: Receiver<UsbCommand>,
}

impl UsbWorker {
    /// Receive a command from the tokio runtime (blocking)
    ///
    /// Errors only when every bridge handle has been dropped, which the
    /// worker treats as shutdown.
    pub fn recv_command(&self) -> crate::Result<UsbCommand> {
        self.cmd_rx
            .recv_blocking()
            .map_err(|e| crate::Error::Channel(e.to_string()))
    }
}

/// Create the channel bridge between tokio and the USB thread
///
/// Returns (UsbBridge for tokio, UsbWorker for the USB thread)
pub fn create_usb_bridge() -> (UsbBridge, UsbWorker) {
    let (cmd_tx, cmd_rx) = bounded(32);

    (UsbBridge { cmd_tx }, UsbWorker { cmd_rx })
}
