//! USB worker thread
//!
//! Dedicated thread owning all rusb state. Blocking bulk transfers run
//! here, never on the tokio runtime; the async side talks to this loop
//! through the channel bridge and races each reply against its deadline.
//! Replies whose receivers have been dropped (a lost deadline race) are
//! discarded by the oneshot send failing, which is exactly the tolerance a
//! non-cancelable bulk transfer needs.

use crate::transport::{self, MtpTransport};
use common::{UsbCommand, UsbFault, UsbWorker};
use tracing::{debug, info, warn};

/// USB worker thread state
///
/// Holds at most one claimed transport. `Detect` replaces it, `Release`
/// drops it, and dropping it releases the claimed interface, so no exit
/// path leaves a dangling claim.
pub struct UsbWorkerThread {
    transport: Option<MtpTransport>,
    worker: UsbWorker,
}

impl UsbWorkerThread {
    pub fn new(worker: UsbWorker) -> Self {
        Self {
            transport: None,
            worker,
        }
    }

    /// Run the worker loop until shutdown or bridge teardown
    pub fn run(mut self) {
        info!("USB worker thread started");

        loop {
            let cmd = match self.worker.recv_command() {
                Ok(cmd) => cmd,
                Err(_) => {
                    debug!("bridge closed, USB worker exiting");
                    break;
                }
            };

            if matches!(cmd, UsbCommand::Shutdown) {
                info!("USB worker shutting down");
                break;
            }

            self.handle_command(cmd);
        }

        // Transport drop releases any remaining claim
        self.transport = None;
        info!("USB worker thread stopped");
    }

    fn handle_command(&mut self, cmd: UsbCommand) {
        match cmd {
            UsbCommand::Detect { filters, response } => {
                // Drop any prior claim before rescanning; detect must be
                // repeat-safe
                self.transport = None;

                let result = transport::discover_and_claim(&filters);
                let reply = match &result {
                    Ok(t) => Ok(t.summary().clone()),
                    Err(fault) => {
                        warn!("device detection failed: {}", fault);
                        Err(fault.clone())
                    }
                };
                self.transport = result.ok();
                let _ = response.send(reply);
            }

            UsbCommand::BulkWrite {
                data,
                timeout,
                response,
            } => {
                let result = match &self.transport {
                    Some(t) => t.write(&data, timeout),
                    None => Err(UsbFault::NoDevice),
                };
                if let Err(fault) = &result {
                    warn!("bulk write of {} bytes failed: {}", data.len(), fault);
                }
                let _ = response.send(result);
            }

            UsbCommand::BulkRead {
                capacity,
                timeout,
                response,
            } => {
                let result = match &self.transport {
                    Some(t) => t.read(capacity, timeout),
                    None => Err(UsbFault::NoDevice),
                };
                match &result {
                    Ok(data) => debug!("bulk read returned {} bytes", data.len()),
                    Err(fault) => warn!("bulk read failed: {}", fault),
                }
                let _ = response.send(result);
            }

            UsbCommand::Release { response } => {
                if self.transport.take().is_some() {
                    debug!("released claimed device");
                }
                let _ = response.send(());
            }

            UsbCommand::Shutdown => unreachable!("handled in run loop"),
        }
    }
}

/// Spawn the USB worker thread
pub fn spawn_usb_worker(worker: UsbWorker) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("usb-worker".to_string())
        .spawn(move || UsbWorkerThread::new(worker).run())
        .expect("Failed to spawn USB worker thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::create_usb_bridge;
    use std::time::Duration;

    #[tokio::test]
    async fn test_io_without_device_reports_no_device() {
        let (bridge, worker) = create_usb_bridge();
        let handle = spawn_usb_worker(worker);

        let write = bridge
            .bulk_write(vec![0u8; 4], Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(write.unwrap_err(), UsbFault::NoDevice);

        let read = bridge.bulk_read(64, Duration::from_millis(100)).await.unwrap();
        assert_eq!(read.unwrap_err(), UsbFault::NoDevice);

        bridge.try_send_command(UsbCommand::Shutdown);
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn test_release_without_claim_acknowledges() {
        let (bridge, worker) = create_usb_bridge();
        let handle = spawn_usb_worker(worker);

        bridge.release().await.unwrap();
        bridge.release().await.unwrap();

        bridge.try_send_command(UsbCommand::Shutdown);
        handle.join().unwrap();
    }
}
