//! MTP engine for switch-mtp
//!
//! One engine instance owns one connection's worth of state: the claimed
//! USB device (held by a dedicated worker thread), the open session, and
//! the transaction counter. The four boundary operations (detect, list,
//! upload, disconnect) are exposed as async methods on [`MtpEngine`];
//! callers receive plain [`DeviceSummary`]/[`FileEntry`] records and typed
//! errors, never raw protocol containers.
//!
//! # Example
//!
//! ```no_run
//! use engine::{EngineConfig, MtpEngine};
//!
//! # async fn example() -> Result<(), engine::EngineError> {
//! let engine = MtpEngine::new(EngineConfig::default());
//!
//! let device = engine.detect_devices().await?;
//! println!("connected to {}", device.name);
//!
//! for entry in engine.get_files("/").await? {
//!     println!("{:?} {}", entry.kind, entry.path);
//! }
//!
//! engine.disconnect().await;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod config;
mod error;
mod session;
mod transport;
mod worker;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use protocol::{DeviceSummary, FileEntry, FileKind, ObjectHandle};
pub use worker::spawn_usb_worker;

use common::{UsbBridge, UsbCommand, create_usb_bridge};
use session::Connection;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Simulated transfer time of the upload stub
const UPLOAD_STUB_DELAY: Duration = Duration::from_secs(2);

/// The MTP engine: an explicit connection context
///
/// All operations serialize on an internal connection mutex, so at most
/// one command/response exchange is in flight on the claimed endpoint pair
/// at a time. The engine is cheap to share behind an `Arc` and safe to
/// drive from multiple tasks; callers never observe interleaved exchanges.
pub struct MtpEngine {
    bridge: UsbBridge,
    conn: Mutex<Connection>,
    config: EngineConfig,
}

impl MtpEngine {
    /// Create an engine backed by a real USB worker thread
    pub fn new(config: EngineConfig) -> Self {
        let (bridge, usb_worker) = create_usb_bridge();
        worker::spawn_usb_worker(usb_worker);
        Self::with_bridge(bridge, config)
    }

    /// Create an engine over an existing bridge
    ///
    /// The worker side of the bridge may be the real USB thread or a
    /// scripted stand-in; tests use this to run the full engine without
    /// hardware attached.
    pub fn with_bridge(bridge: UsbBridge, config: EngineConfig) -> Self {
        Self {
            bridge,
            conn: Mutex::new(Connection::default()),
            config,
        }
    }

    /// Detect and connect to an MTP device
    ///
    /// Disconnects any prior connection, performs full discovery and
    /// claim, then attempts the session-open handshake. On handshake
    /// exhaustion the USB claim is kept and the last failure is returned;
    /// a later [`get_files`](Self::get_files) then fails fast with
    /// [`EngineError::SessionNotOpen`]. Safe to call repeatedly.
    pub async fn detect_devices(&self) -> Result<DeviceSummary> {
        let mut conn = self.conn.lock().await;

        // Repeat-safe: any prior connection is torn down first
        conn.reset();

        let summary = self.bridge.detect(self.config.device_filters.clone()).await??;
        info!(
            "detected {} ({:04x}:{:04x})",
            summary.name, summary.vendor_id, summary.product_id
        );
        conn.set_device(summary.clone());

        session::open_session(&self.bridge, &mut conn, &self.config).await?;
        Ok(summary)
    }

    /// List the files and folders at the storage root
    ///
    /// Only `"/"` is supported; any other path is rejected before any USB
    /// activity. Requires a prior successful
    /// [`detect_devices`](Self::detect_devices). Ordering of the returned
    /// records is not guaranteed.
    pub async fn get_files(&self, path: &str) -> Result<Vec<FileEntry>> {
        if path != "/" {
            return Err(EngineError::UnsupportedPath(path.to_string()));
        }

        let mut conn = self.conn.lock().await;
        if !conn.connected() {
            return Err(EngineError::NotConnected);
        }
        if !conn.session_open() {
            return Err(EngineError::SessionNotOpen);
        }

        catalog::list_root(&self.bridge, &mut conn, &self.config).await
    }

    /// Upload a local file to the device
    ///
    /// Stub: the SendObjectInfo/SendObject sequence is not implemented for
    /// the supported device yet. The contract is kept (the session must
    /// be open, and success or failure is reported exactly once) while
    /// the transfer itself is simulated with a fixed delay.
    pub async fn upload_file(&self, local_path: &Path, destination: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        if !conn.connected() {
            return Err(EngineError::NotConnected);
        }
        if !conn.session_open() {
            return Err(EngineError::SessionNotOpen);
        }
        drop(conn);

        debug!(
            "upload {} -> {} (simulated)",
            local_path.display(),
            destination
        );
        tokio::time::sleep(UPLOAD_STUB_DELAY).await;
        info!("upload of {} reported complete", local_path.display());
        Ok(())
    }

    /// Disconnect from the device
    ///
    /// Always succeeds and is idempotent: session id and transaction
    /// counter reset to 0, the device summary is dropped, and the worker
    /// releases its claim. A failed release (bridge already gone) is
    /// logged and ignored; there is nothing left to release in that case.
    pub async fn disconnect(&self) {
        let mut conn = self.conn.lock().await;
        conn.reset();

        if let Err(e) = self.bridge.release().await {
            warn!("release during disconnect failed: {}", e);
        }
        debug!("disconnected");
    }

    /// Currently connected device, if any
    pub async fn connected_device(&self) -> Option<DeviceSummary> {
        self.conn.lock().await.device().cloned()
    }
}

impl Drop for MtpEngine {
    fn drop(&mut self) {
        // Best effort; the worker also exits when the bridge closes
        self.bridge.try_send_command(UsbCommand::Shutdown);
    }
}
