//! Session state and the single command/response primitive
//!
//! `Connection` is the engine's per-connection mutable state: the strictly
//! increasing transaction counter, the open session id (0 = no session),
//! and the detected device summary. It is owned behind the engine's
//! connection mutex, which serializes every exchange: at most one
//! command/response pair is ever in flight on the endpoint pair.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use common::UsbBridge;
use protocol::DeviceSummary;
use protocol::codes::{op, rc};
use protocol::compat::{NormalizedResponse, normalize};
use protocol::container::encode_command;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-connection mutable state
///
/// Created disconnected; reset to that state by disconnect. The
/// transaction counter starts at 1 for the first command of a connection
/// and is never reused until a full disconnect/reconnect cycle.
#[derive(Debug, Default)]
pub(crate) struct Connection {
    transaction_id: u32,
    session_id: u32,
    device: Option<DeviceSummary>,
}

impl Connection {
    /// Issue the next transaction id (monotonic, starting at 1)
    pub(crate) fn next_transaction_id(&mut self) -> u32 {
        self.transaction_id += 1;
        self.transaction_id
    }

    pub(crate) fn connected(&self) -> bool {
        self.device.is_some()
    }

    pub(crate) fn session_open(&self) -> bool {
        self.session_id != 0
    }

    pub(crate) fn device(&self) -> Option<&DeviceSummary> {
        self.device.as_ref()
    }

    pub(crate) fn set_device(&mut self, device: DeviceSummary) {
        self.device = Some(device);
    }

    pub(crate) fn mark_session_open(&mut self, session_id: u32) {
        self.session_id = session_id;
    }

    /// Drop back to the disconnected state
    ///
    /// Session id and transaction counter both return to 0.
    pub(crate) fn reset(&mut self) {
        self.transaction_id = 0;
        self.session_id = 0;
        self.device = None;
    }
}

/// One command/response exchange over the bridge
///
/// Allocates a fresh transaction id, writes the command container, then
/// races the bulk read against `deadline`. A lost race surfaces as
/// [`EngineError::Timeout`] and the late reply, if any, is discarded by the
/// dropped oneshot. The received bytes pass through the compatibility layer
/// before anything inspects them.
pub(crate) async fn exchange(
    bridge: &UsbBridge,
    conn: &mut Connection,
    config: &EngineConfig,
    opcode: u16,
    params: &[u32],
    deadline: Duration,
) -> Result<NormalizedResponse> {
    let transaction_id = conn.next_transaction_id();
    let command = encode_command(opcode, transaction_id, params);

    debug!(
        "=> {:#06x} tid={} params={:x?}",
        opcode, transaction_id, params
    );
    bridge.bulk_write(command, deadline).await??;

    let raw = match tokio::time::timeout(deadline, bridge.bulk_read(config.read_capacity, deadline))
        .await
    {
        Err(_elapsed) => return Err(EngineError::Timeout),
        Ok(reply) => reply??,
    };

    let response = normalize(&raw, transaction_id);
    debug!(
        "<= code={:#06x} tid={} {} bytes{}",
        response.code,
        response.transaction_id,
        response.data.len(),
        if response.substituted { " (substituted)" } else { "" }
    );
    Ok(response)
}

/// Drive Connected → SessionOpen with bounded retry
///
/// Up to `session_open_attempts` total attempts, pausing
/// `session_retry_delay` before every attempt after the first, each with a
/// fresh transaction id. `Ok` and `SessionAlreadyOpen` both count as open.
/// Exhausting the attempts leaves the USB claim in place and escalates the
/// last failure.
pub(crate) async fn open_session(
    bridge: &UsbBridge,
    conn: &mut Connection,
    config: &EngineConfig,
) -> Result<()> {
    let attempts = config.session_open_attempts.max(1);
    let mut last_err = EngineError::SessionNotOpen;

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(config.session_retry_delay()).await;
        }

        match exchange(
            bridge,
            conn,
            config,
            op::OPEN_SESSION,
            &[config.session_id],
            config.session_open_timeout(),
        )
        .await
        {
            Ok(resp) if resp.code == rc::OK || resp.code == rc::SESSION_ALREADY_OPEN => {
                conn.mark_session_open(config.session_id);
                debug!(
                    "session {} open on attempt {}/{}",
                    config.session_id, attempt, attempts
                );
                return Ok(());
            }
            Ok(resp) => {
                warn!(
                    "OpenSession attempt {}/{} rejected: {:#06x} ({})",
                    attempt,
                    attempts,
                    resp.code,
                    protocol::response_name(resp.code)
                );
                last_err = EngineError::protocol(resp.code);
            }
            Err(e) => {
                warn!("OpenSession attempt {}/{} failed: {}", attempt, attempts, e);
                last_err = e;
            }
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_ids_strictly_increase() {
        let mut conn = Connection::default();
        let ids: Vec<u32> = (0..5).map(|_| conn.next_transaction_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_reset_returns_counter_to_zero() {
        let mut conn = Connection::default();
        conn.next_transaction_id();
        conn.next_transaction_id();
        conn.mark_session_open(1);
        conn.set_device(DeviceSummary {
            name: "MTP Device (057e:2000)".to_string(),
            vendor_id: 0x057e,
            product_id: 0x2000,
        });

        conn.reset();
        assert!(!conn.connected());
        assert!(!conn.session_open());
        assert_eq!(conn.next_transaction_id(), 1);
    }

    #[test]
    fn test_no_session_until_marked() {
        let mut conn = Connection::default();
        assert!(!conn.session_open());
        conn.mark_session_open(1);
        assert!(conn.session_open());
    }
}
