//! Object catalog builder
//!
//! Orchestrates GetStorageIDs → GetObjectHandles → GetObjectInfo against
//! the first storage the device reports and decodes the results into flat
//! [`FileEntry`] records. Hierarchy is re-derived per request, never
//! cached, and only the storage root is enumerated in this scope.
//!
//! Failure policy mirrors how much each failure actually costs: a short or
//! empty storage/handle listing is an empty catalog, a rejected handle
//! listing fails the whole request, and a bad individual object is logged
//! and skipped: one malformed record must never abort the listing.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::session::{Connection, exchange};
use common::UsbBridge;
use protocol::codes::op;
use protocol::object::{parse_object_info, parse_u32_array};
use protocol::{FileEntry, FileKind, ObjectHandle};
use tracing::{debug, warn};

/// Enumerate the root of the first reported storage
///
/// Requires an open session; the caller enforces that before any USB
/// activity happens.
pub(crate) async fn list_root(
    bridge: &UsbBridge,
    conn: &mut Connection,
    config: &EngineConfig,
) -> Result<Vec<FileEntry>> {
    let deadline = config.response_timeout();

    let storages = exchange(bridge, conn, config, op::GET_STORAGE_IDS, &[], deadline).await?;
    let storage_ids = parse_u32_array(storages.payload());
    let Some(&storage_id) = storage_ids.first() else {
        debug!("device reported no storages, returning empty catalog");
        return Ok(Vec::new());
    };
    debug!(
        "using storage {:#010x} of {} reported",
        storage_id,
        storage_ids.len()
    );

    // format filter 0, parent handle 0: every object at the root
    let handles_resp = exchange(
        bridge,
        conn,
        config,
        op::GET_OBJECT_HANDLES,
        &[storage_id, 0, 0],
        deadline,
    )
    .await?;
    if !handles_resp.is_ok() {
        return Err(EngineError::protocol(handles_resp.code));
    }
    let handles = parse_u32_array(handles_resp.payload());
    debug!("storage {:#010x} has {} objects", storage_id, handles.len());

    let mut entries = Vec::with_capacity(handles.len());
    for handle in handles {
        let info_resp = match exchange(
            bridge,
            conn,
            config,
            op::GET_OBJECT_INFO,
            &[handle],
            deadline,
        )
        .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("GetObjectInfo for handle {:#010x} failed, skipping: {}", handle, e);
                continue;
            }
        };
        if !info_resp.is_ok() {
            warn!(
                "GetObjectInfo for handle {:#010x} rejected with {:#06x} ({}), skipping",
                handle,
                info_resp.code,
                protocol::response_name(info_resp.code)
            );
            continue;
        }

        let info = match parse_object_info(info_resp.payload()) {
            Ok(info) => info,
            Err(e) => {
                warn!("malformed object-info for handle {:#010x}, skipping: {}", handle, e);
                continue;
            }
        };

        let kind = if info.is_folder() {
            FileKind::Folder
        } else {
            FileKind::File
        };
        entries.push(FileEntry {
            path: format!("/{}", info.filename),
            name: info.filename,
            kind,
            handle: ObjectHandle(handle),
            format_code: info.format_code,
        });
    }

    Ok(entries)
}
