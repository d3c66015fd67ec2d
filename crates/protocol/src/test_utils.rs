//! Test helpers for building synthetic device responses
//!
//! Used by this crate's tests and by the engine's integration tests to
//! script a fake device without hardware attached.
//!
//! # Example
//!
//! ```
//! use protocol::test_utils::{build_container, u32_array_payload};
//! use protocol::codes::rc;
//!
//! let data = build_container(2, rc::OK, 1, &u32_array_payload(&[0x00010001]));
//! assert_eq!(data.len(), 12 + 8);
//! ```

use crate::container::CONTAINER_HEADER_LEN;
use crate::object::FILENAME_OFFSET;
use byteorder::{ByteOrder, LittleEndian};

/// Build a raw container with the given header fields and payload
///
/// The length field is set honestly; tests exercising the misreported-length
/// quirk can patch bytes 0..4 afterwards.
pub fn build_container(container_type: u16, code: u16, transaction_id: u32, payload: &[u8]) -> Vec<u8> {
    let total = CONTAINER_HEADER_LEN + payload.len();
    let mut buf = vec![0u8; total];

    LittleEndian::write_u32(&mut buf[0..4], total as u32);
    LittleEndian::write_u16(&mut buf[4..6], container_type);
    LittleEndian::write_u16(&mut buf[6..8], code);
    LittleEndian::write_u32(&mut buf[8..12], transaction_id);
    buf[CONTAINER_HEADER_LEN..].copy_from_slice(payload);

    buf
}

/// Build a `count:u32` + ids payload (GetStorageIDs / GetObjectHandles)
pub fn u32_array_payload(ids: &[u32]) -> Vec<u8> {
    let mut buf = vec![0u8; 4 + ids.len() * 4];
    LittleEndian::write_u32(&mut buf[0..4], ids.len() as u32);
    for (i, id) in ids.iter().enumerate() {
        LittleEndian::write_u32(&mut buf[4 + i * 4..8 + i * 4], *id);
    }
    buf
}

/// Build an object-info payload with the filename at the fixed offset
///
/// Encodes the name as UCS-2 with the conventional trailing NUL unit
/// included in the declared count, matching what the supported device
/// emits.
pub fn object_info_payload(storage_id: u32, format_code: u16, name: &str) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
    let mut buf = vec![0u8; FILENAME_OFFSET + 1 + units.len() * 2];

    LittleEndian::write_u32(&mut buf[0..4], storage_id);
    LittleEndian::write_u16(&mut buf[4..6], format_code);
    buf[FILENAME_OFFSET] = units.len() as u8;
    for (i, unit) in units.iter().enumerate() {
        let offset = FILENAME_OFFSET + 1 + i * 2;
        LittleEndian::write_u16(&mut buf[offset..offset + 2], *unit);
    }

    buf
}
