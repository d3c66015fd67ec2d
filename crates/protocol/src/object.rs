//! Binary record decoding for storage and object enumeration
//!
//! Payloads here are the bytes past the 12-byte container header of a data
//! phase. Every offset read is bounds-checked against the bytes actually
//! received: the device-reported counts and lengths are treated as claims,
//! never as facts.

use crate::codes::FORMAT_ASSOCIATION;
use crate::error::{ProtocolError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Offset of the filename field from the start of an object-info payload
///
/// Empirically derived for the supported device class. The fixed fields
/// between the format code and the filename are not decoded by this engine,
/// so their layout is skipped rather than modeled.
pub const FILENAME_OFFSET: usize = 52;

/// Flat object metadata decoded from a GetObjectInfo data payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Storage unit the object lives on
    pub storage_id: u32,
    /// Object format code; 0x3001 marks a folder
    pub format_code: u16,
    /// Filename decoded from the length-prefixed UCS-2 field
    pub filename: String,
}

impl ObjectInfo {
    /// Whether the format code marks an association (folder)
    pub fn is_folder(&self) -> bool {
        self.format_code == FORMAT_ASSOCIATION
    }
}

/// Parse a `count:u32` + `count * u32` array payload
///
/// Used for both GetStorageIDs and GetObjectHandles data payloads, which
/// share this layout. The declared count is bounded by the bytes actually
/// present; an overclaimed count yields only the ids that fit, and a payload
/// too short for even the count field yields an empty list.
pub fn parse_u32_array(payload: &[u8]) -> Vec<u32> {
    if payload.len() < 4 {
        return Vec::new();
    }

    let declared = LittleEndian::read_u32(&payload[0..4]) as usize;
    let available = (payload.len() - 4) / 4;
    let count = declared.min(available);

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let offset = 4 + i * 4;
        ids.push(LittleEndian::read_u32(&payload[offset..offset + 4]));
    }
    ids
}

/// Parse the fixed-layout object-info record
///
/// Layout: storage id (u32 at 0), object format (u16 at 4), then, skipping
/// the intervening fixed fields, a one-byte UCS-2 unit count at
/// [`FILENAME_OFFSET`] followed by that many 2-byte code units. A trailing
/// NUL code unit is stripped when present.
///
/// A missing or zero unit count, or a declared count exceeding the remaining
/// buffer, is a typed error distinct from "zero results"; the caller skips
/// the affected object rather than aborting enumeration.
pub fn parse_object_info(payload: &[u8]) -> Result<ObjectInfo> {
    if payload.len() < 6 {
        return Err(ProtocolError::TruncatedRecord {
            needed: 6,
            available: payload.len(),
        });
    }

    let storage_id = LittleEndian::read_u32(&payload[0..4]);
    let format_code = LittleEndian::read_u16(&payload[4..6]);

    if payload.len() <= FILENAME_OFFSET {
        return Err(ProtocolError::TruncatedRecord {
            needed: FILENAME_OFFSET + 1,
            available: payload.len(),
        });
    }

    let unit_count = payload[FILENAME_OFFSET] as usize;
    if unit_count == 0 {
        return Err(ProtocolError::MissingFilename);
    }

    let name_start = FILENAME_OFFSET + 1;
    let name_end = name_start + unit_count * 2;
    if payload.len() < name_end {
        return Err(ProtocolError::TruncatedRecord {
            needed: name_end,
            available: payload.len(),
        });
    }

    let mut units: Vec<u16> = payload[name_start..name_end]
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .collect();

    if units.last() == Some(&0) {
        units.pop();
    }

    Ok(ObjectInfo {
        storage_id,
        format_code,
        filename: String::from_utf16_lossy(&units),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{object_info_payload, u32_array_payload};

    #[test]
    fn test_u32_array_roundtrip() {
        let payload = u32_array_payload(&[0x00010001, 0x00020001]);
        assert_eq!(parse_u32_array(&payload), vec![0x00010001, 0x00020001]);
    }

    #[test]
    fn test_u32_array_empty_and_short() {
        assert!(parse_u32_array(&[]).is_empty());
        assert!(parse_u32_array(&[1, 0]).is_empty());
        assert!(parse_u32_array(&u32_array_payload(&[])).is_empty());
    }

    #[test]
    fn test_u32_array_overclaimed_count() {
        // Claims 100 ids, carries 2
        let mut payload = u32_array_payload(&[7, 9]);
        payload[0] = 100;
        assert_eq!(parse_u32_array(&payload), vec![7, 9]);
    }

    #[test]
    fn test_u32_array_truncated_tail() {
        // 2 ids declared, second id cut to 3 bytes
        let mut payload = u32_array_payload(&[7, 9]);
        payload.truncate(payload.len() - 1);
        assert_eq!(parse_u32_array(&payload), vec![7]);
    }

    #[test]
    fn test_object_info_folder() {
        let payload = object_info_payload(0x00010001, 0x3001, "Screenshots");
        let info = parse_object_info(&payload).unwrap();

        assert_eq!(info.storage_id, 0x00010001);
        assert_eq!(info.format_code, 0x3001);
        assert_eq!(info.filename, "Screenshots");
        assert!(info.is_folder());
    }

    #[test]
    fn test_object_info_file_strips_trailing_nul() {
        // object_info_payload appends the conventional NUL terminator unit
        let payload = object_info_payload(1, 0x3800, "save.bin");
        let info = parse_object_info(&payload).unwrap();

        assert_eq!(info.filename, "save.bin");
        assert!(!info.is_folder());
    }

    #[test]
    fn test_object_info_too_short_for_fixed_fields() {
        let err = parse_object_info(&[0u8; 4]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedRecord { needed: 6, available: 4 }
        ));
    }

    #[test]
    fn test_object_info_missing_count_byte() {
        let err = parse_object_info(&[0u8; FILENAME_OFFSET]).unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedRecord { .. }));
    }

    #[test]
    fn test_object_info_zero_count() {
        let mut payload = object_info_payload(1, 0x3800, "x");
        payload[FILENAME_OFFSET] = 0;
        assert!(matches!(
            parse_object_info(&payload),
            Err(ProtocolError::MissingFilename)
        ));
    }

    #[test]
    fn test_object_info_count_exceeds_buffer() {
        let mut payload = object_info_payload(1, 0x3800, "x");
        payload[FILENAME_OFFSET] = 200;
        assert!(matches!(
            parse_object_info(&payload),
            Err(ProtocolError::TruncatedRecord { .. })
        ));
    }
}
