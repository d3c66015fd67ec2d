//! Boundary records surfaced to external collaborators
//!
//! These are plain, copyable records with no back-reference into engine
//! state. They cross a UI/IPC boundary, so they carry serde derives; the
//! wire containers themselves never leak past the engine.

use serde::{Deserialize, Serialize};

/// Identifier of one storage unit exposed by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageId(pub u32);

/// Opaque device-assigned object handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

/// Connected device summary returned by detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Product string, or the synthesized `"MTP Device (vid:pid)"` fallback
    pub name: String,
    /// USB vendor id
    pub vendor_id: u16,
    /// USB product id
    pub product_id: u16,
}

/// Whether a listed object is a folder or a plain file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Folder,
    File,
}

/// One entry of a root-directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Decoded filename
    pub name: String,
    /// Folder/file discrimination by object format code
    pub kind: FileKind,
    /// Display path (`"/" + name`; only root listings exist in this scope)
    pub path: String,
    /// Handle for follow-up operations on this object
    pub handle: ObjectHandle,
    /// Raw object format code
    pub format_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_copy() {
        let h1 = ObjectHandle(42);
        let h2 = h1;
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_file_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FileKind::Folder).unwrap(), "\"folder\"");
        assert_eq!(serde_json::to_string(&FileKind::File).unwrap(), "\"file\"");
    }

    #[test]
    fn test_file_entry_roundtrip() {
        let entry = FileEntry {
            name: "save.bin".to_string(),
            kind: FileKind::File,
            path: "/save.bin".to_string(),
            handle: ObjectHandle(3),
            format_code: 0x3800,
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: FileEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
