//! MTP wire protocol for switch-mtp
//!
//! This crate holds everything that touches raw bytes: container framing
//! and parsing, the operation/response code tables, the compatibility layer
//! that normalizes the supported device's malformed responses, and the
//! binary record decoders used during object enumeration. It performs no
//! I/O and owns no USB resources.
//!
//! # Example
//!
//! ```
//! use protocol::container::encode_command;
//! use protocol::codes::{op, rc};
//! use protocol::compat::normalize;
//!
//! let cmd = encode_command(op::OPEN_SESSION, 1, &[1]);
//! assert_eq!(cmd.len(), 16);
//!
//! // The device answered with a 3-byte fragment; the compatibility layer
//! // reinterprets it as a flagged OK.
//! let resp = normalize(&[0x01, 0x02, 0x03], 1);
//! assert_eq!(resp.code, rc::OK);
//! assert!(resp.substituted);
//! ```

pub mod codes;
pub mod compat;
pub mod container;
pub mod error;
pub mod object;
pub mod test_utils;
pub mod types;

pub use codes::{FORMAT_ASSOCIATION, response_name};
pub use compat::{NormalizedResponse, normalize};
pub use container::{
    CONTAINER_HEADER_LEN, ContainerHeader, ContainerType, decode_header, encode_command,
};
pub use error::{ProtocolError, Result};
pub use object::{FILENAME_OFFSET, ObjectInfo, parse_object_info, parse_u32_array};
pub use types::{DeviceSummary, FileEntry, FileKind, ObjectHandle, StorageId};
