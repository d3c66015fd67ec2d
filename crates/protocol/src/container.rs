//! MTP container framing
//!
//! Every MTP exchange is framed as a container: a 12-byte fixed header
//! followed by zero or more 4-byte parameters (command/response phase) or an
//! opaque data payload (data phase). All fields are little-endian.
//!
//! # Wire layout
//!
//! ```text
//! [Length: u32][Type: u16][Code: u16][TransactionId: u32][params / payload]
//! ```
//!
//! The length field is set to the total container size on encode. On decode
//! it is carried through but never trusted: the supported device class is
//! known to misreport it, so all downstream parsing is bounded by the number
//! of bytes actually received.

use byteorder::{ByteOrder, LittleEndian};

/// Size of the fixed container header in bytes
pub const CONTAINER_HEADER_LEN: usize = 12;

/// Container type field values defined by MTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ContainerType {
    /// Operation request (host to device)
    Command = 1,
    /// Data phase payload (either direction)
    Data = 2,
    /// Operation response (device to host)
    Response = 3,
    /// Asynchronous device event
    Event = 4,
}

impl ContainerType {
    /// Map a raw type field to a known container type
    pub fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            1 => Some(ContainerType::Command),
            2 => Some(ContainerType::Data),
            3 => Some(ContainerType::Response),
            4 => Some(ContainerType::Event),
            _ => None,
        }
    }
}

/// Parsed container header
///
/// The type and code fields are kept as raw `u16` values rather than enums:
/// the compatibility layer needs to observe zeroed fields before they are
/// mapped to canonical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Device-reported total container length (not validated)
    pub length: u32,
    /// Raw container type field
    pub container_type: u16,
    /// Operation or response code
    pub code: u16,
    /// Transaction id correlating this container with its command
    pub transaction_id: u32,
}

impl ContainerHeader {
    /// Interpret the raw type field, if it names a known container type
    pub fn kind(&self) -> Option<ContainerType> {
        ContainerType::from_u16(self.container_type)
    }
}

/// Encode a command container
///
/// Produces the 12-byte header plus 4 bytes per parameter, with the length
/// field set to the buffer's own total size.
///
/// # Example
/// ```
/// use protocol::container::{encode_command, CONTAINER_HEADER_LEN};
/// use protocol::codes::op;
///
/// let buf = encode_command(op::OPEN_SESSION, 1, &[1]);
/// assert_eq!(buf.len(), CONTAINER_HEADER_LEN + 4);
/// assert_eq!(buf[0], 16); // length field, little-endian
/// ```
pub fn encode_command(opcode: u16, transaction_id: u32, params: &[u32]) -> Vec<u8> {
    let total = CONTAINER_HEADER_LEN + params.len() * 4;
    let mut buf = vec![0u8; total];

    LittleEndian::write_u32(&mut buf[0..4], total as u32);
    LittleEndian::write_u16(&mut buf[4..6], ContainerType::Command as u16);
    LittleEndian::write_u16(&mut buf[6..8], opcode);
    LittleEndian::write_u32(&mut buf[8..12], transaction_id);

    for (i, param) in params.iter().enumerate() {
        let offset = CONTAINER_HEADER_LEN + i * 4;
        LittleEndian::write_u32(&mut buf[offset..offset + 4], *param);
    }

    buf
}

/// Decode a container header from a received buffer
///
/// Returns `None` when fewer than 12 bytes are available. That outcome is a
/// signal consumed by the compatibility layer, not an error: the supported
/// device truncates some responses below the header floor. Never reads past
/// the end of the buffer, whatever the embedded length field claims.
pub fn decode_header(bytes: &[u8]) -> Option<ContainerHeader> {
    if bytes.len() < CONTAINER_HEADER_LEN {
        return None;
    }

    Some(ContainerHeader {
        length: LittleEndian::read_u32(&bytes[0..4]),
        container_type: LittleEndian::read_u16(&bytes[4..6]),
        code: LittleEndian::read_u16(&bytes[6..8]),
        transaction_id: LittleEndian::read_u32(&bytes[8..12]),
    })
}
