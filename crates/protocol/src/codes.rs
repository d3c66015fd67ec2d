//! MTP operation and response code tables
//!
//! Only the subset of the MTP code space this engine actually issues or
//! interprets is listed. Unknown response codes are still surfaced to
//! callers numerically, with [`response_name`] providing a best-effort
//! readable mapping for logs.

/// Operation codes (command containers, host to device)
pub mod op {
    pub const GET_DEVICE_INFO: u16 = 0x1001;
    pub const OPEN_SESSION: u16 = 0x1002;
    pub const CLOSE_SESSION: u16 = 0x1003;
    pub const GET_STORAGE_IDS: u16 = 0x1004;
    pub const GET_OBJECT_HANDLES: u16 = 0x1007;
    pub const GET_OBJECT_INFO: u16 = 0x1008;
    pub const SEND_OBJECT_INFO: u16 = 0x100C;
    pub const SEND_OBJECT: u16 = 0x100D;
}

/// Response codes (response containers, device to host)
pub mod rc {
    pub const OK: u16 = 0x2001;
    pub const GENERAL_ERROR: u16 = 0x2002;
    pub const SESSION_NOT_OPEN: u16 = 0x2003;
    pub const INVALID_TRANSACTION_ID: u16 = 0x2004;
    pub const OPERATION_NOT_SUPPORTED: u16 = 0x2005;
    pub const PARAMETER_NOT_SUPPORTED: u16 = 0x2006;
    pub const INVALID_STORAGE_ID: u16 = 0x2008;
    pub const INVALID_OBJECT_HANDLE: u16 = 0x2009;
    pub const DEVICE_BUSY: u16 = 0x2019;
    pub const SESSION_ALREADY_OPEN: u16 = 0x201E;
}

/// Object format code marking an association (folder)
///
/// Everything else is treated as a plain file by this engine.
pub const FORMAT_ASSOCIATION: u16 = 0x3001;

/// Human-readable name for a response code
///
/// Used when surfacing device-reported failures so logs can distinguish
/// error kinds without a code table at hand.
pub fn response_name(code: u16) -> &'static str {
    match code {
        rc::OK => "OK",
        rc::GENERAL_ERROR => "GeneralError",
        rc::SESSION_NOT_OPEN => "SessionNotOpen",
        rc::INVALID_TRANSACTION_ID => "InvalidTransactionId",
        rc::OPERATION_NOT_SUPPORTED => "OperationNotSupported",
        rc::PARAMETER_NOT_SUPPORTED => "ParameterNotSupported",
        rc::INVALID_STORAGE_ID => "InvalidStorageId",
        rc::INVALID_OBJECT_HANDLE => "InvalidObjectHandle",
        rc::DEVICE_BUSY => "DeviceBusy",
        rc::SESSION_ALREADY_OPEN => "SessionAlreadyOpen",
        _ => "Unknown",
    }
}
