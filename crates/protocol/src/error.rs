//! Protocol error types

use thiserror::Error;

/// Wire-level parse errors
///
/// A truncated record is distinct from an empty result: short storage-id or
/// handle-list payloads decode to empty lists, while a record too short for
/// its declared layout surfaces here and the caller decides whether to skip
/// or escalate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload shorter than the record layout requires
    #[error("truncated record: needed {needed} bytes, got {available}")]
    TruncatedRecord { needed: usize, available: usize },

    /// Object-info record carries no filename
    #[error("object-info record has no filename")]
    MissingFilename,
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::TruncatedRecord {
            needed: 53,
            available: 12,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("needed 53"));
        assert!(msg.contains("got 12"));
    }
}
