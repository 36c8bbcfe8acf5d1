//! Errors and shared constants for reader operations

use thiserror::Error;

/// Length of a Mifare sector key ("window code")
pub const PASSWORD_LEN: usize = 6;

/// Factory default key, all bytes `0xFF`
pub const DEFAULT_PASSWORD: [u8; PASSWORD_LEN] = [0xFF; PASSWORD_LEN];

/// Key group A selector
pub const KEY_GROUP_A: u8 = 0x0A;

/// Key group B selector
pub const KEY_GROUP_B: u8 = 0x0B;

/// Errors raised while validating an inbound frame.
///
/// Every variant keeps the offending bytes for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Response is too short or its length byte points past the buffer
    #[error("malformed frame: {raw:02X?}")]
    MalformedFrame { raw: Vec<u8> },

    /// Trailing XOR byte does not match the frame contents
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{found:02X} in {raw:02X?}")]
    ChecksumMismatch { expected: u8, found: u8, raw: Vec<u8> },

    /// Sync bytes are not `CD DC`
    #[error("invalid header: {raw:02X?}")]
    InvalidHeader { raw: Vec<u8> },

    /// Reader reported the operation as failed (status `0x80`)
    #[error("operation failed: {raw:02X?}")]
    OperationFailed { raw: Vec<u8> },

    /// Status byte is neither success nor failure
    #[error("unexpected status 0x{status:02X}: {raw:02X?}")]
    UnexpectedStatus { status: u8, raw: Vec<u8> },
}

/// Errors that can occur during reader operations
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Caller-supplied data violates a length or range constraint.
    /// Nothing is written to the transport.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation is known to the device but not supported by this driver
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// No bytes arrived within the read window
    #[error("no response from reader")]
    NoResponse,

    /// Transport layer error (serial port, mock, etc.)
    #[error("transport error: {0}")]
    Transport(String),

    /// Response frame was rejected
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Convert bytes to uppercase hex string
pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
