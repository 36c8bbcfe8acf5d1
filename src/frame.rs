//! Wire framing for the 7941W serial protocol.
//!
//! Command frames:  `AB BA <addr> <cmd> <len> <payload..> <xor>`
//! Response frames: `CD DC <addr> <status> <len> <payload..> <xor>`
//!
//! The two directions checksum different ranges. Commands XOR everything
//! after the sync bytes (address onward); responses XOR from the status byte
//! onward, leaving the address out. Both ranges are what the module expects.

use crate::types::FrameError;

/// Sync bytes opening every command frame
pub const COMMAND_SYNC: [u8; 2] = [0xAB, 0xBA];

/// Sync bytes opening every response frame
pub const RESPONSE_SYNC: [u8; 2] = [0xCD, 0xDC];

/// Response status: operation succeeded
pub const STATUS_OK: u8 = 0x81;

/// Response status: operation failed
pub const STATUS_FAILED: u8 = 0x80;

/// Largest payload a single-byte length field can describe
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Sync (2) + address + command/status + length
pub(crate) const HEADER_LEN: usize = 5;

/// Header plus trailing checksum
pub(crate) const FRAME_OVERHEAD: usize = HEADER_LEN + 1;

/// Largest frame either side can produce
pub(crate) const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + MAX_PAYLOAD_LEN;

const STATUS_OFFSET: usize = 3;
const LENGTH_OFFSET: usize = 4;

/// Running XOR of `bytes`, starting from zero
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Build a command frame.
///
/// `payload` must not exceed [`MAX_PAYLOAD_LEN`] bytes; the length field is a
/// single byte. Callers validate variable-length input before getting here.
pub fn encode_command(address: u8, command: u8, payload: &[u8]) -> Vec<u8> {
    debug_assert!(
        payload.len() <= MAX_PAYLOAD_LEN,
        "payload of {} bytes does not fit the length field",
        payload.len()
    );

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    frame.extend_from_slice(&COMMAND_SYNC);
    frame.push(address);
    frame.push(command);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame[COMMAND_SYNC.len()..]));
    frame
}

/// Validate a response frame and return its payload.
///
/// A failure status is reported as [`FrameError::OperationFailed`] without
/// checking the XOR byte; the module does not reliably checksum failure
/// replies, and the frame carries no data either way. Every other frame is
/// checksummed before its sync bytes and status are looked at.
pub fn decode_response(frame: &[u8]) -> Result<&[u8], FrameError> {
    if frame.len() < STATUS_OFFSET + 1 {
        return Err(FrameError::MalformedFrame { raw: frame.to_vec() });
    }

    let has_sync = frame[..RESPONSE_SYNC.len()] == RESPONSE_SYNC;
    let status = frame[STATUS_OFFSET];
    if status == STATUS_FAILED {
        if !has_sync {
            return Err(FrameError::InvalidHeader { raw: frame.to_vec() });
        }
        return Err(FrameError::OperationFailed { raw: frame.to_vec() });
    }

    let last = frame.len() - 1;
    let expected = checksum(&frame[STATUS_OFFSET..last]);
    if expected != frame[last] {
        return Err(FrameError::ChecksumMismatch {
            expected,
            found: frame[last],
            raw: frame.to_vec(),
        });
    }

    if !has_sync {
        return Err(FrameError::InvalidHeader { raw: frame.to_vec() });
    }

    if status != STATUS_OK {
        return Err(FrameError::UnexpectedStatus {
            status,
            raw: frame.to_vec(),
        });
    }

    let Some(&length) = frame.get(LENGTH_OFFSET) else {
        return Err(FrameError::MalformedFrame { raw: frame.to_vec() });
    };
    let end = HEADER_LEN + length as usize;
    if end > frame.len() {
        return Err(FrameError::MalformedFrame { raw: frame.to_vec() });
    }

    Ok(&frame[HEADER_LEN..end])
}

/// Total length of the response that starts with `partial`, once its
/// length byte has arrived
pub(crate) fn response_len(partial: &[u8]) -> Option<usize> {
    partial
        .get(LENGTH_OFFSET)
        .map(|&length| FRAME_OVERHEAD + length as usize)
}
