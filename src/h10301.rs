//! HID H10301 (26-bit Wiegand) card numbers packed for T5577 chips.
//!
//! Layout follows the HID format example shipped with proxmark3: a fixed
//! `0x20` key byte, then the facility code and card ID shifted left by one
//! bit so the leading even parity bit and trailing odd parity bit fit around
//! them.

use std::fmt;

use crate::types::{bytes_to_hex, ReaderError};

/// Encoded card number length in bytes
pub const H10301_LEN: usize = 5;

/// A facility code / card ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct H10301 {
    pub facility: u8,
    pub id: u16,
}

impl H10301 {
    pub fn new(facility: u8, id: u16) -> Self {
        Self { facility, id }
    }

    /// Pack into the 5-byte buffer written to the chip
    pub fn encode(&self) -> [u8; H10301_LEN] {
        let facility = self.facility;
        let id = self.id;

        let mut out = [0u8; H10301_LEN];
        out[0] = 0x20;
        out[1] = 0x04 ^ (facility >> 7);
        out[2] = (facility << 1) ^ ((id >> 13) & 0x01) as u8;
        out[3] = (id >> 7) as u8;
        // Bit 0 holds the odd parity bit
        out[4] = (id << 1) as u8;

        // Even parity over the facility code and the top ID nibble
        let leading = (u32::from(facility) << 8) + u32::from((id >> 8) & 0xF0);
        if parity(leading) {
            out[1] ^= 0x02;
        }

        // Odd parity over the remaining ID bits
        let trailing = (u32::from((id >> 8) & 0x0F) << 8) + u32::from(out[3]);
        if !parity(trailing) {
            out[4] ^= 0x01;
        }

        out
    }
}

impl TryFrom<(u32, u32)> for H10301 {
    type Error = ReaderError;

    /// Build from `(facility, id)`, rejecting values the format cannot carry
    fn try_from((facility, id): (u32, u32)) -> Result<Self, Self::Error> {
        let facility = u8::try_from(facility).map_err(|_| {
            ReaderError::InvalidArgument(format!(
                "Facility code out of range: {} (maximum: {})",
                facility,
                u8::MAX
            ))
        })?;
        let id = u16::try_from(id).map_err(|_| {
            ReaderError::InvalidArgument(format!(
                "Card ID out of range: {} (maximum: {})",
                id,
                u16::MAX
            ))
        })?;
        Ok(Self { facility, id })
    }
}

impl fmt::Display for H10301 {
    /// Lowercase hex of the encoded bytes, e.g. `2006c6384a`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_hex(&self.encode()).to_lowercase())
    }
}

/// `true` when `n` has an odd number of set bits
fn parity(n: u32) -> bool {
    n.count_ones() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parity() {
        assert!(!parity(0));
        assert!(parity(1));
        assert!(!parity(0b11));
        assert!(parity(0x6310));
        assert!(parity(0x0C38));
    }

    #[test]
    fn test_encode_reference_card() {
        let card = H10301::new(0x63, 0x1C25);
        assert_eq!(card.encode(), [0x20, 0x06, 0xC6, 0x38, 0x4A]);
        assert_eq!(card.to_string(), "2006c6384a");
    }

    #[test]
    fn test_encode_zero() {
        // Only the odd parity bit is set
        assert_eq!(H10301::new(0, 0).encode(), [0x20, 0x04, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_all_ones() {
        assert_eq!(H10301::new(0xFF, 0xFFFF).encode(), [0x20, 0x05, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_facility_high_bit() {
        // Facility bit 7 lands in byte 1, ID bit 13 in byte 2
        assert_eq!(H10301::new(0x80, 0xA000).encode(), [0x20, 0x07, 0x01, 0x40, 0x00]);
    }

    #[test]
    fn test_encode_small_values() {
        assert_eq!(H10301::new(1, 1).encode(), [0x20, 0x06, 0x02, 0x00, 0x03]);
        assert_eq!(H10301::new(12, 34567).encode(), [0x20, 0x06, 0x18, 0x0E, 0x0F]);
    }

    #[test]
    fn test_try_from_in_range() {
        let card = H10301::try_from((0x63, 0x1C25)).unwrap();
        assert_eq!(card, H10301::new(0x63, 0x1C25));
    }

    #[test]
    fn test_try_from_facility_too_large() {
        let result = H10301::try_from((256, 1));
        assert!(matches!(result, Err(ReaderError::InvalidArgument(_))));
    }

    #[test]
    fn test_try_from_id_too_large() {
        let result = H10301::try_from((1, 65536));
        assert!(matches!(result, Err(ReaderError::InvalidArgument(_))));
    }

    proptest! {
        #[test]
        fn prop_encode_deterministic(facility in any::<u8>(), id in any::<u16>()) {
            let card = H10301::new(facility, id);
            let first = card.encode();
            prop_assert_eq!(first.len(), H10301_LEN);
            prop_assert_eq!(first, card.encode());
            prop_assert_eq!(first[0], 0x20);
        }

        /// Byte 3 and the upper bits of byte 4 carry the ID unchanged
        #[test]
        fn prop_encode_keeps_low_id_bits(facility in any::<u8>(), id in any::<u16>()) {
            let out = H10301::new(facility, id).encode();
            prop_assert_eq!(out[3], (id >> 7) as u8);
            prop_assert_eq!(out[4] >> 1, (id & 0x7F) as u8);
        }
    }
}
