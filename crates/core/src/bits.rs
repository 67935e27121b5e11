//! Conversion between textual bit-strings and bit sequences.
//!
//! A payload is carried as text where each character stands for one bit.
//! `'1'` is a one; every other character (including `'0'`) decodes as zero.
//! There is no validation: unknown characters silently degrade to zero, so
//! `to_bits` is total and its output always has one bit per character.
//!
//! # Example
//! ```
//! use hamming_relay_core::bits::{to_bits, to_text};
//!
//! let bits = to_bits("10x1");
//! assert_eq!(bits, vec![true, false, false, true]);
//! assert_eq!(to_text(&bits), "1001");
//! ```

/// A single bit. `true` is one.
pub type Bit = bool;

/// Character denoting a one bit.
pub const ONE: char = '1';

/// Character denoting a zero bit.
pub const ZERO: char = '0';

/// Map each character of `text` to a bit.
pub fn to_bits(text: &str) -> Vec<Bit> {
    text.chars().map(|c| c == ONE).collect()
}

/// Map each bit back to its character.
pub fn to_text(bits: &[Bit]) -> String {
    bits.iter().map(|&b| if b { ONE } else { ZERO }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_binary_text() {
        for text in ["", "0", "1", "101", "11111111111", "0101010101010101010101"] {
            assert_eq!(to_text(&to_bits(text)), text);
        }
    }

    #[test]
    fn test_unknown_characters_become_zero() {
        assert_eq!(to_bits("2a 1"), vec![false, false, false, true]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 'é' is two bytes in UTF-8 but a single character
        let bits = to_bits("1é1");
        assert_eq!(bits.len(), 3);
        assert_eq!(to_text(&bits), "101");
    }
}
