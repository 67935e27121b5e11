//! Extended Hamming(15,11) codec with single-error correction and
//! double-error detection (SECDED).
//!
//! # Codeword Layout
//!
//! ```text
//! position:  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16
//! role:     p1 p2 d0 p4 d1 d2 d3 p8 d4 d5 d6 d7 d8 d9 d10 P
//! ```
//!
//! - `p1, p2, p4, p8`: Hamming parity bits. Parity bit `pw` covers every
//!   position in 1..=15 whose number has weight `w` set.
//! - `d0..d10`: the 11 data bits in input order.
//! - `P`: overall parity over positions 1..=15.
//!
//! Parity bits are always recomputed from data on encode and never trusted
//! on decode.
//!
//! # Decoding
//!
//! The syndrome is the 4-bit number whose bit `k` is the XOR of the check
//! set for weight `2^k`, parity bit included. A nonzero syndrome names the
//! 1-indexed position of a single flipped bit. The overall parity over all
//! 16 bits separates single from double errors; see [`classify`].
//!
//! # Limits
//!
//! Distance 4 guarantees that any two distinct flips inside the 16 bits
//! yield a nonzero syndrome with even overall parity, so every double flip
//! is reported rather than miscorrected. Three or more flips are outside
//! the guarantee and may decode to a wrong block.

use crate::bits::Bit;
use crate::error::CodecError;

/// Data bits per block.
pub const DATA_BITS: usize = 11;

/// Bits covered by the Hamming parity checks (positions 1..=15).
pub const HAMMING_BITS: usize = 15;

/// Total transmitted bits per codeword.
pub const CODEWORD_BITS: usize = 16;

/// 1-indexed positions of the Hamming parity bits.
pub const PARITY_POSITIONS: [usize; 4] = [1, 2, 4, 8];

/// 1-indexed positions holding data bits, in input order.
pub const DATA_POSITIONS: [usize; DATA_BITS] = [3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

/// 1-indexed position of the overall parity bit.
pub const OVERALL_PARITY_POSITION: usize = 16;

/// Exactly 11 data bits.
pub type DataBlock = [Bit; DATA_BITS];

/// Exactly 16 transmitted bits.
pub type Codeword = [Bit; CODEWORD_BITS];

/// Outcome of inspecting a received codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Syndrome 0, overall parity even
    Clean,
    /// Syndrome 0, overall parity odd: only the overall parity bit flipped
    OverallParityError,
    /// Nonzero syndrome, overall parity odd: the bit at `position` was flipped back
    Corrected { position: usize },
    /// Nonzero syndrome, overall parity even: two flips, not repairable
    DoubleError { syndrome: u8 },
}

impl Verdict {
    /// True if the data bits can be trusted after decoding.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Verdict::DoubleError { .. })
    }
}

/// Classify a received codeword from its syndrome and overall parity.
///
/// | syndrome | overall parity | verdict              |
/// |----------|----------------|----------------------|
/// | 0        | even           | `Clean`              |
/// | 0        | odd            | `OverallParityError` |
/// | nonzero  | odd            | `Corrected`          |
/// | nonzero  | even           | `DoubleError`        |
pub fn classify(syndrome: u8, overall_parity: bool) -> Verdict {
    match (syndrome, overall_parity) {
        (0, false) => Verdict::Clean,
        (0, true) => Verdict::OverallParityError,
        (s, true) => Verdict::Corrected { position: s as usize },
        (s, false) => Verdict::DoubleError { syndrome: s },
    }
}

/// XOR of every position in 1..=15 whose number has `weight` set.
fn parity_check(codeword: &Codeword, weight: usize) -> Bit {
    (1..=HAMMING_BITS)
        .filter(|pos| pos & weight != 0)
        .fold(false, |acc, pos| acc ^ codeword[pos - 1])
}

/// Encode an 11-bit block into a 16-bit codeword.
pub fn encode(block: &DataBlock) -> Codeword {
    let mut codeword = [false; CODEWORD_BITS];

    for (&pos, &bit) in DATA_POSITIONS.iter().zip(block.iter()) {
        codeword[pos - 1] = bit;
    }

    // Parity slots are still zero here, so each check sums data bits only
    for weight in PARITY_POSITIONS {
        codeword[weight - 1] = parity_check(&codeword, weight);
    }

    codeword[OVERALL_PARITY_POSITION - 1] = codeword[..HAMMING_BITS].iter().fold(false, |acc, &b| acc ^ b);

    codeword
}

/// Compute the 4-bit syndrome of a received codeword.
///
/// Bit `k` of the result is the check for weight `2^k`; check@8 is the
/// most significant bit.
pub fn syndrome(codeword: &Codeword) -> u8 {
    PARITY_POSITIONS
        .iter()
        .enumerate()
        .fold(0u8, |acc, (k, &weight)| acc | ((parity_check(codeword, weight) as u8) << k))
}

/// Parity over all 16 bits. `false` means even.
pub fn overall_parity(codeword: &Codeword) -> Bit {
    codeword.iter().fold(false, |acc, &b| acc ^ b)
}

/// Pull the data bits out of a codeword.
pub fn extract(codeword: &Codeword) -> DataBlock {
    let mut block = [false; DATA_BITS];
    for (slot, &pos) in block.iter_mut().zip(DATA_POSITIONS.iter()) {
        *slot = codeword[pos - 1];
    }
    block
}

/// Decode a possibly corrupted codeword, reporting what was found.
///
/// # Errors
/// Returns `CodecError::DoubleErrorDetected` when the syndrome is nonzero
/// but overall parity is even.
pub fn decode_verbose(codeword: &Codeword) -> Result<(DataBlock, Verdict), CodecError> {
    let mut received = *codeword;
    let verdict = classify(syndrome(&received), overall_parity(&received));

    match verdict {
        Verdict::Clean | Verdict::OverallParityError => {}
        Verdict::Corrected { position } => {
            received[position - 1] = !received[position - 1];
        }
        Verdict::DoubleError { syndrome } => {
            return Err(CodecError::DoubleErrorDetected { syndrome });
        }
    }

    Ok((extract(&received), verdict))
}

/// Decode a possibly corrupted codeword into its data block.
///
/// # Errors
/// Returns `CodecError::DoubleErrorDetected` for uncorrectable codewords.
pub fn decode(codeword: &Codeword) -> Result<DataBlock, CodecError> {
    decode_verbose(codeword).map(|(block, _)| block)
}

/// Build a data block from the low 11 bits of `value`, MSB first.
pub fn block_from_u16(value: u16) -> DataBlock {
    let mut block = [false; DATA_BITS];
    for (i, slot) in block.iter_mut().enumerate() {
        *slot = (value >> (DATA_BITS - 1 - i)) & 1 == 1;
    }
    block
}

/// A double flip that was not reported as `DoubleErrorDetected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleFlipEvasion {
    pub block: DataBlock,
    /// 1-indexed flipped positions, `first < second`
    pub positions: (usize, usize),
    /// What the decoder returned instead
    pub decoded: DataBlock,
}

/// Results of flipping every pair of distinct positions in 1..=15 for every
/// possible data block.
#[derive(Debug, Clone, Default)]
pub struct DoubleFlipSurvey {
    /// Patterns tried (2^11 * C(15, 2))
    pub patterns: usize,
    /// Patterns reported as `DoubleErrorDetected`
    pub detected: usize,
    /// Patterns that decoded to some block instead
    pub evasions: Vec<DoubleFlipEvasion>,
}

/// Enumerate all two-position flips over all blocks and record which evade
/// detection.
pub fn survey_double_flips() -> DoubleFlipSurvey {
    let mut survey = DoubleFlipSurvey::default();

    for value in 0..(1u16 << DATA_BITS) {
        let block = block_from_u16(value);
        let clean = encode(&block);

        for first in 1..=HAMMING_BITS {
            for second in (first + 1)..=HAMMING_BITS {
                let mut corrupted = clean;
                corrupted[first - 1] = !corrupted[first - 1];
                corrupted[second - 1] = !corrupted[second - 1];

                survey.patterns += 1;
                match decode(&corrupted) {
                    Err(CodecError::DoubleErrorDetected { .. }) => survey.detected += 1,
                    Ok(decoded) => survey.evasions.push(DoubleFlipEvasion {
                        block,
                        positions: (first, second),
                        decoded,
                    }),
                }
            }
        }
    }

    survey
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::to_bits;

    fn flip(mut codeword: Codeword, pos: usize) -> Codeword {
        codeword[pos - 1] = !codeword[pos - 1];
        codeword
    }

    fn block(text: &str) -> DataBlock {
        to_bits(text).try_into().unwrap()
    }

    #[test]
    fn test_layout_places_data_in_order() {
        let data = block("10000000001");
        let cw = encode(&data);

        // First data bit at position 3, last at position 15
        assert!(cw[2]);
        assert!(cw[14]);
        assert_eq!(extract(&cw), data);
    }

    #[test]
    fn test_known_codeword() {
        // d0 = 1 sits at position 3, covered by p1 and p2
        let cw = encode(&block("10000000000"));
        let expected: Vec<bool> = to_bits("1110000000000001");
        assert_eq!(cw.to_vec(), expected);
    }

    #[test]
    fn test_encoded_codeword_is_consistent() {
        for value in [0u16, 1, 0x2AA, 0x555, 0x7FF] {
            let cw = encode(&block_from_u16(value));
            assert_eq!(syndrome(&cw), 0);
            assert!(!overall_parity(&cw));
        }
    }

    #[test]
    fn test_all_blocks_round_trip() {
        for value in 0..(1u16 << DATA_BITS) {
            let data = block_from_u16(value);
            let (decoded, verdict) = decode_verbose(&encode(&data)).unwrap();
            assert_eq!(decoded, data);
            assert_eq!(verdict, Verdict::Clean);
        }
    }

    #[test]
    fn test_every_single_flip_is_corrected() {
        for value in 0..(1u16 << DATA_BITS) {
            let data = block_from_u16(value);
            let cw = encode(&data);
            for pos in 1..=HAMMING_BITS {
                let (decoded, verdict) = decode_verbose(&flip(cw, pos)).unwrap();
                assert_eq!(decoded, data, "block {value:#05x}, flip at {pos}");
                assert_eq!(verdict, Verdict::Corrected { position: pos });
            }
        }
    }

    #[test]
    fn test_overall_parity_flip_leaves_data_alone() {
        let data = block("11011010110");
        let (decoded, verdict) = decode_verbose(&flip(encode(&data), OVERALL_PARITY_POSITION)).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(verdict, Verdict::OverallParityError);
    }

    #[test]
    fn test_flip_at_position_five_of_zero_block() {
        let zero = [false; DATA_BITS];
        assert_eq!(decode(&flip(encode(&zero), 5)).unwrap(), zero);
    }

    #[test]
    fn test_flips_at_three_and_nine_are_detected() {
        let data = block("10110011100");
        let corrupted = flip(flip(encode(&data), 3), 9);

        assert_eq!(syndrome(&corrupted), 3 ^ 9);
        assert!(!overall_parity(&corrupted));
        assert_eq!(
            decode(&corrupted),
            Err(CodecError::DoubleErrorDetected { syndrome: 3 ^ 9 })
        );
    }

    #[test]
    fn test_double_flip_survey() {
        let survey = survey_double_flips();

        assert_eq!(survey.patterns, 2048 * 105);
        assert_eq!(survey.detected + survey.evasions.len(), survey.patterns);

        // Recorded result: with distance 4, no pair of distinct flips in
        // positions 1..=15 escapes detection.
        assert!(
            survey.evasions.is_empty(),
            "double flips evading detection: {:?}",
            &survey.evasions[..survey.evasions.len().min(10)]
        );
    }

    #[test]
    fn test_flip_with_overall_parity_is_detected() {
        // One Hamming bit plus the overall parity bit: syndrome nonzero, parity even
        let cw = flip(flip(encode(&block("01010101010")), 7), OVERALL_PARITY_POSITION);
        assert!(matches!(decode(&cw), Err(CodecError::DoubleErrorDetected { syndrome: 7 })));
    }

    #[test]
    fn test_classify_table() {
        assert_eq!(classify(0, false), Verdict::Clean);
        assert_eq!(classify(0, true), Verdict::OverallParityError);
        assert_eq!(classify(12, true), Verdict::Corrected { position: 12 });
        assert_eq!(classify(12, false), Verdict::DoubleError { syndrome: 12 });
        assert!(!classify(1, false).is_recoverable());
        assert!(classify(1, true).is_recoverable());
    }

    #[test]
    fn test_block_from_u16_is_msb_first() {
        assert_eq!(block_from_u16(0b100_0000_0001), block("10000000001"));
        assert_eq!(block_from_u16(0), [false; DATA_BITS]);
    }
}
