//! Splitting bit sequences into fixed-size data blocks and back.
//!
//! The codec works on blocks of exactly [`DATA_BITS`] bits. `split` walks
//! the input in strides of 11 and zero-pads the final block on the right;
//! `reassemble` concatenates blocks in order and keeps that padding.
//!
//! # Padding Rules
//! - `split`: last block is right-padded with zeros to 11 bits
//! - `reassemble`: output length is always `11 * blocks.len()`
//! - `reassemble_to`: same, then truncated to a length the caller tracked

use crate::bits::Bit;
use crate::hamming::{DataBlock, DATA_BITS};

/// Number of blocks needed to carry `bit_len` bits.
pub fn block_count(bit_len: usize) -> usize {
    bit_len.div_ceil(DATA_BITS)
}

/// Partition `bits` into zero-padded data blocks, earliest bits first.
///
/// An empty input yields no blocks.
pub fn split(bits: &[Bit]) -> Vec<DataBlock> {
    bits.chunks(DATA_BITS)
        .map(|chunk| {
            let mut block = [false; DATA_BITS];
            block[..chunk.len()].copy_from_slice(chunk);
            block
        })
        .collect()
}

/// Concatenate decoded blocks into one flat sequence, padding included.
pub fn reassemble(blocks: &[DataBlock]) -> Vec<Bit> {
    blocks.iter().flatten().copied().collect()
}

/// Concatenate decoded blocks and drop padding beyond `original_len` bits.
///
/// If `original_len` exceeds the reassembled length, nothing is dropped.
pub fn reassemble_to(blocks: &[DataBlock], original_len: usize) -> Vec<Bit> {
    let mut bits = reassemble(blocks);
    bits.truncate(original_len);
    bits
}
