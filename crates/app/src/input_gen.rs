//! Segment generation for offline simulation runs.
//!
//! When `--simulate` is given, we generate a message split into segments
//! with varied payload shapes, so the channel statistics are visible in
//! the metrics without any HTTP client.
//!
//! # Design
//!
//! Generated payloads have:
//! - Some constant runs (all ones or all zeros)
//! - Some alternating patterns
//! - Some random bit-strings
//!
//! Lengths vary from 1 to 200 bits, so most segments end in a padded block.

use hamming_relay_core::Segment;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Owner identifiers cycled through generated segments.
const USERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Maximum payload length in bits.
const MAX_BITS: usize = 200;

/// Generate `count` segments of one message.
///
/// # Arguments
/// - `seed`: random seed for determinism
/// - `count`: number of segments; also used as `total_segments`
pub fn generate_segments(seed: u64, count: usize) -> Vec<Segment> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let user = USERS[rng.gen_range(0..USERS.len())];

    (0..count)
        .map(|n| Segment {
            segment: generate_payload(&mut rng),
            segment_number: n as i64,
            send_time: format!("T+{}ms", n * 10),
            total_segments: count as i64,
            user_id: user.to_string(),
        })
        .collect()
}

/// Generate one bit-string payload.
fn generate_payload(rng: &mut ChaCha8Rng) -> String {
    let len = rng.gen_range(1..=MAX_BITS);
    let kind: u8 = rng.gen_range(0..10);

    match kind {
        // 20% constant runs
        0..=1 => {
            let c = if rng.gen::<bool>() { '1' } else { '0' };
            std::iter::repeat(c).take(len).collect()
        }

        // 20% alternating
        2..=3 => (0..len).map(|i| if i % 2 == 0 { '1' } else { '0' }).collect(),

        // 60% random
        _ => (0..len).map(|_| if rng.gen::<bool>() { '1' } else { '0' }).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_segments() {
        let segments = generate_segments(42, 25);
        assert_eq!(segments.len(), 25);

        for (n, seg) in segments.iter().enumerate() {
            assert_eq!(seg.segment_number, n as i64);
            assert_eq!(seg.total_segments, 25);
            assert!((1..=MAX_BITS).contains(&seg.bit_len()));
            assert!(seg.segment.chars().all(|c| c == '0' || c == '1'));
        }
    }

    #[test]
    fn test_determinism() {
        assert_eq!(generate_segments(12345, 50), generate_segments(12345, 50));
    }

    #[test]
    fn test_different_seeds() {
        assert_ne!(generate_segments(1, 20), generate_segments(2, 20));
    }

    #[test]
    fn test_zero_count() {
        assert!(generate_segments(999, 0).is_empty());
    }
}
