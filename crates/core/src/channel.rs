//! Noisy channel simulation: per-codeword bit flips and whole-request loss.
//!
//! # Simulated Effects
//!
//! - **Noise**: with probability `error_rate` a codeword suffers an error
//!   event. An event flips one bit, or two bits with probability
//!   `double_error_rate`. Targets are drawn uniformly from positions
//!   1..=15; the overall parity bit (position 16) is never hit.
//! - **Loss**: with probability `loss_rate` a whole request is dropped.
//!
//! The two positions of a double event are drawn independently and may
//! coincide, in which case the flips cancel and the codeword is unchanged.
//!
//! # Determinism
//!
//! The simulator holds no random state. Callers pass any [`rand::Rng`], so
//! a seeded generator makes every run reproducible.

use crate::hamming::{Codeword, HAMMING_BITS};
use rand::Rng;

/// Reference probability that a codeword suffers an error event.
pub const DEFAULT_ERROR_RATE: f64 = 0.07;

/// Reference probability that an error event flips two bits instead of one.
pub const DEFAULT_DOUBLE_ERROR_RATE: f64 = 0.05;

/// Reference probability that a whole request is lost.
pub const DEFAULT_LOSS_RATE: f64 = 0.01;

/// Configuration for per-codeword noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Probability of an error event per codeword [0.0, 1.0]
    pub error_rate: f64,

    /// Probability that an error event is a double flip [0.0, 1.0]
    pub double_error_rate: f64,
}

impl ChannelConfig {
    /// A channel that never corrupts anything.
    pub fn perfect() -> Self {
        Self {
            error_rate: 0.0,
            double_error_rate: 0.0,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            error_rate: DEFAULT_ERROR_RATE,
            double_error_rate: DEFAULT_DOUBLE_ERROR_RATE,
        }
    }
}

/// What the channel did to one codeword. Positions are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Clean,
    Single { position: usize },
    /// `first == second` is possible and leaves the codeword unchanged
    Double { first: usize, second: usize },
}

impl ChannelEvent {
    /// Number of bits that actually differ from the input.
    pub fn net_flips(&self) -> usize {
        match *self {
            ChannelEvent::Clean => 0,
            ChannelEvent::Single { .. } => 1,
            ChannelEvent::Double { first, second } if first == second => 0,
            ChannelEvent::Double { .. } => 2,
        }
    }
}

/// Injects random bit flips into codewords.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSimulator {
    config: ChannelConfig,
}

impl ChannelSimulator {
    /// Create a channel simulator with the given configuration.
    pub fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ChannelConfig {
        self.config
    }

    /// Possibly flip one or two bits of `codeword` in place.
    ///
    /// # Returns
    /// The event that was applied, for logging and metrics.
    pub fn corrupt<R: Rng + ?Sized>(&self, codeword: &mut Codeword, rng: &mut R) -> ChannelEvent {
        if rng.gen::<f64>() >= self.config.error_rate {
            return ChannelEvent::Clean;
        }

        if rng.gen::<f64>() >= self.config.double_error_rate {
            let position = rng.gen_range(1..=HAMMING_BITS);
            flip(codeword, position);
            ChannelEvent::Single { position }
        } else {
            let first = rng.gen_range(1..=HAMMING_BITS);
            let second = rng.gen_range(1..=HAMMING_BITS);
            flip(codeword, first);
            flip(codeword, second);
            log::debug!("channel injected double error at positions {first} and {second}");
            ChannelEvent::Double { first, second }
        }
    }
}

/// Flip the bit at a 1-indexed position.
pub fn flip(codeword: &mut Codeword, position: usize) {
    codeword[position - 1] = !codeword[position - 1];
}

/// Whole-request loss (Bernoulli per request).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossModel {
    /// Probability of dropping a request [0.0, 1.0]
    pub loss_rate: f64,
}

impl LossModel {
    pub fn new(loss_rate: f64) -> Self {
        Self { loss_rate }
    }

    /// A model that never drops.
    pub fn none() -> Self {
        Self { loss_rate: 0.0 }
    }

    /// Roll for loss of one request.
    pub fn is_lost<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.loss_rate
    }
}

impl Default for LossModel {
    fn default() -> Self {
        Self::new(DEFAULT_LOSS_RATE)
    }
}
