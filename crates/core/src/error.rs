//! Error types for the hamming-relay system.
//!
//! All operations return structured errors rather than panicking.
//! Every failure a caller can observe maps onto exactly one variant, so the
//! transport layer can turn it into a distinct status and message.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Malformed input: request body is not a valid segment
/// - Simulated loss: the whole request was dropped by the channel
/// - Uncorrectable: some block carried a double-bit error
/// - Relay: the downstream handoff failed (background task only)
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be decoded into a segment
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The simulated channel lost the whole request
    #[error("packet lost")]
    SimulatedLoss,

    /// A block could not be repaired; nothing is delivered for the request
    #[error("block {block}: {source}")]
    Uncorrectable {
        block: usize,
        #[source]
        source: CodecError,
    },

    /// Downstream relay handoff failed
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
}

/// Hamming codec errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Nonzero syndrome with even overall parity: two bits flipped
    #[error("two errors detected (syndrome {syndrome:#06b})")]
    DoubleErrorDetected { syndrome: u8 },
}

/// Relay handoff errors.
///
/// These never reach the original caller; the dispatcher records them.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay target could not be reached at all
    #[error("relay unreachable: {0}")]
    Unreachable(String),

    /// The relay target answered with a non-success status
    #[error("relay rejected segment with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
