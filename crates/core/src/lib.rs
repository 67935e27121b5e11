//! hamming-relay-core: Hamming-coded transmission over a simulated noisy link
//!
//! This library provides the core components of a relay that:
//! - Converts a textual bit-string payload into bits
//! - Splits the bits into 11-bit blocks and encodes each as a 16-bit
//!   extended Hamming codeword
//! - Simulates channel noise (random bit flips) and whole-request loss
//! - Decodes each codeword, correcting single errors and rejecting doubles
//! - Hands the repaired payload to a downstream relay in the background
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bits`: Text ↔ bit conversion
//! - `segmenter`: Fixed-size blocking and reassembly
//! - `hamming`: SECDED Hamming(15,11) codec
//! - `channel`: Noise and loss simulation with caller-supplied randomness
//! - `segment`: The request/relay data model
//! - `pipeline`: Per-request orchestration
//! - `relay`: Fire-and-forget handoff to the downstream target
//! - `metrics`: Observable system behavior
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Deterministic**: Randomness is passed in, so seeded runs are reproducible
//! - **No shared mutable state**: Requests only share atomic counters
//! - **Observable**: Every channel event and decoder verdict is counted

pub mod bits;
pub mod channel;
pub mod error;
pub mod hamming;
pub mod metrics;
pub mod pipeline;
pub mod relay;
pub mod segment;
pub mod segmenter;

// Re-export commonly used types
pub use error::{CodecError, Error, RelayError, Result};
pub use pipeline::{PaddingPolicy, PipelineConfig, RelayPipeline, RelayService};
pub use segment::Segment;
