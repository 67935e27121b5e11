//! Request pipeline: text → bits → blocks → (encode, corrupt, decode) →
//! bits → text → relay.
//!
//! # Stages
//!
//! 1. Parse the request body into a [`Segment`] (`MalformedInput` on failure)
//! 2. Roll for whole-request loss (`SimulatedLoss`)
//! 3. Split the payload into 11-bit blocks
//! 4. For each block in order: encode, pass through the channel, decode
//!    (`Uncorrectable` on the first double error; nothing is delivered)
//! 5. Reassemble, apply the [`PaddingPolicy`], write the payload back
//! 6. Dispatch the corrected segment to the relay without waiting
//!
//! All work for one request runs on the caller's thread. Requests share no
//! mutable state other than the atomic [`Metrics`].

use crate::bits::{to_bits, to_text};
use crate::channel::{ChannelConfig, ChannelEvent, ChannelSimulator, LossModel};
use crate::error::{CodecError, Error, Result};
use crate::hamming::{self, Codeword, DataBlock, Verdict};
use crate::metrics::Metrics;
use crate::relay::RelayDispatcher;
use crate::segment::Segment;
use crate::segmenter::{reassemble, reassemble_to, split};
use rand::Rng;
use std::sync::Arc;

/// Source of per-codeword noise.
pub trait Channel: Send + Sync {
    /// Possibly corrupt `codeword` in place and report what happened.
    fn corrupt<R: Rng + ?Sized>(&self, codeword: &mut Codeword, rng: &mut R) -> ChannelEvent;
}

impl Channel for ChannelSimulator {
    fn corrupt<R: Rng + ?Sized>(&self, codeword: &mut Codeword, rng: &mut R) -> ChannelEvent {
        ChannelSimulator::corrupt(self, codeword, rng)
    }
}

/// What to do with the zero padding added to the last block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingPolicy {
    /// Cut the corrected payload back to the input length
    #[default]
    Truncate,
    /// Keep the trailing zeros, payload length rounds up to a multiple of 11
    Preserve,
}

/// Tunable parts of the pipeline. Block size and parity layout are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    pub channel: ChannelConfig,
    pub loss: LossModel,
    pub padding: PaddingPolicy,
}

impl PipelineConfig {
    /// No noise, no loss.
    pub fn perfect() -> Self {
        Self {
            channel: ChannelConfig::perfect(),
            loss: LossModel::none(),
            padding: PaddingPolicy::Truncate,
        }
    }
}

/// Encodes, corrupts and repairs segment payloads.
pub struct RelayPipeline<C = ChannelSimulator> {
    channel: C,
    loss: LossModel,
    padding: PaddingPolicy,
    metrics: Arc<Metrics>,
}

impl RelayPipeline<ChannelSimulator> {
    pub fn new(config: PipelineConfig, metrics: Arc<Metrics>) -> Self {
        Self::with_channel(ChannelSimulator::new(config.channel), config.loss, config.padding, metrics)
    }
}

impl<C: Channel> RelayPipeline<C> {
    /// Build a pipeline around a custom channel.
    pub fn with_channel(channel: C, loss: LossModel, padding: PaddingPolicy, metrics: Arc<Metrics>) -> Self {
        Self {
            channel,
            loss,
            padding,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run one segment through the simulated link.
    ///
    /// # Returns
    /// The same segment with its payload replaced by the corrected bit-string.
    ///
    /// # Errors
    /// - `Error::SimulatedLoss` if the request was dropped
    /// - `Error::Uncorrectable` if any block carried a double error
    pub fn process<R: Rng + ?Sized>(&self, mut segment: Segment, rng: &mut R) -> Result<Segment> {
        let bits = to_bits(&segment.segment);

        if self.loss.is_lost(rng) {
            return Err(Error::SimulatedLoss);
        }

        let blocks = split(&bits);
        let mut decoded = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            decoded.push(self.transmit_block(index, block, rng)?);
        }

        let corrected = match self.padding {
            PaddingPolicy::Truncate => reassemble_to(&decoded, bits.len()),
            PaddingPolicy::Preserve => reassemble(&decoded),
        };
        segment.segment = to_text(&corrected);

        Ok(segment)
    }

    /// Parse a request body and run it through [`process`](Self::process).
    ///
    /// # Errors
    /// `Error::MalformedInput` before any codec work, otherwise as `process`.
    pub fn process_json<R: Rng + ?Sized>(&self, body: &[u8], rng: &mut R) -> Result<Segment> {
        let segment = Segment::from_json(body)?;
        self.process(segment, rng)
    }

    /// Encode one block, send it through the channel and decode it.
    fn transmit_block<R: Rng + ?Sized>(&self, index: usize, block: &DataBlock, rng: &mut R) -> Result<DataBlock> {
        let mut codeword = hamming::encode(block);
        let event = self.channel.corrupt(&mut codeword, rng);
        self.metrics.record_channel(event);

        match hamming::decode_verbose(&codeword) {
            Ok((data, verdict)) => {
                self.metrics.record_verdict(verdict);
                if let Verdict::Corrected { position } = verdict {
                    log::debug!("block {index}: corrected bit at position {position}");
                }
                Ok(data)
            }
            Err(source) => {
                let CodecError::DoubleErrorDetected { syndrome } = source;
                self.metrics.record_verdict(Verdict::DoubleError { syndrome });
                log::warn!("block {index}: {source}");
                Err(Error::Uncorrectable { block: index, source })
            }
        }
    }
}

/// Pipeline plus relay handoff: the complete per-request lifecycle.
pub struct RelayService<C = ChannelSimulator> {
    pipeline: RelayPipeline<C>,
    dispatcher: RelayDispatcher,
}

impl<C: Channel> RelayService<C> {
    pub fn new(pipeline: RelayPipeline<C>, dispatcher: RelayDispatcher) -> Self {
        Self { pipeline, dispatcher }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        self.pipeline.metrics()
    }

    /// Handle one inbound request body.
    ///
    /// On success the corrected segment has been handed to the relay in the
    /// background and the caller can acknowledge immediately. Relay failures
    /// never surface here.
    ///
    /// # Errors
    /// `MalformedInput`, `SimulatedLoss` or `Uncorrectable`; all terminal.
    pub fn handle<R: Rng + ?Sized>(&self, body: &[u8], rng: &mut R) -> Result<()> {
        let metrics = self.pipeline.metrics();
        metrics.record_request();

        match self.pipeline.process_json(body, rng) {
            Ok(segment) => {
                metrics.record_completed();
                self.dispatcher.dispatch(segment);
                Ok(())
            }
            Err(e) => {
                match &e {
                    Error::MalformedInput(reason) => {
                        metrics.record_malformed();
                        log::info!("rejected malformed request: {reason}");
                    }
                    Error::SimulatedLoss => {
                        metrics.record_lost();
                        log::info!("packet lost");
                    }
                    Error::Uncorrectable { .. } => metrics.record_uncorrectable(),
                    Error::Relay(_) => {}
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::flip;
    use crate::error::RelayError;
    use crate::relay::{InlineSpawner, Relay};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Applies a fixed list of flips per block, in order.
    struct ScriptedChannel {
        script: Mutex<VecDeque<Vec<usize>>>,
    }

    impl ScriptedChannel {
        fn new(script: Vec<Vec<usize>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl Channel for ScriptedChannel {
        fn corrupt<R: Rng + ?Sized>(&self, codeword: &mut Codeword, _rng: &mut R) -> ChannelEvent {
            let flips = self.script.lock().unwrap().pop_front().unwrap_or_default();
            for &pos in &flips {
                flip(codeword, pos);
            }
            match flips.as_slice() {
                [] => ChannelEvent::Clean,
                [position] => ChannelEvent::Single { position: *position },
                [first, second, ..] => ChannelEvent::Double {
                    first: *first,
                    second: *second,
                },
            }
        }
    }

    #[derive(Default)]
    struct RecordingRelay {
        received: Mutex<Vec<Segment>>,
    }

    impl Relay for RecordingRelay {
        fn deliver(&self, segment: &Segment) -> std::result::Result<(), RelayError> {
            self.received.lock().unwrap().push(segment.clone());
            Ok(())
        }
    }

    fn scripted(script: Vec<Vec<usize>>) -> RelayPipeline<ScriptedChannel> {
        RelayPipeline::with_channel(
            ScriptedChannel::new(script),
            LossModel::none(),
            PaddingPolicy::Truncate,
            Arc::new(Metrics::new()),
        )
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_clean_short_payload() {
        let pipeline = RelayPipeline::new(PipelineConfig::perfect(), Arc::new(Metrics::new()));
        let out = pipeline.process(Segment::new("101"), &mut rng()).unwrap();
        assert_eq!(out.segment, "101");
    }

    #[test]
    fn test_preserve_padding_appends_zeros() {
        let config = PipelineConfig {
            padding: PaddingPolicy::Preserve,
            ..PipelineConfig::perfect()
        };
        let pipeline = RelayPipeline::new(config, Arc::new(Metrics::new()));
        let out = pipeline.process(Segment::new("101"), &mut rng()).unwrap();
        assert_eq!(out.segment, "10100000000");
    }

    #[test]
    fn test_single_flip_per_block_is_repaired() {
        let payload = "1011001110001011101001011";
        let pipeline = scripted(vec![vec![5], vec![1], vec![15]]);
        let out = pipeline.process(Segment::new(payload), &mut rng()).unwrap();

        assert_eq!(out.segment, payload);
        let snap = pipeline.metrics().snapshot();
        assert_eq!(snap.blocks_processed, 3);
        assert_eq!(snap.errors_corrected, 3);
    }

    #[test]
    fn test_double_flip_aborts_request() {
        let pipeline = scripted(vec![vec![], vec![3, 9], vec![]]);
        let err = pipeline.process(Segment::new("0".repeat(33)), &mut rng()).unwrap_err();

        assert!(matches!(
            err,
            Error::Uncorrectable {
                block: 1,
                source: CodecError::DoubleErrorDetected { syndrome: 10 }
            }
        ));
        // Third block never reached the channel
        assert_eq!(pipeline.metrics().snapshot().blocks_processed, 2);
    }

    #[test]
    fn test_loss_aborts_before_codec() {
        let config = PipelineConfig {
            loss: LossModel::new(1.0),
            ..PipelineConfig::perfect()
        };
        let pipeline = RelayPipeline::new(config, Arc::new(Metrics::new()));
        let err = pipeline.process(Segment::new("1111"), &mut rng()).unwrap_err();

        assert!(matches!(err, Error::SimulatedLoss));
        assert_eq!(pipeline.metrics().snapshot().blocks_processed, 0);
    }

    #[test]
    fn test_metadata_passes_through() {
        let pipeline = RelayPipeline::new(PipelineConfig::perfect(), Arc::new(Metrics::new()));
        let body = br#"{"segment":"0110","segment_number":7,"send_time":"t0","total_segments":9,"username":"carol"}"#;
        let out = pipeline.process_json(body, &mut rng()).unwrap();

        assert_eq!(out.segment, "0110");
        assert_eq!(out.segment_number, 7);
        assert_eq!(out.send_time, "t0");
        assert_eq!(out.total_segments, 9);
        assert_eq!(out.user_id, "carol");
    }

    #[test]
    fn test_non_binary_characters_degrade_to_zero() {
        let pipeline = RelayPipeline::new(PipelineConfig::perfect(), Arc::new(Metrics::new()));
        let out = pipeline.process(Segment::new("1a1"), &mut rng()).unwrap();
        assert_eq!(out.segment, "101");
    }

    #[test]
    fn test_empty_payload() {
        let pipeline = RelayPipeline::new(PipelineConfig::perfect(), Arc::new(Metrics::new()));
        let out = pipeline.process(Segment::new(""), &mut rng()).unwrap();
        assert_eq!(out.segment, "");
    }

    #[test]
    fn test_service_outcomes() {
        let metrics = Arc::new(Metrics::new());
        let relay = Arc::new(RecordingRelay::default());
        let dispatcher = RelayDispatcher::new(relay.clone(), Arc::new(InlineSpawner), metrics.clone());
        let service = RelayService::new(RelayPipeline::new(PipelineConfig::perfect(), metrics.clone()), dispatcher);
        let mut rng = rng();

        service.handle(br#"{"segment":"101"}"#, &mut rng).unwrap();
        assert!(matches!(service.handle(b"{", &mut rng), Err(Error::MalformedInput(_))));

        let received = relay.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].segment, "101");

        let snap = metrics.snapshot();
        assert_eq!(snap.requests_received, 2);
        assert_eq!(snap.requests_completed, 1);
        assert_eq!(snap.requests_malformed, 1);
        assert_eq!(snap.relay_delivered, 1);
    }

    #[test]
    fn test_service_does_not_relay_failures() {
        let metrics = Arc::new(Metrics::new());
        let relay = Arc::new(RecordingRelay::default());
        let dispatcher = RelayDispatcher::new(relay.clone(), Arc::new(InlineSpawner), metrics.clone());
        let pipeline = RelayPipeline::with_channel(
            ScriptedChannel::new(vec![vec![2, 6]]),
            LossModel::none(),
            PaddingPolicy::Truncate,
            metrics.clone(),
        );
        let service = RelayService::new(pipeline, dispatcher);

        let err = service.handle(br#"{"segment":"11111111111"}"#, &mut rng()).unwrap_err();
        assert!(matches!(err, Error::Uncorrectable { block: 0, .. }));
        assert!(relay.received.lock().unwrap().is_empty());
        assert_eq!(metrics.snapshot().requests_uncorrectable, 1);
        assert_eq!(metrics.snapshot().double_errors_detected, 1);
    }
}
