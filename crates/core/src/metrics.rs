//! Metrics collection and reporting for the relay.
//!
//! This module provides observable insights into system behavior:
//! - Request outcomes (accepted, malformed, lost, uncorrectable)
//! - Channel events (single and double flips injected)
//! - Decoder verdicts per block
//! - Relay handoff results from the background tasks
//!
//! # Thread Safety
//!
//! Counters are atomics, so one `Arc<Metrics>` is shared by every request
//! thread and every relay task without locking. Reads go through
//! [`Metrics::snapshot`], which is not a consistent cut across counters.

use crate::channel::ChannelEvent;
use crate::hamming::Verdict;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters shared across threads.
#[derive(Debug)]
pub struct Metrics {
    start_time: Instant,

    // === Requests ===
    requests_received: AtomicU64,
    requests_malformed: AtomicU64,
    requests_lost: AtomicU64,
    requests_uncorrectable: AtomicU64,
    requests_completed: AtomicU64,

    // === Channel ===
    blocks_processed: AtomicU64,
    single_errors_injected: AtomicU64,
    double_errors_injected: AtomicU64,

    // === Decoder ===
    blocks_clean: AtomicU64,
    overall_parity_errors: AtomicU64,
    errors_corrected: AtomicU64,
    double_errors_detected: AtomicU64,

    // === Relay ===
    relay_delivered: AtomicU64,
    relay_failed: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests_received: AtomicU64::new(0),
            requests_malformed: AtomicU64::new(0),
            requests_lost: AtomicU64::new(0),
            requests_uncorrectable: AtomicU64::new(0),
            requests_completed: AtomicU64::new(0),
            blocks_processed: AtomicU64::new(0),
            single_errors_injected: AtomicU64::new(0),
            double_errors_injected: AtomicU64::new(0),
            blocks_clean: AtomicU64::new(0),
            overall_parity_errors: AtomicU64::new(0),
            errors_corrected: AtomicU64::new(0),
            double_errors_detected: AtomicU64::new(0),
            relay_delivered: AtomicU64::new(0),
            relay_failed: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) {
        bump(&self.requests_received);
    }

    pub fn record_malformed(&self) {
        bump(&self.requests_malformed);
    }

    pub fn record_lost(&self) {
        bump(&self.requests_lost);
    }

    pub fn record_uncorrectable(&self) {
        bump(&self.requests_uncorrectable);
    }

    pub fn record_completed(&self) {
        bump(&self.requests_completed);
    }

    /// Record what the channel did to one block.
    pub fn record_channel(&self, event: ChannelEvent) {
        bump(&self.blocks_processed);
        match event {
            ChannelEvent::Clean => {}
            ChannelEvent::Single { .. } => bump(&self.single_errors_injected),
            ChannelEvent::Double { .. } => bump(&self.double_errors_injected),
        }
    }

    /// Record the decoder's classification of one block.
    pub fn record_verdict(&self, verdict: Verdict) {
        match verdict {
            Verdict::Clean => bump(&self.blocks_clean),
            Verdict::OverallParityError => bump(&self.overall_parity_errors),
            Verdict::Corrected { .. } => bump(&self.errors_corrected),
            Verdict::DoubleError { .. } => bump(&self.double_errors_detected),
        }
    }

    pub fn record_relay_delivered(&self) {
        bump(&self.relay_delivered);
    }

    pub fn record_relay_failed(&self) {
        bump(&self.relay_failed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            requests_received: get(&self.requests_received),
            requests_malformed: get(&self.requests_malformed),
            requests_lost: get(&self.requests_lost),
            requests_uncorrectable: get(&self.requests_uncorrectable),
            requests_completed: get(&self.requests_completed),
            blocks_processed: get(&self.blocks_processed),
            single_errors_injected: get(&self.single_errors_injected),
            double_errors_injected: get(&self.double_errors_injected),
            blocks_clean: get(&self.blocks_clean),
            overall_parity_errors: get(&self.overall_parity_errors),
            errors_corrected: get(&self.errors_corrected),
            double_errors_detected: get(&self.double_errors_detected),
            relay_delivered: get(&self.relay_delivered),
            relay_failed: get(&self.relay_failed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub requests_received: u64,
    pub requests_malformed: u64,
    pub requests_lost: u64,
    pub requests_uncorrectable: u64,
    pub requests_completed: u64,
    pub blocks_processed: u64,
    pub single_errors_injected: u64,
    pub double_errors_injected: u64,
    pub blocks_clean: u64,
    pub overall_parity_errors: u64,
    pub errors_corrected: u64,
    pub double_errors_detected: u64,
    pub relay_delivered: u64,
    pub relay_failed: u64,
}

impl MetricsSnapshot {
    /// Compute request loss rate (lost / received).
    pub fn loss_rate(&self) -> f64 {
        ratio(self.requests_lost, self.requests_received)
    }

    /// Fraction of blocks hit by an error event.
    pub fn block_error_rate(&self) -> f64 {
        ratio(
            self.single_errors_injected + self.double_errors_injected,
            self.blocks_processed,
        )
    }

    /// Fraction of received requests that reached the relay stage.
    pub fn completion_rate(&self) -> f64 {
        ratio(self.requests_completed, self.requests_received)
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Relay Summary ===");
        println!("Uptime: {} ms", self.uptime.as_millis());
        println!();

        println!("=== Requests ===");
        println!("Received: {}", self.requests_received);
        println!("Completed: {} ({:.2}%)", self.requests_completed, self.completion_rate() * 100.0);
        println!("Malformed: {}", self.requests_malformed);
        println!("Lost: {} ({:.2}%)", self.requests_lost, self.loss_rate() * 100.0);
        println!("Uncorrectable: {}", self.requests_uncorrectable);
        println!();

        println!("=== Channel ===");
        println!("Blocks: {}", self.blocks_processed);
        println!("Single flips injected: {}", self.single_errors_injected);
        println!("Double flips injected: {}", self.double_errors_injected);
        println!("Block error rate: {:.2}%", self.block_error_rate() * 100.0);
        println!();

        println!("=== Decoder ===");
        println!("Clean: {}", self.blocks_clean);
        println!("Corrected: {}", self.errors_corrected);
        println!("Overall parity only: {}", self.overall_parity_errors);
        println!("Double errors detected: {}", self.double_errors_detected);
        println!();

        println!("=== Relay ===");
        println!("Delivered: {}", self.relay_delivered);
        println!("Failed: {}", self.relay_failed);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "uptime_ms={}\n\
             requests_received={}\n\
             requests_completed={}\n\
             requests_malformed={}\n\
             requests_lost={}\n\
             requests_uncorrectable={}\n\
             loss_rate={:.4}\n\
             blocks_processed={}\n\
             single_errors_injected={}\n\
             double_errors_injected={}\n\
             block_error_rate={:.4}\n\
             blocks_clean={}\n\
             errors_corrected={}\n\
             overall_parity_errors={}\n\
             double_errors_detected={}\n\
             relay_delivered={}\n\
             relay_failed={}\n",
            self.uptime.as_millis(),
            self.requests_received,
            self.requests_completed,
            self.requests_malformed,
            self.requests_lost,
            self.requests_uncorrectable,
            self.loss_rate(),
            self.blocks_processed,
            self.single_errors_injected,
            self.double_errors_injected,
            self.block_error_rate(),
            self.blocks_clean,
            self.errors_corrected,
            self.overall_parity_errors,
            self.double_errors_detected,
            self.relay_delivered,
            self.relay_failed,
        )
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
