//! Fire-and-forget handoff of corrected segments to the downstream relay.
//!
//! The caller's response never waits on the relay. [`RelayDispatcher`]
//! hands each segment to a [`Spawn`] implementation and returns at once;
//! the background task calls [`Relay::deliver`] and records the outcome in
//! the log and in [`Metrics`]. Nothing is retried, queued or reported back.
//!
//! # Seams
//!
//! - [`Relay`]: how a segment reaches the downstream target (HTTP in the
//!   binary, in-memory in tests)
//! - [`Spawn`]: where the delivery runs ([`ThreadSpawner`] for detached
//!   threads, [`InlineSpawner`] to run synchronously in tests)

use crate::error::RelayError;
use crate::metrics::Metrics;
use crate::segment::Segment;
use std::io;
use std::sync::Arc;

/// Downstream target that accepts corrected segments.
pub trait Relay: Send + Sync {
    /// Deliver one segment.
    ///
    /// # Errors
    /// - `RelayError::Unreachable` if the target could not be contacted
    /// - `RelayError::Rejected` if it answered with a non-success status
    fn deliver(&self, segment: &Segment) -> Result<(), RelayError>;
}

/// A unit of background work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs background tasks without reporting back.
pub trait Spawn: Send + Sync {
    /// Start `task`. An error means it never ran and has been dropped.
    fn spawn(&self, task: Task) -> io::Result<()>;
}

/// Runs each task on its own detached OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner;

impl Spawn for ThreadSpawner {
    fn spawn(&self, task: Task) -> io::Result<()> {
        std::thread::Builder::new().name("relay".to_string()).spawn(task)?;
        Ok(())
    }
}

/// Runs each task immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn(&self, task: Task) -> io::Result<()> {
        task();
        Ok(())
    }
}

/// Dispatches corrected segments to a relay in the background.
#[derive(Clone)]
pub struct RelayDispatcher {
    relay: Arc<dyn Relay>,
    spawner: Arc<dyn Spawn>,
    metrics: Arc<Metrics>,
}

impl RelayDispatcher {
    pub fn new(relay: Arc<dyn Relay>, spawner: Arc<dyn Spawn>, metrics: Arc<Metrics>) -> Self {
        Self {
            relay,
            spawner,
            metrics,
        }
    }

    /// Hand `segment` to the relay and return without waiting.
    ///
    /// A task that cannot be started counts as a failed relay.
    pub fn dispatch(&self, segment: Segment) {
        let relay = Arc::clone(&self.relay);
        let metrics = Arc::clone(&self.metrics);
        let number = segment.segment_number;

        let spawned = self.spawner.spawn(Box::new(move || {
            log::debug!(
                "relaying segment {}/{} for {:?}: {}",
                segment.segment_number,
                segment.total_segments,
                segment.user_id,
                segment.segment
            );
            match relay.deliver(&segment) {
                Ok(()) => {
                    metrics.record_relay_delivered();
                    log::info!("segment {} relayed", segment.segment_number);
                }
                Err(e) => {
                    metrics.record_relay_failed();
                    log::warn!("segment {} not relayed: {e}", segment.segment_number);
                }
            }
        }));

        if let Err(e) = spawned {
            self.metrics.record_relay_failed();
            log::error!("segment {number} not relayed: failed to start relay task: {e}");
        }
    }
}
