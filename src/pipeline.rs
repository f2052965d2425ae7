//! # Telemetry Pipeline
//!
//! The context object that wires capture, queue and dispatch together. The
//! original implementation hung all of this off a global singleton; here
//! the host constructs one [`TelemetryPipeline`], passes it wherever
//! capture happens, and tears it down explicitly.
//!
//! `spawn` must be called from within a tokio runtime: the dispatcher runs
//! as a background task on that runtime. The capture entry points
//! (`sample_tick`, `handle_event`) are synchronous, lock-only and safe to
//! call from the host's callback thread.

use crate::config::{SharedConfig, TelemetryConfig};
use crate::dispatcher::Dispatcher;
use crate::host::{EventSource, GameEvent, HostProbe};
use crate::queue::IngestionQueue;
use crate::sampler::Sampler;
use crate::session::SessionPhase;
use crate::stats::{DispatchCounters, PipelineStats};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running telemetry pipeline.
pub struct TelemetryPipeline {
    config: SharedConfig,
    queue: Arc<IngestionQueue>,
    sampler: Mutex<Sampler>,
    counters: Arc<DispatchCounters>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryPipeline {
    /// Wire the pipeline and spawn its dispatcher task.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(
        config: TelemetryConfig,
        probe: Arc<dyn HostProbe>,
        events: Arc<dyn EventSource>,
    ) -> Self {
        let queue = Arc::new(IngestionQueue::with_capacity(config.queue_capacity));
        let config: SharedConfig = Arc::new(RwLock::new(config));
        let sampler = Sampler::new(probe, events, queue.clone());
        info!("[telemetry] instance {} initializing...", sampler.session().sender_id());

        let counters = Arc::new(DispatchCounters::default());
        let shutdown = CancellationToken::new();
        let dispatcher = Dispatcher::new(
            queue.clone(),
            config.clone(),
            counters.clone(),
            shutdown.clone(),
        );
        let worker = tokio::spawn(dispatcher.run());

        Self {
            config,
            queue,
            sampler: Mutex::new(sampler),
            counters,
            shutdown,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Capture one vehicle-state snapshot. Called from the host's physics
    /// tick; a no-op unless a race is active.
    pub fn sample_tick(&self) {
        self.sampler.lock().sample_tick();
    }

    /// Deliver one discrete host event to the pipeline.
    pub fn handle_event(&self, event: GameEvent) {
        self.sampler.lock().handle_event(event);
    }

    /// Mutate the live configuration; host/port changes apply on the next
    /// send attempt, the flush interval on the next wake.
    pub fn update_config(&self, apply: impl FnOnce(&mut TelemetryConfig)) {
        apply(&mut self.config.write());
    }

    /// Process-scoped identity stamped on every record.
    pub fn sender_id(&self) -> String {
        self.sampler.lock().session().sender_id().to_owned()
    }

    /// Identity of the current race epoch.
    pub fn race_id(&self) -> String {
        self.sampler.lock().session().race_id().to_owned()
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.sampler.lock().session().phase()
    }

    /// Counters snapshot.
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            enqueued: self.queue.enqueued(),
            dropped: self.queue.dropped(),
            sent_network: self.counters.sent_network.load(Ordering::Relaxed),
            written_file: self.counters.written_file.load(Ordering::Relaxed),
            encode_failures: self.counters.encode_failures.load(Ordering::Relaxed),
            connect_attempts: self.counters.connect_attempts.load(Ordering::Relaxed),
            lost_records: self.counters.lost_records.load(Ordering::Relaxed),
        }
    }

    /// Stop the dispatcher and wait for it to exit. With
    /// `flush_on_shutdown` set (the default) the dispatcher drains the
    /// queue once more before exiting.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                warn!("[telemetry] dispatcher task aborted: {}", e);
            }
        }
    }
}

impl Drop for TelemetryPipeline {
    fn drop(&mut self) {
        // Dropping without shutdown() still stops the background task; the
        // final flush only happens on an awaited shutdown.
        self.shutdown.cancel();
    }
}
