//! # Dispatcher
//!
//! The single background task that turns queued records into delivered
//! ones. Each cycle it drains the ingestion queue as one batch, serializes
//! every record in enqueue order and routes it network-first with file
//! fallback. Per-record failures are logged and skipped; one bad record
//! never stalls a batch, and nothing here can fail into the host.
//!
//! The wait between cycles is interruptible: shutdown cancels the sleep,
//! optionally runs one final drain so records enqueued after the last wake
//! are not silently lost, and exits so the owner can join the task.

use crate::config::SharedConfig;
use crate::queue::IngestionQueue;
use crate::sink::{FileSink, NetworkSink, SinkError};
use crate::stats::DispatchCounters;
use log::{debug, error, info, warn};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Floor for the configured flush interval; a zero interval must not spin.
const MIN_FLUSH_INTERVAL: std::time::Duration = std::time::Duration::from_millis(10);

/// Background flush loop draining the queue and routing records to sinks.
pub struct Dispatcher {
    queue: Arc<IngestionQueue>,
    config: SharedConfig,
    counters: Arc<DispatchCounters>,
    net: NetworkSink,
    file: FileSink,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<IngestionQueue>,
        config: SharedConfig,
        counters: Arc<DispatchCounters>,
        shutdown: CancellationToken,
    ) -> Self {
        let connect_timeout = config.read().connect_timeout;
        Self {
            queue,
            config,
            counters,
            net: NetworkSink::new(connect_timeout),
            file: FileSink::new(),
            shutdown,
        }
    }

    /// Run until the shutdown token fires. Spawned as a tokio task; the
    /// flush interval is re-read every cycle so config changes apply on the
    /// next wake.
    pub async fn run(mut self) {
        info!("[telemetry] dispatcher started");
        let shutdown = self.shutdown.clone();

        loop {
            let interval = self.config.read().flush_interval.max(MIN_FLUSH_INTERVAL);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.flush_cycle().await;
                }
                _ = shutdown.cancelled() => {
                    let final_flush = self.config.read().flush_on_shutdown;
                    if final_flush {
                        self.flush_cycle().await;
                    }
                    break;
                }
            }
        }

        info!(
            "[telemetry] dispatcher stopped ({} sent, {} written to file)",
            self.counters.sent_network.load(Ordering::Relaxed),
            self.counters.written_file.load(Ordering::Relaxed),
        );
    }

    /// Drain and deliver one batch.
    async fn flush_cycle(&mut self) {
        let batch = self.queue.drain_all();
        if batch.is_empty() {
            return;
        }

        let (target, output_dir, file_prefix, connect_timeout, max_datagram) = {
            let config = self.config.read();
            (
                config.network_target(),
                config.output_dir.clone(),
                config.file_prefix.clone(),
                config.connect_timeout,
                config.max_datagram_bytes,
            )
        };

        self.net.begin_cycle(connect_timeout);
        debug!("[telemetry] flushing {} records", batch.len());

        for record in batch {
            let line = match serde_json::to_string(&record) {
                Ok(line) => line,
                Err(e) => {
                    error!("[telemetry] failed to encode {:?} record: {}", record.kind(), e);
                    self.counters.encode_failures.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };

            let mut delivered = false;
            if let Some((host, port)) = &target {
                if line.len() > max_datagram {
                    warn!(
                        "[telemetry] {:?} record exceeds max datagram size ({} > {} bytes), writing to file",
                        record.kind(),
                        line.len(),
                        max_datagram
                    );
                } else {
                    match self.net.send(host, *port, line.as_bytes()).await {
                        Ok(()) => {
                            self.counters.sent_network.fetch_add(1, Ordering::Relaxed);
                            delivered = true;
                        }
                        // Connect/send paths log their own diagnostics; the
                        // record just falls through to the file sink.
                        Err(SinkError::Unavailable)
                        | Err(SinkError::Connect { .. })
                        | Err(SinkError::Send(_)) => {}
                    }
                }
            }

            if !delivered {
                if self.file.append(&output_dir, &file_prefix, &line) {
                    self.counters.written_file.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.counters.lost_records.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        self.counters
            .connect_attempts
            .store(self.net.connect_attempts(), Ordering::Relaxed);
    }
}
