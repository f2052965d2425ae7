//! Pipeline activity counters.

use std::sync::atomic::AtomicU64;

/// Counters maintained by the dispatcher, shared with the pipeline facade.
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub(crate) sent_network: AtomicU64,
    pub(crate) written_file: AtomicU64,
    pub(crate) encode_failures: AtomicU64,
    pub(crate) connect_attempts: AtomicU64,
    pub(crate) lost_records: AtomicU64,
}

/// Point-in-time snapshot of pipeline activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records accepted by the ingestion queue.
    pub enqueued: u64,
    /// Records dropped by the bounded queue before dispatch.
    pub dropped: u64,
    /// Records delivered as UDP datagrams.
    pub sent_network: u64,
    /// Records written to the fallback log.
    pub written_file: u64,
    /// Records that failed to encode and were discarded.
    pub encode_failures: u64,
    /// Network connect attempts, successful or not.
    pub connect_attempts: u64,
    /// Records lost after both sinks were unavailable.
    pub lost_records: u64,
}
