//! # Ingestion Queue
//!
//! Thread-safe FIFO between the sampling thread and the dispatcher. The
//! queue is bounded: if the sinks stall long enough for the buffer to fill,
//! the oldest records are discarded and counted rather than letting the
//! queue grow without limit.

use crate::record::TelemetryRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded FIFO holding records between capture and dispatch.
#[derive(Debug)]
pub struct IngestionQueue {
    inner: Mutex<VecDeque<TelemetryRecord>>,
    capacity: usize,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl IngestionQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue one record. Non-blocking apart from the queue lock; called
    /// from the host's sampling thread. At capacity the oldest record is
    /// dropped and counted.
    pub fn push(&self, record: TelemetryRecord) {
        let mut queue = self.inner.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(record);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically remove and return every queued record in enqueue order.
    /// Each record is returned by exactly one drain.
    pub fn drain_all(&self) -> Vec<TelemetryRecord> {
        let mut queue = self.inner.lock();
        queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Total records accepted since construction.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Records discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use chrono::Utc;

    fn record(time: f64) -> TelemetryRecord {
        TelemetryRecord {
            sender_id: "{sender}".into(),
            race_id: "{race}".into(),
            level: "Test Level".into(),
            mode: "Sprint".into(),
            real_time: Utc::now(),
            time,
            payload: Payload::Jump,
        }
    }

    #[test]
    fn drain_preserves_fifo_order() {
        let queue = IngestionQueue::with_capacity(16);
        queue.push(record(1.0));
        queue.push(record(2.0));
        queue.push(record(3.0));

        let drained = queue.drain_all();
        let times: Vec<f64> = drained.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn drain_returns_each_record_once() {
        let queue = IngestionQueue::with_capacity(16);
        queue.push(record(1.0));
        queue.push(record(2.0));

        assert_eq!(queue.drain_all().len(), 2);
        assert!(queue.drain_all().is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let queue = IngestionQueue::with_capacity(3);
        for i in 0..5 {
            queue.push(record(i as f64));
        }

        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.enqueued(), 5);

        let times: Vec<f64> = queue.drain_all().iter().map(|r| r.time).collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0]);
    }
}
