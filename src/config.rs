//! Pipeline configuration, hot-reloadable behind a shared lock.
//!
//! Host/port changes take effect on the next send attempt, the flush
//! interval on the next dispatcher wake. `queue_capacity` is the one field
//! fixed at spawn time.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Sentinel port value that disables the network sink.
pub const PORT_DISABLED: u16 = 0;

/// Configuration for the telemetry pipeline.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Stem of the fallback log file name.
    pub file_prefix: String,

    /// Directory for fallback logs, created on demand.
    pub output_dir: PathBuf,

    /// UDP listener host. Empty string disables the network sink.
    pub network_host: String,

    /// UDP listener port. [`PORT_DISABLED`] disables the network sink.
    pub network_port: u16,

    /// Dispatcher wake period.
    pub flush_interval: Duration,

    /// Ingestion queue capacity; oldest records are dropped past this.
    /// Fixed at spawn.
    pub queue_capacity: usize,

    /// Upper bound on one connect attempt.
    pub connect_timeout: Duration,

    /// Drain and deliver whatever is still queued when the pipeline shuts
    /// down.
    pub flush_on_shutdown: bool,

    /// Largest record payload sent as a UDP datagram. Oversized records are
    /// diverted to the file sink; delivery is per-record, so callers must
    /// keep individual payloads within the transport's safe datagram size.
    pub max_datagram_bytes: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            file_prefix: "Telemetry".to_string(),
            output_dir: PathBuf::from("Telemetry"),
            network_host: String::new(),
            network_port: 12345,
            flush_interval: Duration::from_secs(1),
            queue_capacity: 4096,
            connect_timeout: Duration::from_secs(2),
            flush_on_shutdown: true,
            max_datagram_bytes: 60_000,
        }
    }
}

impl TelemetryConfig {
    /// The configured network target, or `None` when either disable
    /// sentinel (empty host, port 0) is set.
    pub fn network_target(&self) -> Option<(String, u16)> {
        if self.network_host.is_empty() || self.network_port == PORT_DISABLED {
            None
        } else {
            Some((self.network_host.clone(), self.network_port))
        }
    }
}

/// Shared handle to the live configuration.
pub type SharedConfig = Arc<RwLock<TelemetryConfig>>;
