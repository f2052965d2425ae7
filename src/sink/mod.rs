//! # Delivery Sinks
//!
//! Two delivery targets for serialized records: the connected-UDP
//! [`NetworkSink`] (preferred) and the append-only [`FileSink`] used when
//! the network sink is unconfigured or unreachable. Both are driven only by
//! the dispatcher task; neither is visible to the sampling thread.

pub mod file;
pub mod net;

pub use file::FileSink;
pub use net::NetworkSink;

/// Why the network sink could not take a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// No connection and no attempt permitted right now (per-cycle latch or
    /// backoff window).
    #[error("network sink unavailable")]
    Unavailable,

    #[error("connect to {target}: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    #[error("send: {0}")]
    Send(#[from] std::io::Error),
}
