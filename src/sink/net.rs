//! # Network Sink
//!
//! Delivers one UDP datagram per serialized record to the configured
//! listener. The sink is either `Connected` (it holds a socket connected to
//! a specific target) or `Disconnected`; reconnection is lazy, at most one
//! attempt per dispatcher cycle, with exponential backoff between failed
//! attempts so a sustained outage never turns into a hot retry loop.
//!
//! A connected UDP socket only fixes the destination; "connect" failures
//! here are name-resolution or local-bind errors, and send failures are
//! what surfaces an unreachable peer (ICMP refusals on a connected socket).

use super::SinkError;
use log::{info, warn};
use std::io;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Connectionless datagram sink with connect/reconnect state.
#[derive(Debug)]
pub struct NetworkSink {
    /// Connected socket plus the target it was connected to. `None` is the
    /// `Disconnected` state.
    socket: Option<(UdpSocket, (String, u16))>,
    connect_timeout: Duration,
    /// At most one connect attempt per dispatcher cycle.
    attempted_this_cycle: bool,
    backoff: Duration,
    next_attempt_at: Option<Instant>,
    connect_attempts: u64,
}

impl NetworkSink {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            socket: None,
            connect_timeout,
            attempted_this_cycle: false,
            backoff: INITIAL_BACKOFF,
            next_attempt_at: None,
            connect_attempts: 0,
        }
    }

    /// Re-arm the per-cycle connect latch and pick up the current timeout.
    /// Called by the dispatcher at the top of every flush cycle.
    pub fn begin_cycle(&mut self, connect_timeout: Duration) {
        self.attempted_this_cycle = false;
        self.connect_timeout = connect_timeout;
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Connect attempts made so far, successful or not.
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts
    }

    /// Send one datagram to `host:port`, connecting first if necessary.
    /// On any failure the record should fall back to the file sink; the
    /// sink itself stays usable for the next record.
    pub async fn send(&mut self, host: &str, port: u16, payload: &[u8]) -> Result<(), SinkError> {
        if let Some((socket, target)) = self.socket.take() {
            if target.0 == host && target.1 == port {
                return match socket.send(payload).await {
                    Ok(_) => {
                        self.socket = Some((socket, target));
                        Ok(())
                    }
                    Err(e) => {
                        warn!("[telemetry] send to {}:{} failed: {}", host, port, e);
                        Err(SinkError::Send(e))
                    }
                };
            }
            // Target changed under us: drop the stale socket and reconnect
            // on this send.
            info!("[telemetry] network target changed, reconnecting");
            self.reset_backoff();
        }

        let socket = self.try_connect(host, port).await?;
        match socket.send(payload).await {
            Ok(_) => {
                self.socket = Some((socket, (host.to_string(), port)));
                Ok(())
            }
            Err(e) => {
                warn!("[telemetry] send to {}:{} failed: {}", host, port, e);
                Err(SinkError::Send(e))
            }
        }
    }

    async fn try_connect(&mut self, host: &str, port: u16) -> Result<UdpSocket, SinkError> {
        if self.attempted_this_cycle {
            return Err(SinkError::Unavailable);
        }
        if let Some(at) = self.next_attempt_at {
            if Instant::now() < at {
                return Err(SinkError::Unavailable);
            }
        }

        self.attempted_this_cycle = true;
        self.connect_attempts += 1;
        info!("[telemetry] connecting to {}:{}...", host, port);

        let connect = async {
            let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
            socket.connect((host, port)).await?;
            Ok::<_, io::Error>(socket)
        };

        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(socket)) => {
                info!("[telemetry] connected to {}:{}", host, port);
                self.reset_backoff();
                Ok(socket)
            }
            Ok(Err(e)) => {
                warn!("[telemetry] failed to connect to {}:{}: {}", host, port, e);
                self.bump_backoff();
                Err(SinkError::Connect { target: format!("{host}:{port}"), source: e })
            }
            Err(_) => {
                warn!(
                    "[telemetry] connect to {}:{} timed out after {:?}",
                    host, port, self.connect_timeout
                );
                self.bump_backoff();
                Err(SinkError::Connect {
                    target: format!("{host}:{port}"),
                    source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                })
            }
        }
    }

    fn bump_backoff(&mut self) {
        self.next_attempt_at = Some(Instant::now() + self.backoff);
        self.backoff = (self.backoff * 2).min(MAX_BACKOFF);
    }

    fn reset_backoff(&mut self) {
        self.backoff = INITIAL_BACKOFF;
        self.next_attempt_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A TLD reserved by RFC 2606, so resolution fails without touching the
    // network.
    const BAD_HOST: &str = "listener.invalid";

    #[tokio::test]
    async fn at_most_one_connect_attempt_per_cycle() {
        let mut sink = NetworkSink::new(Duration::from_secs(2));
        sink.begin_cycle(Duration::from_secs(2));

        let first = sink.send(BAD_HOST, 12345, b"{}").await;
        assert!(matches!(first, Err(SinkError::Connect { .. })));
        assert_eq!(sink.connect_attempts(), 1);

        // Same cycle: latched, no second attempt.
        let second = sink.send(BAD_HOST, 12345, b"{}").await;
        assert!(matches!(second, Err(SinkError::Unavailable)));
        assert_eq!(sink.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn backoff_defers_reconnect_across_cycles() {
        let mut sink = NetworkSink::new(Duration::from_secs(2));
        sink.begin_cycle(Duration::from_secs(2));
        let _ = sink.send(BAD_HOST, 12345, b"{}").await;
        assert_eq!(sink.connect_attempts(), 1);

        // Next cycle arrives before the 1s backoff window has passed.
        sink.begin_cycle(Duration::from_secs(2));
        let deferred = sink.send(BAD_HOST, 12345, b"{}").await;
        assert!(matches!(deferred, Err(SinkError::Unavailable)));
        assert_eq!(sink.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn delivers_datagram_to_local_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut sink = NetworkSink::new(Duration::from_secs(2));
        sink.begin_cycle(Duration::from_secs(2));
        sink.send("127.0.0.1", port, b"{\"event\":\"jump\"}").await.unwrap();
        assert!(sink.is_connected());

        let mut buf = [0u8; 128];
        let n = listener.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"{\"event\":\"jump\"}");
    }

    #[tokio::test]
    async fn target_change_reconnects_on_next_send() {
        let first = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let second = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let mut sink = NetworkSink::new(Duration::from_secs(2));
        sink.begin_cycle(Duration::from_secs(2));
        sink.send("127.0.0.1", first.local_addr().unwrap().port(), b"a").await.unwrap();

        sink.begin_cycle(Duration::from_secs(2));
        sink.send("127.0.0.1", second.local_addr().unwrap().port(), b"b").await.unwrap();
        assert_eq!(sink.connect_attempts(), 2);

        let mut buf = [0u8; 16];
        let n = second.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"b");
    }
}
