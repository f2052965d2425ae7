//! # Telemetry Listener CLI
//!
//! Diagnostic companion to the pipeline's network sink: binds a UDP port,
//! decodes each incoming record and prints one summary line per record,
//! plus a per-kind tally on exit.
//!
//! Usage:
//!   telemetry-listener [--bind 0.0.0.0] [--port 12345] [--raw]

use clap::Parser;
use std::collections::BTreeMap;
use telemetry::record::{Payload, TelemetryRecord};
use tokio::net::UdpSocket;

#[derive(Parser)]
#[command(name = "telemetry-listener")]
#[command(about = "Receive and display race telemetry records over UDP", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = 12345)]
    port: u16,

    /// Print raw JSON lines instead of summaries
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let socket = UdpSocket::bind((cli.bind.as_str(), cli.port)).await?;
    println!("Listening on UDP {}:{}...", cli.bind, cli.port);

    // Datagrams carry one record each; 64 KiB covers any payload the
    // pipeline will send.
    let mut buf = vec![0u8; 65_535];
    let mut tally: BTreeMap<&'static str, u64> = BTreeMap::new();

    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, peer) = received?;
                let text = match std::str::from_utf8(&buf[..len]) {
                    Ok(text) => text.trim(),
                    Err(_) => {
                        eprintln!("non-UTF-8 datagram ({len} bytes) from {peer}");
                        continue;
                    }
                };

                if cli.raw {
                    println!("{text}");
                }

                match serde_json::from_str::<TelemetryRecord>(text) {
                    Ok(record) => {
                        *tally.entry(record.kind().as_str()).or_default() += 1;
                        if !cli.raw {
                            println!("{}", summarize(&record));
                        }
                    }
                    Err(e) => eprintln!("undecodable record from {peer}: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    println!("Records by kind:");
    for (kind, count) in &tally {
        println!("  {kind:<12} {count}");
    }

    Ok(())
}

fn summarize(record: &TelemetryRecord) -> String {
    let head = format!(
        "[{:<10}] {:>8.3}s {} ({})",
        record.kind().as_str(),
        record.time,
        record.level,
        record.mode
    );

    match &record.payload {
        Payload::Update(sample) => format!(
            "{head} {:.1} km/h pos=({:.1}, {:.1}, {:.1})",
            sample.speed_kph, sample.pos.x, sample.pos.y, sample.pos.z
        ),
        Payload::Checkpoint { checkpoint_index, track_t } => {
            format!("{head} index={checkpoint_index} track_t={track_t:.3}")
        }
        Payload::Collision { target, speed, .. } => {
            format!("{head} target={target} speed={speed:.1}")
        }
        Payload::Destroyed { cause } | Payload::Exploded { cause } => {
            format!("{head} cause={cause}")
        }
        Payload::Honked { power, .. } => format!("{head} power={power:.2}"),
        Payload::Finish { final_time, finish_type } => {
            format!("{head} final_time={final_time} type={finish_type}")
        }
        Payload::Trick { points, .. } => format!("{head} points={points}"),
        Payload::Split { penetration, separation_speed } => {
            format!("{head} penetration={penetration:.2} separation={separation_speed:.2}")
        }
        Payload::Respawn { pos, .. } => {
            format!("{head} pos=({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z)
        }
        Payload::Jump | Payload::Start | Payload::End => head,
    }
}
