//! # Race Telemetry Pipeline
//!
//! In-process telemetry for a real-time racing-simulation client: periodic
//! vehicle-state snapshots and discrete gameplay events are captured into
//! immutable tagged records, queued, and delivered in the background to a
//! UDP listener or, when that is disabled or unreachable, to an append-only
//! JSON-Lines log.
//!
//! Two execution contexts share exactly one structure: the host's callback
//! thread pushes records into the [`queue::IngestionQueue`], and the
//! dispatcher task drains it on a fixed interval. Session identifiers are
//! stamped into each record at construction time, so the dispatcher never
//! reads session state across threads. Every failure path is fail-soft:
//! telemetry trouble surfaces in the log, never in the host's control loop.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use telemetry::{GameEvent, TelemetryConfig, TelemetryPipeline};
//! # use telemetry::{GameContext, HostProbe, EventSource, Subscription, VehicleSample};
//! # struct Probe;
//! # impl HostProbe for Probe {
//! #     fn context(&self) -> GameContext { GameContext::default() }
//! #     fn vehicle(&self) -> Option<VehicleSample> { None }
//! # }
//! # struct Events;
//! # impl EventSource for Events {
//! #     fn subscribe(&self) -> Subscription { Subscription::detached() }
//! # }
//!
//! # #[tokio::main] async fn main() {
//! let pipeline = TelemetryPipeline::spawn(
//!     TelemetryConfig::default(),
//!     Arc::new(Probe),
//!     Arc::new(Events),
//! );
//!
//! pipeline.handle_event(GameEvent::RaceStarted);
//! pipeline.sample_tick(); // once per physics tick
//! pipeline.handle_event(GameEvent::RaceEnded);
//! pipeline.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod host;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod sampler;
pub mod session;
pub mod sink;
pub mod stats;

pub use config::{TelemetryConfig, PORT_DISABLED};
pub use host::{EventSource, GameContext, GameEvent, HostProbe, Subscription};
pub use pipeline::TelemetryPipeline;
pub use record::{EventKind, Payload, TelemetryRecord, VehicleSample};
pub use session::SessionPhase;
pub use stats::PipelineStats;
