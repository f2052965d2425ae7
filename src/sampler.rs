//! # Sampler & Event Handlers
//!
//! Translates host state and discrete gameplay events into
//! [`TelemetryRecord`]s. All session identifiers and clocks are stamped
//! into the record here, on the sampling thread, at construction time; the
//! dispatcher only ever sees finished records.
//!
//! Nothing on this path blocks on I/O and nothing propagates an error into
//! the host callback: a tick that cannot be captured is skipped and logged.

use crate::host::{EventSource, GameEvent, HostProbe};
use crate::queue::IngestionQueue;
use crate::record::{Euler, Payload, TelemetryRecord};
use crate::session::SessionManager;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

/// Builds records from host state and event callbacks. Single-threaded with
/// respect to itself (driven by the host's callback thread).
pub struct Sampler {
    probe: Arc<dyn HostProbe>,
    events: Arc<dyn EventSource>,
    queue: Arc<IngestionQueue>,
    session: SessionManager,
    /// Latched after the probe first fails so an outage logs once, not once
    /// per tick. Cleared by the next successful sample.
    probe_outage_logged: bool,
}

impl Sampler {
    pub fn new(
        probe: Arc<dyn HostProbe>,
        events: Arc<dyn EventSource>,
        queue: Arc<IngestionQueue>,
    ) -> Self {
        Self {
            probe,
            events,
            queue,
            session: SessionManager::new(),
            probe_outage_logged: false,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Capture one `update` record if the session is active and the probe
    /// can produce a snapshot. Called once per host physics tick.
    pub fn sample_tick(&mut self) {
        if !self.session.is_active() {
            return;
        }

        let Some(mut sample) = self.probe.vehicle() else {
            if !self.probe_outage_logged {
                warn!("[telemetry] vehicle state unavailable, skipping updates");
                self.probe_outage_logged = true;
            }
            return;
        };
        self.probe_outage_logged = false;

        sample.eul_rot = Euler::from_quat(sample.rot);
        self.emit(Payload::Update(sample));
    }

    /// Apply one discrete host event: session transitions and, where the
    /// event kind calls for it, a record.
    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::RaceStarted => {
                self.session.begin_race(self.events.as_ref());
                info!("[telemetry] race started, race_id={}", self.session.race_id());
                self.emit(Payload::Start);
            }
            GameEvent::RaceEnded => {
                if !self.session.in_race() {
                    return;
                }
                info!("[telemetry] race ended, race_id={}", self.session.race_id());
                // Record first so `time` carries the final elapsed value.
                self.emit(Payload::End);
                self.session.end_race();
            }
            GameEvent::PauseToggled { paused } => {
                self.session.set_paused(paused);
            }
            GameEvent::SceneSwitch => {
                self.session.end_race();
            }
            discrete => self.handle_discrete(discrete),
        }
    }

    /// Vehicle events only exist inside a race epoch; anything arriving
    /// while idle is a stale callback and is ignored.
    fn handle_discrete(&mut self, event: GameEvent) {
        if !self.session.in_race() {
            return;
        }

        match event {
            GameEvent::CheckpointPassed { checkpoint_index, track_t } => {
                self.emit(Payload::Checkpoint { checkpoint_index, track_t });
            }
            GameEvent::Collided { target, pos, speed } => {
                self.emit(Payload::Collision { target, pos, speed });
            }
            GameEvent::Destroyed { cause } => {
                self.emit(Payload::Destroyed { cause });
                self.session.suspend_capture();
            }
            GameEvent::Exploded { cause } => {
                self.emit(Payload::Exploded { cause });
                self.session.suspend_capture();
            }
            GameEvent::Honked { power, pos } => {
                self.emit(Payload::Honked { power, pos });
            }
            GameEvent::Finished { final_time, finish_type } => {
                self.emit(Payload::Finish { final_time, finish_type });
            }
            GameEvent::Jumped => {
                self.emit(Payload::Jump);
            }
            GameEvent::Respawned { pos, rot } => {
                self.session.resume_capture();
                self.emit(Payload::Respawn { pos, rot, eul_rot: Euler::from_quat(rot) });
            }
            GameEvent::Split { penetration, separation_speed } => {
                self.emit(Payload::Split { penetration, separation_speed });
            }
            GameEvent::TrickCompleted { points, cooldown, grind, wallride, ceiling } => {
                self.emit(Payload::Trick { points, cooldown, grind, wallride, ceiling });
            }
            // Control events are handled in handle_event.
            GameEvent::RaceStarted
            | GameEvent::RaceEnded
            | GameEvent::PauseToggled { .. }
            | GameEvent::SceneSwitch => {}
        }
    }

    fn emit(&self, payload: Payload) {
        let context = self.probe.context();
        self.queue.push(TelemetryRecord {
            sender_id: self.session.sender_id().to_owned(),
            race_id: self.session.race_id().to_owned(),
            level: context.level,
            mode: context.mode,
            real_time: Utc::now(),
            time: self.session.elapsed_secs(),
            payload,
        });
    }
}
