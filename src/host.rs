//! # Host Integration Surface
//!
//! The narrow interfaces the pipeline consumes from its host application.
//! The original implementation reached into private host fields through
//! reflection; here the host implements [`HostProbe`] explicitly and the
//! pipeline stays oblivious to where the values come from.

use crate::record::{Quat, Vec3, VehicleSample};
use std::fmt;

/// Level and game-mode context stamped onto every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameContext {
    pub level: String,
    pub mode: String,
}

/// Read-only accessor over the host's current state.
///
/// Implementations must be cheap and infallible: when the vehicle is not
/// available (loading screens, spectator mode) `vehicle()` returns `None`
/// rather than failing.
pub trait HostProbe: Send + Sync {
    /// Current level/mode context.
    fn context(&self) -> GameContext;

    /// One kinematic snapshot of the observed vehicle, or `None` when no
    /// vehicle state can be produced this tick. `eul_rot` is filled in by
    /// the sampler; implementations may leave it at its default.
    fn vehicle(&self) -> Option<VehicleSample>;
}

/// Source of discrete gameplay events.
///
/// `subscribe` is called when a race begins and the returned handle is
/// dropped at session teardown, releasing whatever registration the host
/// performed. The events themselves reach the pipeline through
/// [`TelemetryPipeline::handle_event`](crate::pipeline::TelemetryPipeline::handle_event).
pub trait EventSource: Send + Sync {
    fn subscribe(&self) -> Subscription;
}

/// Scope-guaranteed event registration: dropping the handle releases it.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// A subscription that runs `release` when dropped.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// Discrete gameplay events delivered by the host's callback thread.
///
/// Control events (`RaceStarted`, `RaceEnded`, `PauseToggled`,
/// `SceneSwitch`) drive the session state machine; the rest become records
/// when a race epoch is in progress.
#[derive(Debug, Clone)]
pub enum GameEvent {
    RaceStarted,
    RaceEnded,
    PauseToggled { paused: bool },
    SceneSwitch,
    CheckpointPassed { checkpoint_index: i32, track_t: f32 },
    Collided { target: String, pos: Vec3, speed: f32 },
    Destroyed { cause: String },
    Exploded { cause: String },
    Honked { power: f32, pos: Vec3 },
    Finished { final_time: i32, finish_type: String },
    Jumped,
    Respawned { pos: Vec3, rot: Quat },
    Split { penetration: f32, separation_speed: f32 },
    TrickCompleted { points: i32, cooldown: f32, grind: f32, wallride: f32, ceiling: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn subscription_releases_on_drop() {
        let released = Arc::new(AtomicU32::new(0));
        let counter = released.clone();
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(sub);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_subscription_is_inert() {
        drop(Subscription::detached());
    }
}
