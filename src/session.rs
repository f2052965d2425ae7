//! # Session Manager
//!
//! Owns the pipeline's identities and the capture state machine:
//!
//! ```text
//! Idle ──start──▶ Active ──pause on / vehicle lost──▶ Paused
//!   ▲                │  ◀──pause off / respawn──────────┘
//!   └──end / scene switch──┘
//! ```
//!
//! `sender_id` is minted once per process; `race_id` is regenerated on every
//! start, including a re-entrant start while a race is already running. The
//! race stopwatch restarts at zero on start and freezes when the session
//! returns to idle, so `time` is non-decreasing within one race epoch.

use crate::host::{EventSource, Subscription};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Capture phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No race epoch in progress; nothing is captured.
    Idle,
    /// Updates and discrete events are captured.
    Active,
    /// Update capture suspended; discrete events are still captured.
    Paused,
}

/// Race-relative stopwatch. Frozen while no race is running.
#[derive(Debug)]
enum RaceClock {
    Stopped(Duration),
    Running(Instant),
}

impl RaceClock {
    fn elapsed(&self) -> Duration {
        match self {
            RaceClock::Stopped(frozen) => *frozen,
            RaceClock::Running(since) => since.elapsed(),
        }
    }

    fn restart(&mut self) {
        *self = RaceClock::Running(Instant::now());
    }

    fn stop(&mut self) {
        *self = RaceClock::Stopped(self.elapsed());
    }
}

/// Process/session identity and the active/paused state machine gating
/// capture. Touched only from the sampling context.
#[derive(Debug)]
pub struct SessionManager {
    sender_id: String,
    race_id: String,
    phase: SessionPhase,
    clock: RaceClock,
    subscription: Option<Subscription>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sender_id: Uuid::new_v4().braced().to_string(),
            race_id: Uuid::nil().braced().to_string(),
            phase: SessionPhase::Idle,
            clock: RaceClock::Stopped(Duration::ZERO),
            subscription: None,
        }
    }

    /// Begin a race epoch: fresh `race_id`, stopwatch restarted from zero,
    /// event subscription acquired if not already held. A start arriving
    /// while a race is running restarts the clock and mints a new id.
    pub fn begin_race(&mut self, events: &dyn EventSource) {
        self.race_id = Uuid::new_v4().braced().to_string();
        self.clock.restart();
        self.phase = SessionPhase::Active;
        if self.subscription.is_none() {
            self.subscription = Some(events.subscribe());
        }
    }

    /// Return to idle: stopwatch frozen, event subscription released.
    pub fn end_race(&mut self) {
        self.phase = SessionPhase::Idle;
        self.clock.stop();
        self.subscription = None;
    }

    /// Pause gating from the host. Ignored while idle.
    pub fn set_paused(&mut self, paused: bool) {
        if self.phase == SessionPhase::Idle {
            return;
        }
        self.phase = if paused { SessionPhase::Paused } else { SessionPhase::Active };
    }

    /// Suspend update capture (vehicle destroyed or exploded) without
    /// ending the race epoch.
    pub fn suspend_capture(&mut self) {
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Paused;
        }
    }

    /// Resume update capture (vehicle respawned).
    pub fn resume_capture(&mut self) {
        if self.phase != SessionPhase::Idle {
            self.phase = SessionPhase::Active;
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// A race epoch exists (`Active` or `Paused`).
    pub fn in_race(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn race_id(&self) -> &str {
        &self.race_id
    }

    /// Seconds since the current race's start; frozen once the session
    /// returns to idle.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        subscribed: AtomicU32,
        released: Arc<AtomicU32>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                subscribed: AtomicU32::new(0),
                released: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl EventSource for CountingSource {
        fn subscribe(&self) -> Subscription {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            let released = self.released.clone();
            Subscription::new(move || {
                released.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[test]
    fn starts_idle_with_nil_race_id() {
        let session = SessionManager::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.race_id(), Uuid::nil().braced().to_string());
        assert_eq!(session.elapsed_secs(), 0.0);
    }

    #[test]
    fn begin_race_mints_fresh_race_id_and_subscribes() {
        let source = CountingSource::new();
        let mut session = SessionManager::new();
        let sender = session.sender_id().to_owned();

        session.begin_race(&source);
        let first_race = session.race_id().to_owned();
        assert!(session.is_active());
        assert_ne!(first_race, Uuid::nil().braced().to_string());
        assert_eq!(source.subscribed.load(Ordering::SeqCst), 1);

        // Re-entrant start: new race id, same sender, no duplicate
        // subscription.
        session.begin_race(&source);
        assert_ne!(session.race_id(), first_race);
        assert_eq!(session.sender_id(), sender);
        assert_eq!(source.subscribed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn end_race_releases_subscription_and_freezes_clock() {
        let source = CountingSource::new();
        let mut session = SessionManager::new();

        session.begin_race(&source);
        std::thread::sleep(Duration::from_millis(10));
        session.end_race();

        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(source.released.load(Ordering::SeqCst), 1);

        let frozen = session.elapsed_secs();
        assert!(frozen > 0.0);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(session.elapsed_secs(), frozen);
    }

    #[test]
    fn pause_gates_only_while_in_race() {
        let source = CountingSource::new();
        let mut session = SessionManager::new();

        // Pause while idle is ignored.
        session.set_paused(false);
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.begin_race(&source);
        session.set_paused(true);
        assert_eq!(session.phase(), SessionPhase::Paused);
        assert!(session.in_race());
        session.set_paused(false);
        assert!(session.is_active());
    }

    #[test]
    fn destroy_respawn_cycle_toggles_capture() {
        let source = CountingSource::new();
        let mut session = SessionManager::new();

        session.suspend_capture();
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.begin_race(&source);
        session.suspend_capture();
        assert_eq!(session.phase(), SessionPhase::Paused);
        session.resume_capture();
        assert!(session.is_active());
    }
}
