//! # Telemetry Record Model
//!
//! The single tagged record type shared by every capture site. The original
//! plugin assembled an untyped dictionary per event handler, which let field
//! names drift between revisions; here every event kind is one variant of
//! [`Payload`] and the wire schema is fixed by the serde derives.
//!
//! Wire schema: one JSON object per record, snake_case field names, with the
//! `event` tag selecting the payload shape. The envelope fields
//! (`sender_id`, `race_id`, `level`, `mode`, `real_time`, `time`) appear on
//! every record and are stamped at construction time, never at send time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 3-component vector (position, velocity, angular velocity).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Rotation as a unit quaternion, as reported by the host physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Rotation as pitch/yaw/roll in degrees, derived from [`Quat`] at capture
/// time so downstream consumers get both representations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Euler {
    /// Extract pitch/yaw/roll (degrees) from a unit quaternion.
    pub fn from_quat(q: Quat) -> Self {
        let yaw = (2.0 * q.y * q.w - 2.0 * q.x * q.z)
            .atan2(1.0 - 2.0 * q.y * q.y - 2.0 * q.z * q.z)
            .to_degrees();
        let pitch = (2.0 * q.x * q.w - 2.0 * q.y * q.z)
            .atan2(1.0 - 2.0 * q.x * q.x - 2.0 * q.z * q.z)
            .to_degrees();
        let roll = (2.0 * q.x * q.y + 2.0 * q.z * q.w).asin().to_degrees();
        Self { pitch, yaw, roll }
    }
}

/// Driver control state for one physics tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Inputs {
    pub boost: bool,
    pub steer: f32,
    pub grip: bool,
    pub gas: f32,
    pub brake: f32,
    pub rotation: Vec3,
}

/// Contact state of a single wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tire {
    /// Hub height (world Y) of the wheel.
    pub pos: f32,
    pub contact: bool,
    pub suspension: f32,
}

/// All four wheels, front-left through back-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tires {
    pub tire_fl: Tire,
    pub tire_fr: Tire,
    pub tire_bl: Tire,
    pub tire_br: Tire,
}

/// One full kinematic snapshot of the vehicle, the payload of an `update`
/// record. Produced by the host-state probe once per sampling tick.
///
/// `eul_rot` is derived from `rot` during capture; probe implementations may
/// leave it at its default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleSample {
    pub speed_kph: f32,
    pub speed_mph: f32,
    pub heat: f32,
    pub pos: Vec3,
    pub rot: Quat,
    pub eul_rot: Euler,
    pub vel: Vec3,
    pub ang_vel: Vec3,
    pub inputs: Inputs,
    pub grav: bool,
    pub drag: f32,
    pub angular_drag: f32,
    pub wings: bool,
    pub has_wings: bool,
    pub all_wheels_contacting: bool,
    pub tires: Tires,
    pub drive_wheel_avg_rot_vel: f32,
    pub drive_wheel_avg_rpm: f32,
}

/// Kind-specific payload of a record. The serialized `event` tag selects the
/// variant; each variant carries exactly the fields valid for that kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Payload {
    Update(VehicleSample),
    Checkpoint {
        checkpoint_index: i32,
        track_t: f32,
    },
    Collision {
        target: String,
        pos: Vec3,
        speed: f32,
    },
    Destroyed {
        cause: String,
    },
    Exploded {
        cause: String,
    },
    Honked {
        power: f32,
        pos: Vec3,
    },
    Finish {
        final_time: i32,
        finish_type: String,
    },
    Jump,
    Respawn {
        pos: Vec3,
        rot: Quat,
        eul_rot: Euler,
    },
    Split {
        penetration: f32,
        separation_speed: f32,
    },
    Trick {
        points: i32,
        cooldown: f32,
        grind: f32,
        wallride: f32,
        ceiling: f32,
    },
    Start,
    End,
}

/// Discriminant of [`Payload`], for logging and per-kind bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Update,
    Checkpoint,
    Collision,
    Destroyed,
    Exploded,
    Honked,
    Finish,
    Jump,
    Respawn,
    Split,
    Trick,
    Start,
    End,
}

impl EventKind {
    /// The wire tag value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Update => "update",
            EventKind::Checkpoint => "checkpoint",
            EventKind::Collision => "collision",
            EventKind::Destroyed => "destroyed",
            EventKind::Exploded => "exploded",
            EventKind::Honked => "honked",
            EventKind::Finish => "finish",
            EventKind::Jump => "jump",
            EventKind::Respawn => "respawn",
            EventKind::Split => "split",
            EventKind::Trick => "trick",
            EventKind::Start => "start",
            EventKind::End => "end",
        }
    }
}

impl Payload {
    pub fn kind(&self) -> EventKind {
        match self {
            Payload::Update(_) => EventKind::Update,
            Payload::Checkpoint { .. } => EventKind::Checkpoint,
            Payload::Collision { .. } => EventKind::Collision,
            Payload::Destroyed { .. } => EventKind::Destroyed,
            Payload::Exploded { .. } => EventKind::Exploded,
            Payload::Honked { .. } => EventKind::Honked,
            Payload::Finish { .. } => EventKind::Finish,
            Payload::Jump => EventKind::Jump,
            Payload::Respawn { .. } => EventKind::Respawn,
            Payload::Split { .. } => EventKind::Split,
            Payload::Trick { .. } => EventKind::Trick,
            Payload::Start => EventKind::Start,
            Payload::End => EventKind::End,
        }
    }
}

/// One telemetry record: the common envelope plus the kind-specific payload.
///
/// Immutable once constructed. Identifiers and clocks are snapshotted from
/// the session at construction time so the dispatcher never reads session
/// state from its own thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Process-scoped identity, constant for the lifetime of the pipeline.
    pub sender_id: String,
    /// Race-scoped identity, regenerated on every `start`.
    pub race_id: String,
    pub level: String,
    pub mode: String,
    /// Wall clock at capture.
    pub real_time: DateTime<Utc>,
    /// Seconds since the current race's `start`, non-decreasing within a
    /// race epoch.
    pub time: f64,
    #[serde(flatten)]
    pub payload: Payload,
}

impl TelemetryRecord {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
