//! Wire-schema tests for the telemetry record model.
//!
//! The schema is part of the crate's contract: downstream consumers parse
//! these objects, so the field set must stay stable and every record must
//! survive a decode/re-encode round trip unchanged.

use chrono::Utc;
use telemetry::record::{Euler, Payload, Quat, TelemetryRecord, Vec3, VehicleSample};

fn record(payload: Payload) -> TelemetryRecord {
    TelemetryRecord {
        sender_id: "{0b5effe6-4d61-4dcd-9b95-0b26e1e921e4}".into(),
        race_id: "{9cfaf42e-59b4-41b2-b789-9ee6acf967c8}".into(),
        level: "Broken Symmetry".into(),
        mode: "Sprint".into(),
        real_time: Utc::now(),
        time: 12.345,
        payload,
    }
}

fn sample() -> VehicleSample {
    VehicleSample {
        speed_kph: 142.7,
        speed_mph: 88.7,
        heat: 0.35,
        pos: Vec3::new(10.0, -3.5, 250.25),
        rot: Quat { x: 0.0, y: 0.7071, z: 0.0, w: 0.7071 },
        eul_rot: Euler { pitch: 0.0, yaw: 90.0, roll: 0.0 },
        vel: Vec3::new(0.0, 0.0, 39.6),
        ang_vel: Vec3::new(0.0, 0.1, 0.0),
        grav: true,
        drag: 0.2,
        angular_drag: 0.05,
        wings: true,
        has_wings: true,
        all_wheels_contacting: false,
        drive_wheel_avg_rot_vel: 51.2,
        drive_wheel_avg_rpm: 489.0,
        ..Default::default()
    }
}

fn one_record_per_kind() -> Vec<TelemetryRecord> {
    vec![
        record(Payload::Update(sample())),
        record(Payload::Checkpoint { checkpoint_index: 7, track_t: 0.431 }),
        record(Payload::Collision {
            target: "RoadSegment_42".into(),
            pos: Vec3::new(1.0, 2.0, 3.0),
            speed: 33.3,
        }),
        record(Payload::Destroyed { cause: "Laser".into() }),
        record(Payload::Exploded { cause: "Overheated".into() }),
        record(Payload::Honked { power: 0.9, pos: Vec3::new(4.0, 5.0, 6.0) }),
        record(Payload::Finish { final_time: 83_450, finish_type: "Normal".into() }),
        record(Payload::Jump),
        record(Payload::Respawn {
            pos: Vec3::new(0.0, 10.0, 0.0),
            rot: Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
            eul_rot: Euler::default(),
        }),
        record(Payload::Split { penetration: 0.12, separation_speed: 7.5 }),
        record(Payload::Trick {
            points: 250,
            cooldown: 0.3,
            grind: 14.2,
            wallride: 3.1,
            ceiling: 0.0,
        }),
        record(Payload::Start),
        record(Payload::End),
    ]
}

#[test]
fn every_kind_round_trips_identically() {
    for original in one_record_per_kind() {
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: TelemetryRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, original, "value mismatch for {:?}", original.kind());

        // Re-encoding the decoded record must produce the same JSON object:
        // struct field order is fixed and float formatting is deterministic,
        // so the text itself is stable.
        let reencoded = serde_json::to_string(&decoded).unwrap();
        assert_eq!(reencoded, encoded, "object mismatch for {:?}", original.kind());
    }
}

#[test]
fn envelope_fields_present_on_every_kind() {
    for record in one_record_per_kind() {
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        for field in ["event", "sender_id", "race_id", "level", "mode", "real_time", "time"] {
            assert!(
                object.contains_key(field),
                "{:?} record is missing `{}`",
                record.kind(),
                field
            );
        }
        assert_eq!(value["event"], record.kind().as_str());
    }
}

#[test]
fn update_schema_is_stable() {
    let value = serde_json::to_value(record(Payload::Update(sample()))).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();

    assert_eq!(
        keys,
        vec![
            "all_wheels_contacting",
            "ang_vel",
            "angular_drag",
            "drag",
            "drive_wheel_avg_rot_vel",
            "drive_wheel_avg_rpm",
            "eul_rot",
            "event",
            "grav",
            "has_wings",
            "heat",
            "inputs",
            "level",
            "mode",
            "pos",
            "race_id",
            "real_time",
            "rot",
            "sender_id",
            "speed_kph",
            "speed_mph",
            "time",
            "tires",
            "vel",
            "wings",
        ]
    );

    // Nested shapes.
    assert_eq!(value["pos"]["z"], 250.25);
    assert_eq!(value["tires"]["tire_fl"]["contact"], false);
    assert_eq!(value["inputs"]["rotation"]["x"], 0.0);
}

#[test]
fn checkpoint_payload_carries_literal_inputs() {
    let value =
        serde_json::to_value(record(Payload::Checkpoint { checkpoint_index: 7, track_t: 0.431 }))
            .unwrap();
    assert_eq!(value["event"], "checkpoint");
    assert_eq!(value["checkpoint_index"], 7);
    assert_eq!(value["track_t"].as_f64().unwrap() as f32, 0.431);
}
