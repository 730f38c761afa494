//! ---
//! ftb_section: "02-link-data-model"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Autopilot link schema, transports, and dynamics attachments."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use ftb_state::AircraftState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema version broadcast alongside every message payload.
pub const SCHEMA_VERSION: u16 = 1;

/// Payload carried on the autopilot link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum LinkPayload {
    /// Timed inertial observation.
    Inertial(InertialReading),
    /// Timed positioning observation.
    Position(PositionFix),
    /// Timed barometric observation.
    Pressure(StaticPressure),
    /// Full-state passthrough report.
    State(StateReport),
    /// Inbound actuator command from the autopilot.
    Actuators(ActuatorCommand),
}

/// Unified message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkMessage {
    /// Unique identifier for deduplication and tracing.
    pub id: Uuid,
    /// Version of the schema used by the payload.
    pub schema_version: u16,
    /// Timestamp when the message was created.
    pub timestamp: DateTime<Utc>,
    /// Actual payload carried by the message.
    pub payload: LinkPayload,
}

impl LinkMessage {
    /// Construct a new message envelope around the provided payload.
    pub fn new(payload: LinkPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            schema_version: SCHEMA_VERSION,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Convenience accessor returning the payload kind as a static string.
    pub fn kind(&self) -> &'static str {
        match &self.payload {
            LinkPayload::Inertial(_) => "inertial",
            LinkPayload::Position(_) => "position",
            LinkPayload::Pressure(_) => "pressure",
            LinkPayload::State(_) => "state",
            LinkPayload::Actuators(_) => "actuators",
        }
    }
}

/// Inertial observation: body rates and specific force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialReading {
    /// Observation time, seconds since the run epoch.
    pub time_s: f64,
    /// Body roll rate, rad/s.
    pub p_rad_s: f64,
    /// Body pitch rate, rad/s.
    pub q_rad_s: f64,
    /// Body yaw rate, rad/s.
    pub r_rad_s: f64,
    /// Body x specific force, m/s².
    pub acc_x_mps2: f64,
    /// Body y specific force, m/s².
    pub acc_y_mps2: f64,
    /// Body z specific force, m/s².
    pub acc_z_mps2: f64,
}

/// Positioning observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Observation time, seconds since the run epoch.
    pub time_s: f64,
    /// Geodetic latitude, radians.
    pub lat_rad: f64,
    /// Geodetic longitude, radians.
    pub lon_rad: f64,
    /// Altitude, metres.
    pub alt_m: f64,
    /// Speed over ground, m/s.
    pub ground_speed_mps: f64,
    /// Course over ground, radians from true north.
    pub course_rad: f64,
}

/// Barometric observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticPressure {
    /// Observation time, seconds since the run epoch.
    pub time_s: f64,
    /// Static pressure, pascals.
    pub pressure_pa: f64,
    /// Pressure altitude, metres.
    pub pressure_alt_m: f64,
}

/// Full canonical state relayed as a single report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    /// The complete state snapshot.
    pub state: AircraftState,
}

/// Actuator command received from the autopilot link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Aileron deflection, normalized [-1, 1].
    pub aileron: f64,
    /// Elevator deflection, normalized [-1, 1].
    pub elevator: f64,
    /// Rudder deflection, normalized [-1, 1].
    pub rudder: f64,
    /// Throttle setting, normalized [0, 1].
    pub throttle: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fix() -> PositionFix {
        PositionFix {
            time_s: 8.0,
            lat_rad: 0.65,
            lon_rad: -2.1,
            alt_m: 950.0,
            ground_speed_mps: 28.0,
            course_rad: 0.4,
        }
    }

    #[test]
    fn json_and_cbor_roundtrip_preserve_payloads() {
        let message = LinkMessage::new(LinkPayload::Position(sample_fix()));

        let json = serde_json::to_string(&message).expect("serialize json");
        let from_json: LinkMessage = serde_json::from_str(&json).expect("deserialize json");
        assert_eq!(from_json, message);

        let cbor = serde_cbor::to_vec(&message).expect("serialize cbor");
        let from_cbor: LinkMessage = serde_cbor::from_slice(&cbor).expect("deserialize cbor");
        assert_eq!(from_cbor, message);
    }

    #[test]
    fn kind_matches_payload_variant() {
        assert_eq!(
            LinkMessage::new(LinkPayload::Position(sample_fix())).kind(),
            "position"
        );
        assert_eq!(
            LinkMessage::new(LinkPayload::Actuators(ActuatorCommand::default())).kind(),
            "actuators"
        );
    }

    #[test]
    fn envelope_carries_schema_version() {
        let message = LinkMessage::new(LinkPayload::Actuators(ActuatorCommand {
            throttle: 0.8,
            ..ActuatorCommand::default()
        }));
        assert_eq!(message.schema_version, SCHEMA_VERSION);
    }
}
