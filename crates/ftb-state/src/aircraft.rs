//! ---
//! ftb_section: "05-state-estimation"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Canonical aircraft state records and estimation."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Standard gravity, m/s², down-positive convention.
pub const STD_GRAVITY_MPS2: f64 = 9.806;

/// Canonical aircraft state snapshot.
///
/// Replaced wholesale on every update; individual fields are never mutated
/// in place, so a snapshot can never mix values from two ticks. Owned by
/// the scheduler and read-only to the sensor models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    /// Seconds since the dynamics/run epoch.
    pub time_s: f64,
    /// Roll angle, radians.
    pub roll_rad: f64,
    /// Pitch angle, radians.
    pub pitch_rad: f64,
    /// Yaw angle, radians from true north.
    pub yaw_rad: f64,
    /// Body roll rate, rad/s.
    pub p_rad_s: f64,
    /// Body pitch rate, rad/s.
    pub q_rad_s: f64,
    /// Body yaw rate, rad/s.
    pub r_rad_s: f64,
    /// Geodetic latitude, radians.
    pub lat_rad: f64,
    /// Geodetic longitude, radians.
    pub lon_rad: f64,
    /// Altitude above the reference ellipsoid, metres.
    pub alt_m: f64,
    /// Local-level north velocity, m/s.
    pub vel_north_mps: f64,
    /// Local-level east velocity, m/s.
    pub vel_east_mps: f64,
    /// Local-level down velocity, m/s.
    pub vel_down_mps: f64,
    /// Body x specific force, m/s².
    pub acc_x_mps2: f64,
    /// Body y specific force, m/s².
    pub acc_y_mps2: f64,
    /// Body z specific force, m/s².
    pub acc_z_mps2: f64,
}

impl AircraftState {
    /// Horizontal speed over ground, m/s.
    pub fn ground_speed_mps(&self) -> f64 {
        self.vel_north_mps.hypot(self.vel_east_mps)
    }

    /// Course over ground, radians from true north.
    pub fn course_rad(&self) -> f64 {
        self.vel_east_mps.atan2(self.vel_north_mps)
    }
}

impl Default for AircraftState {
    fn default() -> Self {
        Self {
            time_s: 0.0,
            roll_rad: 0.0,
            pitch_rad: 0.0,
            yaw_rad: 0.0,
            p_rad_s: 0.0,
            q_rad_s: 0.0,
            r_rad_s: 0.0,
            lat_rad: 0.0,
            lon_rad: 0.0,
            alt_m: 0.0,
            vel_north_mps: 0.0,
            vel_east_mps: 0.0,
            vel_down_mps: 0.0,
            acc_x_mps2: 0.0,
            acc_y_mps2: 0.0,
            // at rest the accelerometer reads -1 g on the body z axis
            acc_z_mps2: -STD_GRAVITY_MPS2,
        }
    }
}

/// Actuator-level command record relayed towards the dynamics engine.
///
/// Surface deflections are normalized to [-1, 1], throttle to [0, 1].
/// Replaced wholesale on every inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlCommand {
    pub aileron: f64,
    pub elevator: f64,
    pub rudder: f64,
    pub throttle: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_at_rest() {
        let state = AircraftState::default();
        assert_eq!(state.ground_speed_mps(), 0.0);
        assert_eq!(state.alt_m, 0.0);
        assert_eq!(state.acc_z_mps2, -STD_GRAVITY_MPS2);
    }

    #[test]
    fn ground_speed_and_course_follow_velocity() {
        let state = AircraftState {
            vel_north_mps: 3.0,
            vel_east_mps: 4.0,
            ..AircraftState::default()
        };
        assert!((state.ground_speed_mps() - 5.0).abs() < 1e-12);
        assert!((state.course_rad() - (4.0f64).atan2(3.0)).abs() < 1e-12);
    }
}
