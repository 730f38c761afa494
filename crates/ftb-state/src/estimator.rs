//! ---
//! ftb_section: "05-state-estimation"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Canonical aircraft state records and estimation."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::time::Instant;

use crate::aircraft::{AircraftState, STD_GRAVITY_MPS2};
use crate::fdm::FdmFrame;

/// Spherical earth radius used by the dead-reckoning integration, metres.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Fixed initial altitude of the synthetic test mode, metres.
pub const SYNTHETIC_START_ALT_M: f64 = 1000.0;

/// Converts dynamics-engine output into canonical state snapshots and,
/// in synthetic test mode, dead-reckons a state from commanded speed and
/// course alone.
///
/// Both conversions are pure: each call returns a fresh snapshot and
/// touches no shared state. The synthetic mode measures elapsed time from
/// `epoch`, captured exactly once when the estimator is built.
#[derive(Debug, Clone, Copy)]
pub struct StateEstimator {
    epoch: Instant,
}

impl StateEstimator {
    pub fn new(epoch: Instant) -> Self {
        Self { epoch }
    }

    /// Convert a structurally valid dynamics frame into canonical state.
    pub fn from_dynamics(&self, frame: &FdmFrame) -> AircraftState {
        AircraftState {
            time_s: frame.sim_time_s,
            roll_rad: frame.phi_rad,
            pitch_rad: frame.theta_rad,
            yaw_rad: frame.psi_rad,
            p_rad_s: frame.p_rad_s,
            q_rad_s: frame.q_rad_s,
            r_rad_s: frame.r_rad_s,
            lat_rad: frame.latitude_rad,
            lon_rad: frame.longitude_rad,
            alt_m: frame.altitude_m,
            vel_north_mps: frame.v_north_mps,
            vel_east_mps: frame.v_east_mps,
            vel_down_mps: frame.v_down_mps,
            acc_x_mps2: frame.ax_mps2,
            acc_y_mps2: frame.ay_mps2,
            acc_z_mps2: frame.az_mps2,
        }
    }

    /// Dead-reckon a state from commanded speed and course over ground.
    ///
    /// Flat-earth integration from the origin: latitude follows the north
    /// velocity, longitude the east velocity scaled by `cos(lat)`, and
    /// altitude stays at [`SYNTHETIC_START_ALT_M`] since the down velocity
    /// is zero in this mode.
    ///
    /// The `cos(lat)` division diverges as latitude approaches ±90°. This
    /// is a known limitation of the synthetic mode and is intentionally
    /// not guarded; callers operating near the poles must supply a
    /// different estimator.
    pub fn synthetic(&self, sog_mps: f64, cog_rad: f64, now: Instant) -> AircraftState {
        let elapsed_s = now.duration_since(self.epoch).as_secs_f64();

        let vel_north = sog_mps * cog_rad.cos();
        let vel_east = sog_mps * cog_rad.sin();
        let vel_down = 0.0;

        let lat_dot = vel_north / EARTH_RADIUS_M;
        let lat = lat_dot * elapsed_s;
        let lon_dot = vel_east / EARTH_RADIUS_M / lat.cos();
        let lon = lon_dot * elapsed_s;
        let alt = SYNTHETIC_START_ALT_M - vel_down * elapsed_s;

        AircraftState {
            time_s: elapsed_s,
            roll_rad: 0.0,
            pitch_rad: 0.0,
            yaw_rad: cog_rad,
            p_rad_s: 0.0,
            q_rad_s: 0.0,
            r_rad_s: 0.0,
            lat_rad: lat,
            lon_rad: lon,
            alt_m: alt,
            vel_north_mps: vel_north,
            vel_east_mps: vel_east,
            vel_down_mps: vel_down,
            acc_x_mps2: 0.0,
            acc_y_mps2: 0.0,
            acc_z_mps2: -STD_GRAVITY_MPS2,
        }
    }
}
