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

use crate::Result;

/// Raw state frame as published by the external dynamics engine.
///
/// The field set mirrors what the engine emits on its state feed; the
/// engine owns the schema and the bridge only decodes it. Conversion to
/// [`crate::AircraftState`] happens in the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FdmFrame {
    pub sim_time_s: f64,
    pub phi_rad: f64,
    pub theta_rad: f64,
    pub psi_rad: f64,
    pub p_rad_s: f64,
    pub q_rad_s: f64,
    pub r_rad_s: f64,
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub altitude_m: f64,
    pub v_north_mps: f64,
    pub v_east_mps: f64,
    pub v_down_mps: f64,
    pub ax_mps2: f64,
    pub ay_mps2: f64,
    pub az_mps2: f64,
}

impl FdmFrame {
    /// Decode a raw feed datagram.
    ///
    /// Malformed input surfaces as [`crate::StateError::MalformedFrame`];
    /// the caller decides whether to drop the frame or abort.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode a frame the way the dynamics engine does, for harness use.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("frame serialization is infallible")
    }
}
