//! ---
//! ftb_section: "05-state-estimation"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Canonical aircraft state records and estimation."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
//! Canonical aircraft state for the bridge: the immutable state snapshot,
//! actuator command record, the raw dynamics-engine frame, and the
//! estimator that converts between them.

pub mod aircraft;
pub mod estimator;
pub mod fdm;

/// Shared result type for state conversions.
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors raised while converting external dynamics data.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The dynamics feed delivered bytes that do not decode to a frame.
    #[error("malformed dynamics frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

pub use aircraft::{AircraftState, ControlCommand, STD_GRAVITY_MPS2};
pub use estimator::{StateEstimator, EARTH_RADIUS_M, SYNTHETIC_START_ALT_M};
pub use fdm::FdmFrame;
