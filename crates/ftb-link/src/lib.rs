//! ---
//! ftb_section: "02-link-data-model"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Autopilot link schema, transports, and dynamics attachments."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Message schema and transports for the two external sides of the
//! bridge: the autopilot link (telemetry out, actuator commands in) and
//! the dynamics engine (state feed in, console commands out).

pub mod dynamics;
pub mod messages;
pub mod transport;

/// Shared result type for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Error taxonomy for link and console IO.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Wrapper for IO errors encountered on a transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for JSON encode/decode problems on the wire.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// A channel attempted to send before deriving an observation.
    #[error("no derived observation for channel {0}")]
    NoObservation(&'static str),
    /// The selected backend does not support the requested operation.
    #[error("link transport not available: {0}")]
    Unavailable(&'static str),
}

pub use dynamics::{DynamicsConsole, FdmFeed, InMemoryConsole, TcpConsole};
pub use messages::{
    ActuatorCommand, InertialReading, LinkMessage, LinkPayload, PositionFix, StateReport,
    StaticPressure, SCHEMA_VERSION,
};
pub use transport::{AutopilotLink, InMemoryLink, UdpJsonLink};
