//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Telemetry dispatch scheduler and control relay."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
//! The bridge core: the tick-driven telemetry scheduler with its three
//! independent channel timers, and the relay that forwards actuator
//! commands from the autopilot link to the dynamics-engine console.

pub mod relay;
pub mod scheduler;

pub use relay::ControlRelay;
pub use scheduler::{ChannelError, RateReport, TelemetryScheduler, TickOutcome};
