//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Runtime helpers supporting the driver loop."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
//! Tick pacing for the external driver loop that invokes the scheduler.

pub mod scheduling;

pub use scheduling::TickPacer;
