//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Shared primitives and utilities for the bridge runtime."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
//! Shared foundations for the FTB workspace: configuration loading,
//! tracing bootstrap, and the injectable monotonic clock.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    AdversarialConfig, BridgeConfig, ChannelConfig, LinkConfig, LinkTransport, LoggingConfig,
    SensorMode, SyntheticConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::{Clock, ManualClock, SystemClock};
