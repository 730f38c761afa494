//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Runtime helpers supporting the driver loop."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

/// Paces the driver loop at a fixed tick interval.
///
/// The scheduler itself never sleeps; this pacer is the external loop's
/// cadence. Missed ticks are delayed rather than bursted so a stalled
/// iteration cannot fire a backlog of dispatch checks at once.
#[derive(Debug)]
pub struct TickPacer {
    period: Duration,
    interval: tokio::time::Interval,
}

impl TickPacer {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }

    /// Wait until the next tick boundary.
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    /// The configured tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}
