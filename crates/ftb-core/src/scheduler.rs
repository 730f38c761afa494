//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Telemetry dispatch scheduler and control relay."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::{Duration, Instant};

use ftb_common::config::ChannelConfig;
use ftb_common::time::Clock;
use ftb_link::{ActuatorCommand, AutopilotLink, DynamicsConsole, LinkError, LinkMessage, LinkPayload, StateReport};
use ftb_sensors::SensorSet;
use ftb_state::{AircraftState, ControlCommand, FdmFrame, StateEstimator};
use tracing::info;

use crate::relay::ControlRelay;

/// Dispatch failure on one telemetry channel.
#[derive(Debug, thiserror::Error)]
#[error("channel {channel}: {source}")]
pub struct ChannelError {
    pub channel: &'static str,
    #[source]
    pub source: LinkError,
}

/// Per-channel dispatch counts accumulated over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateReport {
    pub imu_hz: u32,
    pub gps_hz: u32,
    pub pressure_hz: u32,
}

/// What one scheduler tick did.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Channels that fired this tick, in check order.
    pub fired: Vec<&'static str>,
    /// Dispatch failures; one channel failing never stops the others.
    pub errors: Vec<ChannelError>,
    /// Present on the tick that closed a reporting window.
    pub report: Option<RateReport>,
}

/// Per-channel dispatch timer.
///
/// `last_fire` only advances, and only when the channel actually fires.
#[derive(Debug)]
struct ChannelTimer {
    period: Duration,
    last_fire: Instant,
    fire_count: u32,
}

impl ChannelTimer {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last_fire: now,
            fire_count: 0,
        }
    }

    fn due(&self, now: Instant) -> bool {
        now.duration_since(self.last_fire) > self.period
    }

    fn mark_fired(&mut self, now: Instant) {
        self.last_fire = now;
        self.fire_count += 1;
    }

    fn take_count(&mut self) -> u32 {
        std::mem::take(&mut self.fire_count)
    }
}

/// Tick-driven dispatcher for the three telemetry channels.
///
/// Owns the sensor set, the state estimator, the control relay, and the
/// current state and command records. Driven by repeated external
/// invocation of [`tick`]; it never sleeps, spawns, or retries. Channel
/// periods are targets: the realized rate is bounded above by how often
/// the external driver ticks.
///
/// [`tick`]: TelemetryScheduler::tick
pub struct TelemetryScheduler {
    clock: Arc<dyn Clock>,
    sensors: SensorSet,
    estimator: StateEstimator,
    relay: ControlRelay,
    state: AircraftState,
    controls: ControlCommand,
    gps: ChannelTimer,
    imu: ChannelTimer,
    pressure: ChannelTimer,
    report_interval: Duration,
    last_report: Instant,
}

impl TelemetryScheduler {
    /// Build a scheduler; the construction instant becomes the epoch for
    /// the synthetic estimator and the initial `last_fire` of every
    /// channel.
    pub fn new(clock: Arc<dyn Clock>, sensors: SensorSet, channels: &ChannelConfig) -> Self {
        let epoch = clock.now();
        Self {
            sensors,
            estimator: StateEstimator::new(epoch),
            relay: ControlRelay::new(),
            state: AircraftState::default(),
            controls: ControlCommand::default(),
            gps: ChannelTimer::new(channels.gps_period(), epoch),
            imu: ChannelTimer::new(channels.imu_period(), epoch),
            pressure: ChannelTimer::new(channels.pressure_period(), epoch),
            report_interval: channels.report_interval,
            last_report: epoch,
            clock,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &AircraftState {
        &self.state
    }

    /// Most recently relayed actuator command.
    pub fn controls(&self) -> &ControlCommand {
        &self.controls
    }

    /// Replace the state snapshot from a dynamics-engine frame.
    pub fn ingest_dynamics(&mut self, frame: &FdmFrame) {
        self.state = self.estimator.from_dynamics(frame);
    }

    /// Replace the state snapshot by dead reckoning from commanded speed
    /// and course, for runs without an attached dynamics engine.
    pub fn refresh_synthetic(&mut self, sog_mps: f64, cog_rad: f64) {
        let now = self.clock.now();
        self.state = self.estimator.synthetic(sog_mps, cog_rad, now);
    }

    /// Accept an actuator command from the link and relay it to the
    /// dynamics console. The command record is replaced wholesale before
    /// the relay attempt, so a console failure never leaves a half-applied
    /// command.
    pub fn handle_command(
        &mut self,
        command: &ActuatorCommand,
        console: &mut dyn DynamicsConsole,
    ) -> ftb_link::Result<()> {
        self.controls = self.relay.accept_from_link(command);
        self.relay.relay_to_dynamics(&self.controls, console)
    }

    /// Send the full canonical state as a single passthrough report.
    pub fn send_state_report(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        link.send(LinkMessage::new(LinkPayload::State(StateReport {
            state: self.state,
        })))
    }

    /// Run one dispatch pass.
    ///
    /// Channels are checked in fixed order: positioning, inertial,
    /// barometric. Each check reads a fresh timestamp from the injected
    /// clock rather than sharing one tick-wide snapshot; the resulting
    /// inter-channel skew is observable behavior and deliberate. A channel
    /// whose period has elapsed advances its timer, dispatches
    /// derive-then-send, and counts the fire; failures are collected,
    /// never masked, and never stop the remaining checks.
    pub fn tick(&mut self, link: &dyn AutopilotLink) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let state = self.state;

        let now = self.clock.now();
        if self.gps.due(now) {
            self.gps.mark_fired(now);
            outcome.fired.push(self.sensors.gps.name());
            if let Err(source) = self.sensors.gps.dispatch(&state, link) {
                outcome.errors.push(ChannelError {
                    channel: self.sensors.gps.name(),
                    source,
                });
            }
        }

        let now = self.clock.now();
        if self.imu.due(now) {
            self.imu.mark_fired(now);
            outcome.fired.push(self.sensors.imu.name());
            if let Err(source) = self.sensors.imu.dispatch(&state, link) {
                outcome.errors.push(ChannelError {
                    channel: self.sensors.imu.name(),
                    source,
                });
            }
        }

        let now = self.clock.now();
        if self.pressure.due(now) {
            self.pressure.mark_fired(now);
            outcome.fired.push(self.sensors.pressure.name());
            if let Err(source) = self.sensors.pressure.dispatch(&state, link) {
                outcome.errors.push(ChannelError {
                    channel: self.sensors.pressure.name(),
                    source,
                });
            }
        }

        let now = self.clock.now();
        if now.duration_since(self.last_report) > self.report_interval {
            self.last_report = now;
            let report = RateReport {
                imu_hz: self.imu.take_count(),
                gps_hz: self.gps.take_count(),
                pressure_hz: self.pressure.take_count(),
            };
            info!(
                imu_hz = report.imu_hz,
                gps_hz = report.gps_hz,
                pressure_hz = report.pressure_hz,
                "sensor dispatch rates"
            );
            outcome.report = Some(report);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftb_common::config::{AdversarialConfig, SensorMode};
    use ftb_common::time::ManualClock;
    use ftb_link::InMemoryLink;

    fn test_channels() -> ChannelConfig {
        ChannelConfig {
            imu_hz: 200.0,
            gps_hz: 10.0,
            pressure_hz: 10.0,
            report_interval: Duration::from_secs(1),
        }
    }

    fn scheduler_with_clock(sensors: SensorSet) -> (TelemetryScheduler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let scheduler = TelemetryScheduler::new(clock.clone(), sensors, &test_channels());
        (scheduler, clock)
    }

    #[test]
    fn channel_fires_only_after_its_period_elapses() {
        let link = InMemoryLink::new();
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());

        // imu period is 5 ms; at exactly 5 ms elapsed nothing is due yet
        clock.advance(Duration::from_millis(5));
        let outcome = scheduler.tick(&link);
        assert!(outcome.fired.is_empty());

        clock.advance(Duration::from_millis(1));
        let outcome = scheduler.tick(&link);
        assert_eq!(outcome.fired, vec!["imu"]);
        assert_eq!(link.drain_sent().len(), 1);
    }

    #[test]
    fn channels_are_checked_in_fixed_order() {
        let link = InMemoryLink::new();
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());

        // past every period: all three fire in check order
        clock.advance(Duration::from_millis(150));
        let outcome = scheduler.tick(&link);
        assert_eq!(outcome.fired, vec!["gps", "imu", "pressure"]);
    }

    #[test]
    fn report_window_resets_counts_in_the_same_tick() {
        let link = InMemoryLink::new();
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());

        for _ in 0..200 {
            clock.advance(Duration::from_millis(6));
            scheduler.tick(&link);
        }
        // 1.2 s elapsed: exactly one report fired along the way
        let mut reports = Vec::new();
        clock.advance(Duration::from_millis(6));
        let outcome = scheduler.tick(&link);
        if let Some(report) = outcome.report {
            reports.push(report);
        }

        // the window that produced a report left the counters at zero;
        // drive one more window and check the next report only covers it
        let mut next_report = None;
        for _ in 0..200 {
            clock.advance(Duration::from_millis(6));
            if let Some(report) = scheduler.tick(&link).report {
                next_report = Some(report);
                break;
            }
        }
        let report = next_report.expect("second reporting window closes");
        // 6 ms steps, 5 ms imu period: one fire per step, ~167 per window
        assert!(report.imu_hz > 0);
        assert!(report.imu_hz <= 200);
        assert!(report.gps_hz <= 10);
    }

    #[test]
    fn family_selection_never_changes_dispatch_timing() {
        let nominal_link = InMemoryLink::new();
        let adversarial_link = InMemoryLink::new();
        let clock = Arc::new(ManualClock::new());
        let channels = test_channels();
        let mut nominal =
            TelemetryScheduler::new(clock.clone(), SensorSet::nominal(), &channels);
        let mut adversarial = TelemetryScheduler::new(
            clock.clone(),
            SensorSet::adversarial(&AdversarialConfig::default()),
            &channels,
        );

        for _ in 0..500 {
            clock.advance(Duration::from_millis(1));
            let a = nominal.tick(&nominal_link);
            let b = adversarial.tick(&adversarial_link);
            assert_eq!(a.fired, b.fired);
        }
        assert_eq!(nominal_link.sent_len(), adversarial_link.sent_len());
    }

    #[test]
    fn one_failing_channel_does_not_stop_the_others() {
        struct PositionRejectingLink {
            inner: InMemoryLink,
        }
        impl AutopilotLink for PositionRejectingLink {
            fn send(&self, msg: LinkMessage) -> ftb_link::Result<()> {
                if msg.kind() == "position" {
                    return Err(LinkError::Unavailable("position path down"));
                }
                self.inner.send(msg)
            }
            fn poll(&self) -> ftb_link::Result<Option<LinkMessage>> {
                self.inner.poll()
            }
            fn name(&self) -> &'static str {
                "position_rejecting"
            }
        }

        let link = PositionRejectingLink {
            inner: InMemoryLink::new(),
        };
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());

        clock.advance(Duration::from_millis(150));
        let outcome = scheduler.tick(&link);
        assert_eq!(outcome.fired, vec!["gps", "imu", "pressure"]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].channel, "gps");
        // imu and pressure still made it out
        assert_eq!(link.inner.drain_sent().len(), 2);

        // the failure does not poison later ticks
        clock.advance(Duration::from_millis(150));
        let outcome = scheduler.tick(&link);
        assert_eq!(outcome.fired, vec!["gps", "imu", "pressure"]);
    }

    #[test]
    fn state_is_replaced_wholesale_from_dynamics_frames() {
        let (mut scheduler, _clock) = scheduler_with_clock(SensorSet::nominal());
        let frame = FdmFrame {
            sim_time_s: 9.0,
            phi_rad: 0.0,
            theta_rad: 0.0,
            psi_rad: 0.0,
            p_rad_s: 0.0,
            q_rad_s: 0.0,
            r_rad_s: 0.0,
            latitude_rad: 0.4,
            longitude_rad: 0.8,
            altitude_m: 2500.0,
            v_north_mps: 15.0,
            v_east_mps: 0.0,
            v_down_mps: 0.0,
            ax_mps2: 0.0,
            ay_mps2: 0.0,
            az_mps2: -9.8,
        };
        scheduler.ingest_dynamics(&frame);
        assert_eq!(scheduler.state().alt_m, 2500.0);
        assert_eq!(scheduler.state().lat_rad, 0.4);
    }

    #[test]
    fn synthetic_refresh_tracks_the_injected_clock() {
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());
        clock.advance(Duration::from_secs(100));
        scheduler.refresh_synthetic(10.0, 0.0);
        let state = scheduler.state();
        let expected_lat = 10.0 / ftb_state::EARTH_RADIUS_M * 100.0;
        assert!((state.lat_rad - expected_lat).abs() < 1e-12);
        assert_eq!(state.lon_rad, 0.0);
    }

    #[test]
    fn commands_update_the_record_and_reach_the_console() {
        let (mut scheduler, _clock) = scheduler_with_clock(SensorSet::nominal());
        let mut console = ftb_link::InMemoryConsole::new();
        let command = ActuatorCommand {
            aileron: -0.1,
            elevator: 0.2,
            rudder: 0.0,
            throttle: 0.9,
        };
        scheduler
            .handle_command(&command, &mut console)
            .expect("relay succeeds");
        assert_eq!(scheduler.controls().throttle, 0.9);
        assert_eq!(console.lines().len(), 4);
    }

    #[test]
    fn state_report_carries_the_current_snapshot() {
        let link = InMemoryLink::new();
        let (mut scheduler, clock) = scheduler_with_clock(SensorSet::nominal());
        clock.advance(Duration::from_secs(10));
        scheduler.refresh_synthetic(20.0, 0.0);
        scheduler.send_state_report(&link).expect("report sent");
        let sent = link.drain_sent();
        assert_eq!(sent.len(), 1);
        match &sent[0].payload {
            LinkPayload::State(report) => {
                assert_eq!(report.state.vel_north_mps, 20.0);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn for_mode_builds_a_working_scheduler() {
        let link = InMemoryLink::new();
        let clock = Arc::new(ManualClock::new());
        let sensors = SensorSet::for_mode(SensorMode::Adversarial, &AdversarialConfig::default());
        let mut scheduler = TelemetryScheduler::new(clock.clone(), sensors, &test_channels());
        clock.advance(Duration::from_millis(150));
        let outcome = scheduler.tick(&link);
        assert_eq!(outcome.fired.len(), 3);
        assert!(outcome.errors.is_empty());
    }
}
