//! ---
//! ftb_section: "04-sensor-models"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Nominal and adversarial sensor model families."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
//! Sensor models for the three telemetry channels. Two interchangeable
//! families exist: the nominal family maps true state to observations,
//! the adversarial family falsifies them for robustness testing of the
//! autopilot under test. The family is selected once at construction and
//! both satisfy the same [`SensorChannel`] contract, so the scheduler is
//! oblivious to the choice.

pub mod adversarial;
pub mod nominal;

use ftb_common::config::{AdversarialConfig, SensorMode};
use ftb_link::AutopilotLink;
use ftb_state::AircraftState;

pub use adversarial::{AdversarialBarometer, AdversarialGps, AdversarialImu};
pub use nominal::{NominalBarometer, NominalGps, NominalImu};

/// Contract every telemetry channel satisfies.
///
/// `derive_from` computes the channel's observation from the true state;
/// `encode_and_send` serializes the most recently derived observation and
/// writes it to the link. The scheduler always goes through [`dispatch`],
/// which sequences derive-then-send; sending without a prior derivation
/// surfaces [`ftb_link::LinkError::NoObservation`].
///
/// [`dispatch`]: SensorChannel::dispatch
pub trait SensorChannel: Send {
    /// Channel name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Compute this channel's observation from the true state.
    fn derive_from(&mut self, state: &AircraftState);

    /// Serialize the last derived observation and write it to the link.
    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()>;

    /// Derive from `state` and immediately send, in that order.
    fn dispatch(&mut self, state: &AircraftState, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        self.derive_from(state);
        self.encode_and_send(link)
    }
}

/// The bundle of three sensor instances the scheduler owns.
///
/// Exactly one family is active per channel per run; families are never
/// mixed and never swapped after construction.
pub struct SensorSet {
    /// Positioning channel.
    pub gps: Box<dyn SensorChannel>,
    /// Inertial channel.
    pub imu: Box<dyn SensorChannel>,
    /// Barometric channel.
    pub pressure: Box<dyn SensorChannel>,
}

impl SensorSet {
    /// Build the nominal family.
    pub fn nominal() -> Self {
        Self {
            gps: Box::new(NominalGps::new()),
            imu: Box::new(NominalImu::new()),
            pressure: Box::new(NominalBarometer::new()),
        }
    }

    /// Build the adversarial family with the configured perturbations.
    pub fn adversarial(config: &AdversarialConfig) -> Self {
        Self {
            gps: Box::new(AdversarialGps::new(config)),
            imu: Box::new(AdversarialImu::new(config)),
            pressure: Box::new(AdversarialBarometer::new(config)),
        }
    }

    /// Select the family for the configured operating mode.
    pub fn for_mode(mode: SensorMode, config: &AdversarialConfig) -> Self {
        match mode {
            SensorMode::Nominal => Self::nominal(),
            SensorMode::Adversarial => Self::adversarial(config),
        }
    }
}

impl std::fmt::Debug for SensorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSet")
            .field("gps", &self.gps.name())
            .field("imu", &self.imu.name())
            .field("pressure", &self.pressure.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftb_link::InMemoryLink;

    #[test]
    fn send_before_derive_is_rejected() {
        let link = InMemoryLink::new();
        let set = SensorSet::nominal();
        let err = set.gps.encode_and_send(&link).unwrap_err();
        assert!(matches!(err, ftb_link::LinkError::NoObservation("gps")));
        assert_eq!(link.sent_len(), 0);
    }

    #[test]
    fn dispatch_derives_then_sends() {
        let link = InMemoryLink::new();
        let mut set = SensorSet::nominal();
        let state = AircraftState::default();
        set.imu.dispatch(&state, &link).expect("dispatch");
        let sent = link.drain_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind(), "inertial");
    }

    #[test]
    fn mode_selection_picks_the_family() {
        let config = AdversarialConfig::default();
        let nominal = SensorSet::for_mode(SensorMode::Nominal, &config);
        let adversarial = SensorSet::for_mode(SensorMode::Adversarial, &config);
        assert_eq!(nominal.gps.name(), "gps");
        assert_eq!(adversarial.gps.name(), "gps");
    }
}
