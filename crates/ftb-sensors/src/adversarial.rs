//! ---
//! ftb_section: "04-sensor-models"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Nominal and adversarial sensor model families."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use ftb_common::config::AdversarialConfig;
use ftb_link::{
    AutopilotLink, InertialReading, LinkMessage, LinkPayload, PositionFix, StaticPressure,
};
use ftb_state::{AircraftState, EARTH_RADIUS_M};
use rand::prelude::*;
use rand_distr::Normal;

use crate::nominal::pressure_at_alt_pa;
use crate::SensorChannel;

/// Falsifying positioning sensor.
///
/// Reports a position displaced northward by a drift that grows linearly
/// with observation time, walking the autopilot's position solution away
/// from the true track while speed and course stay plausible.
#[derive(Debug)]
pub struct AdversarialGps {
    drift_mps: f64,
    last: Option<PositionFix>,
}

impl AdversarialGps {
    pub fn new(config: &AdversarialConfig) -> Self {
        Self {
            drift_mps: config.gps_drift_mps,
            last: None,
        }
    }
}

impl SensorChannel for AdversarialGps {
    fn name(&self) -> &'static str {
        "gps"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        let drift_m = self.drift_mps * state.time_s;
        self.last = Some(PositionFix {
            time_s: state.time_s,
            lat_rad: state.lat_rad + drift_m / EARTH_RADIUS_M,
            lon_rad: state.lon_rad,
            alt_m: state.alt_m,
            ground_speed_mps: state.ground_speed_mps(),
            course_rad: state.course_rad(),
        });
    }

    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        let fix = self
            .last
            .ok_or(ftb_link::LinkError::NoObservation(self.name()))?;
        link.send(LinkMessage::new(LinkPayload::Position(fix)))
    }
}

/// Falsifying inertial sensor.
///
/// Adds a constant bias to every body rate plus zero-mean Gaussian noise
/// on rates and specific forces. The noise stream is deterministic for a
/// given seed so harness runs stay reproducible.
#[derive(Debug)]
pub struct AdversarialImu {
    bias_rad_s: f64,
    noise: Normal<f64>,
    rng: StdRng,
    last: Option<InertialReading>,
}

impl AdversarialImu {
    pub fn new(config: &AdversarialConfig) -> Self {
        Self {
            bias_rad_s: config.imu_rate_bias_rad_s,
            noise: Normal::new(0.0, config.imu_noise_sigma.max(f64::MIN_POSITIVE))
                .expect("sigma must be positive"),
            rng: StdRng::seed_from_u64(config.seed),
            last: None,
        }
    }

    fn noise_sample(&mut self) -> f64 {
        self.noise.sample(&mut self.rng)
    }
}

impl SensorChannel for AdversarialImu {
    fn name(&self) -> &'static str {
        "imu"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        let reading = InertialReading {
            time_s: state.time_s,
            p_rad_s: state.p_rad_s + self.bias_rad_s + self.noise_sample(),
            q_rad_s: state.q_rad_s + self.bias_rad_s + self.noise_sample(),
            r_rad_s: state.r_rad_s + self.bias_rad_s + self.noise_sample(),
            acc_x_mps2: state.acc_x_mps2 + self.noise_sample(),
            acc_y_mps2: state.acc_y_mps2 + self.noise_sample(),
            acc_z_mps2: state.acc_z_mps2 + self.noise_sample(),
        };
        self.last = Some(reading);
    }

    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        let reading = self
            .last
            .ok_or(ftb_link::LinkError::NoObservation(self.name()))?;
        link.send(LinkMessage::new(LinkPayload::Inertial(reading)))
    }
}

/// Falsifying barometric sensor.
///
/// Freezes the reported pressure altitude at the first observed altitude
/// plus a configured offset, hiding any subsequent climb or descent.
#[derive(Debug)]
pub struct AdversarialBarometer {
    offset_m: f64,
    frozen_alt_m: Option<f64>,
    last: Option<StaticPressure>,
}

impl AdversarialBarometer {
    pub fn new(config: &AdversarialConfig) -> Self {
        Self {
            offset_m: config.pressure_alt_offset_m,
            frozen_alt_m: None,
            last: None,
        }
    }
}

impl SensorChannel for AdversarialBarometer {
    fn name(&self) -> &'static str {
        "pressure"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        let frozen = *self
            .frozen_alt_m
            .get_or_insert(state.alt_m + self.offset_m);
        self.last = Some(StaticPressure {
            time_s: state.time_s,
            pressure_pa: pressure_at_alt_pa(frozen),
            pressure_alt_m: frozen,
        });
    }

    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        let pressure = self
            .last
            .ok_or(ftb_link::LinkError::NoObservation(self.name()))?;
        link.send(LinkMessage::new(LinkPayload::Pressure(pressure)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftb_link::InMemoryLink;

    fn climb_state(time_s: f64, alt_m: f64) -> AircraftState {
        AircraftState {
            time_s,
            alt_m,
            lat_rad: 0.5,
            vel_north_mps: 20.0,
            ..AircraftState::default()
        }
    }

    #[test]
    fn gps_drift_grows_with_time() {
        let config = AdversarialConfig::default();
        let mut gps = AdversarialGps::new(&config);

        gps.derive_from(&climb_state(10.0, 1000.0));
        let early = gps.last.expect("fix");
        gps.derive_from(&climb_state(100.0, 1000.0));
        let late = gps.last.expect("fix");

        let early_err = early.lat_rad - 0.5;
        let late_err = late.lat_rad - 0.5;
        assert!(early_err > 0.0);
        assert!(late_err > early_err);
        assert_eq!(early.lon_rad, 0.0);
    }

    #[test]
    fn imu_noise_is_deterministic_per_seed() {
        let config = AdversarialConfig::default();
        let state = climb_state(5.0, 800.0);

        let mut a = AdversarialImu::new(&config);
        let mut b = AdversarialImu::new(&config);
        a.derive_from(&state);
        b.derive_from(&state);
        assert_eq!(a.last, b.last);

        let mut other_seed = AdversarialImu::new(&AdversarialConfig {
            seed: config.seed + 1,
            ..config
        });
        other_seed.derive_from(&state);
        assert_ne!(a.last, other_seed.last);
    }

    #[test]
    fn imu_output_differs_from_truth() {
        let config = AdversarialConfig::default();
        let state = climb_state(5.0, 800.0);
        let mut imu = AdversarialImu::new(&config);
        imu.derive_from(&state);
        let reading = imu.last.expect("reading");
        assert_ne!(reading.p_rad_s, state.p_rad_s);
    }

    #[test]
    fn barometer_hides_altitude_changes() {
        let config = AdversarialConfig::default();
        let link = InMemoryLink::new();
        let mut baro = AdversarialBarometer::new(&config);

        baro.dispatch(&climb_state(0.0, 1000.0), &link).expect("dispatch");
        baro.dispatch(&climb_state(30.0, 1600.0), &link).expect("dispatch");

        let sent = link.drain_sent();
        let alts: Vec<f64> = sent
            .iter()
            .map(|m| match &m.payload {
                LinkPayload::Pressure(p) => p.pressure_alt_m,
                other => panic!("unexpected payload {:?}", other),
            })
            .collect();
        assert_eq!(alts[0], 1000.0 + config.pressure_alt_offset_m);
        assert_eq!(alts[1], alts[0]);
    }
}
