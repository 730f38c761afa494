//! ---
//! ftb_section: "04-sensor-models"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Nominal and adversarial sensor model families."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use ftb_link::{
    AutopilotLink, InertialReading, LinkMessage, LinkPayload, PositionFix, StaticPressure,
};
use ftb_state::AircraftState;

use crate::SensorChannel;

/// Sea-level standard pressure, pascals.
pub(crate) const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Static pressure at altitude per the standard-atmosphere lapse model.
pub(crate) fn pressure_at_alt_pa(alt_m: f64) -> f64 {
    SEA_LEVEL_PRESSURE_PA * (1.0 - 2.25577e-5 * alt_m).powf(5.25588)
}

/// Nominal positioning sensor: passes the true position through.
#[derive(Debug, Default)]
pub struct NominalGps {
    last: Option<PositionFix>,
}

impl NominalGps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorChannel for NominalGps {
    fn name(&self) -> &'static str {
        "gps"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        self.last = Some(PositionFix {
            time_s: state.time_s,
            lat_rad: state.lat_rad,
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

/// Nominal inertial sensor: true body rates and specific force.
#[derive(Debug, Default)]
pub struct NominalImu {
    last: Option<InertialReading>,
}

impl NominalImu {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorChannel for NominalImu {
    fn name(&self) -> &'static str {
        "imu"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        self.last = Some(InertialReading {
            time_s: state.time_s,
            p_rad_s: state.p_rad_s,
            q_rad_s: state.q_rad_s,
            r_rad_s: state.r_rad_s,
            acc_x_mps2: state.acc_x_mps2,
            acc_y_mps2: state.acc_y_mps2,
            acc_z_mps2: state.acc_z_mps2,
        });
    }

    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        let reading = self
            .last
            .ok_or(ftb_link::LinkError::NoObservation(self.name()))?;
        link.send(LinkMessage::new(LinkPayload::Inertial(reading)))
    }
}

/// Nominal barometric sensor: standard-atmosphere pressure at true altitude.
#[derive(Debug, Default)]
pub struct NominalBarometer {
    last: Option<StaticPressure>,
}

impl NominalBarometer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorChannel for NominalBarometer {
    fn name(&self) -> &'static str {
        "pressure"
    }

    fn derive_from(&mut self, state: &AircraftState) {
        self.last = Some(StaticPressure {
            time_s: state.time_s,
            pressure_pa: pressure_at_alt_pa(state.alt_m),
            pressure_alt_m: state.alt_m,
        });
    }

    fn encode_and_send(&self, link: &dyn AutopilotLink) -> ftb_link::Result<()> {
        let pressure = self
            .last
            .ok_or(ftb_link::LinkError::NoObservation(self.name()))?;
        link.send(LinkMessage::new(LinkPayload::Pressure(pressure)))
    }
}
