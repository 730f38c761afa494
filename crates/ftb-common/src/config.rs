//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Shared primitives and utilities for the bridge runtime."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use tracing::debug;

use crate::logging::LogFormat;

fn default_mode() -> SensorMode {
    SensorMode::Nominal
}

fn default_imu_hz() -> f64 {
    200.0
}

fn default_gps_hz() -> f64 {
    10.0
}

fn default_pressure_hz() -> f64 {
    10.0
}

fn default_report_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_adversarial_seed() -> u64 {
    0x5EED_u64
}

fn default_gps_drift_mps() -> f64 {
    2.0
}

fn default_imu_rate_bias_rad_s() -> f64 {
    0.02
}

fn default_imu_noise_sigma() -> f64 {
    0.05
}

fn default_pressure_alt_offset_m() -> f64 {
    150.0
}

fn default_synthetic_speed_mps() -> f64 {
    25.0
}

/// Primary configuration object for the bridge runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default = "default_mode")]
    pub mode: SensorMode,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub synthetic: SyntheticConfig,
    #[serde(default)]
    pub adversarial: AdversarialConfig,
}

impl BridgeConfig {
    pub const ENV_CONFIG_PATH: &str = "FTB_CONFIG";

    /// Load configuration from disk, respecting the `FTB_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                return Self::from_path(PathBuf::from(env_path));
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                return Self::from_path(candidate.as_ref().to_path_buf());
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<BridgeConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.channels.validate()?;
        self.link.validate()?;
        if self.synthetic.enabled && self.synthetic.speed_mps < 0.0 {
            return Err(anyhow!("synthetic speed_mps must be non-negative"));
        }
        Ok(())
    }
}

impl std::str::FromStr for BridgeConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: BridgeConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Sensor-model family used for the lifetime of a run.
///
/// Selected once at construction; there is no runtime toggle.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    #[default]
    Nominal,
    Adversarial,
}

impl SensorMode {
    pub fn is_adversarial(&self) -> bool {
        matches!(self, SensorMode::Adversarial)
    }
}

impl std::str::FromStr for SensorMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nominal" => Ok(SensorMode::Nominal),
            "adversarial" => Ok(SensorMode::Adversarial),
            other => Err(format!("unknown sensor mode: {}", other)),
        }
    }
}

/// Target dispatch rates for the three telemetry channels.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_imu_hz")]
    pub imu_hz: f64,
    #[serde(default = "default_gps_hz")]
    pub gps_hz: f64,
    #[serde(default = "default_pressure_hz")]
    pub pressure_hz: f64,
    #[serde(default = "default_report_interval")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub report_interval: Duration,
}

impl ChannelConfig {
    pub fn imu_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.imu_hz)
    }

    pub fn gps_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.gps_hz)
    }

    pub fn pressure_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.pressure_hz)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, hz) in [
            ("imu_hz", self.imu_hz),
            ("gps_hz", self.gps_hz),
            ("pressure_hz", self.pressure_hz),
        ] {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(anyhow!("channel rate {} must be positive, got {}", name, hz));
            }
        }
        if self.report_interval.is_zero() {
            return Err(anyhow!("report_interval must be positive"));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            imu_hz: default_imu_hz(),
            gps_hz: default_gps_hz(),
            pressure_hz: default_pressure_hz(),
            report_interval: default_report_interval(),
        }
    }
}

/// Transport backends for the autopilot link.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkTransport {
    /// Process-local queue, for tests and single-process integration.
    #[default]
    InMemory,
    /// JSON datagrams over UDP.
    Udp,
}

/// Endpoints for the autopilot link and the dynamics-engine attachments.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkConfig {
    #[serde(default)]
    pub transport: LinkTransport,
    /// Local address the UDP link binds to.
    #[serde(default)]
    pub udp_bind: Option<SocketAddr>,
    /// Autopilot peer address for outbound telemetry datagrams.
    #[serde(default)]
    pub udp_peer: Option<SocketAddr>,
    /// Local address the raw dynamics state feed binds to.
    #[serde(default)]
    pub fdm_bind: Option<SocketAddr>,
    /// Dynamics-engine console endpoint for actuator commands.
    #[serde(default)]
    pub console_addr: Option<SocketAddr>,
}

impl LinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.transport == LinkTransport::Udp {
            if self.udp_bind.is_none() {
                return Err(anyhow!("link.udp_bind is required for the udp transport"));
            }
            if self.udp_peer.is_none() {
                return Err(anyhow!("link.udp_peer is required for the udp transport"));
            }
        }
        Ok(())
    }
}

/// Parameters for the synthetic dead-reckoning test mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Commanded speed over ground in m/s.
    #[serde(default = "default_synthetic_speed_mps")]
    pub speed_mps: f64,
    /// Commanded course over ground in radians from true north.
    #[serde(default)]
    pub course_rad: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed_mps: default_synthetic_speed_mps(),
            course_rad: 0.0,
        }
    }
}

/// Perturbation magnitudes for the adversarial sensor family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdversarialConfig {
    #[serde(default = "default_adversarial_seed")]
    pub seed: u64,
    /// Horizontal speed of the injected GPS position drift.
    #[serde(default = "default_gps_drift_mps")]
    pub gps_drift_mps: f64,
    /// Constant bias added to every IMU body rate.
    #[serde(default = "default_imu_rate_bias_rad_s")]
    pub imu_rate_bias_rad_s: f64,
    /// Standard deviation of the Gaussian noise on IMU outputs.
    #[serde(default = "default_imu_noise_sigma")]
    pub imu_noise_sigma: f64,
    /// Offset applied to the frozen pressure altitude.
    #[serde(default = "default_pressure_alt_offset_m")]
    pub pressure_alt_offset_m: f64,
}

impl Default for AdversarialConfig {
    fn default() -> Self {
        Self {
            seed: default_adversarial_seed(),
            gps_drift_mps: default_gps_drift_mps(),
            imu_rate_bias_rad_s: default_imu_rate_bias_rad_s(),
            imu_noise_sigma: default_imu_noise_sigma(),
            pressure_alt_offset_m: default_pressure_alt_offset_m(),
        }
    }
}

/// Logging destination and format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_rates_cover_the_three_channels() {
        let config = BridgeConfig::default();
        assert_eq!(config.mode, SensorMode::Nominal);
        assert_eq!(config.channels.imu_period(), Duration::from_secs_f64(1.0 / 200.0));
        assert_eq!(config.channels.gps_period(), Duration::from_secs_f64(1.0 / 10.0));
        assert_eq!(config.channels.pressure_period(), Duration::from_secs_f64(1.0 / 10.0));
        assert_eq!(config.channels.report_interval, Duration::from_secs(1));
        config.validate().expect("defaults validate");
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: BridgeConfig = r#"
            mode = "adversarial"

            [channels]
            imu_hz = 100.0

            [synthetic]
            enabled = true
            speed_mps = 10.0
            course_rad = 1.5707963
        "#
        .parse()
        .expect("config parses");
        assert!(config.mode.is_adversarial());
        assert_eq!(config.channels.imu_hz, 100.0);
        assert_eq!(config.channels.gps_hz, 10.0);
        assert!(config.synthetic.enabled);
    }

    #[test]
    fn rejects_non_positive_rates() {
        let result: std::result::Result<BridgeConfig, _> = r#"
            [channels]
            gps_hz = 0.0
        "#
        .parse::<BridgeConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn udp_transport_requires_endpoints() {
        let result = r#"
            [link]
            transport = "udp"
        "#
        .parse::<BridgeConfig>();
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_candidate_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "mode = \"nominal\"").expect("write config");
        let config =
            BridgeConfig::load(&[file.path()]).expect("load from candidate");
        assert_eq!(config.mode, SensorMode::Nominal);
    }
}
