//! ---
//! ftb_section: "01-core-functionality"
//! ftb_subsection: "binary"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Binary entrypoint for the FTB daemon."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ftb_common::config::{BridgeConfig, LinkTransport, SensorMode};
use ftb_common::logging::init_tracing;
use ftb_common::time::SystemClock;
use ftb_core::TelemetryScheduler;
use ftb_link::{
    AutopilotLink, DynamicsConsole, FdmFeed, InMemoryConsole, InMemoryLink, LinkPayload,
    TcpConsole, UdpJsonLink,
};
use ftb_rt::TickPacer;
use ftb_sensors::SensorSet;
use ftb_state::FdmFrame;
use tokio::signal;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "FTB daemon: bridges a flight-dynamics model to an autopilot link",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Override the sensor-model family")]
    mode: Option<CliMode>,

    #[arg(long, help = "Force the synthetic dead-reckoning state source")]
    synthetic: bool,

    #[arg(long, value_name = "HZ", default_value_t = 1000.0, help = "Driver tick rate")]
    tick_hz: f64,

    #[arg(long, value_name = "SECONDS", help = "Stop after this many seconds")]
    duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Nominal,
    Adversarial,
}

impl From<CliMode> for SensorMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Nominal => SensorMode::Nominal,
            CliMode::Adversarial => SensorMode::Adversarial,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/ftbd.toml"));
    candidates.push(PathBuf::from("configs/example.dev.toml"));

    let mut config = BridgeConfig::load(&candidates)?;
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    if cli.synthetic {
        config.synthetic.enabled = true;
    }
    if !cli.tick_hz.is_finite() || cli.tick_hz <= 0.0 {
        anyhow::bail!("--tick-hz must be positive, got {}", cli.tick_hz);
    }

    init_tracing("ftbd", &config.logging)?;
    run(config, cli.tick_hz, cli.duration).await
}

async fn run(config: BridgeConfig, tick_hz: f64, duration: Option<f64>) -> Result<()> {
    let link: Box<dyn AutopilotLink> = match config.link.transport {
        LinkTransport::InMemory => Box::new(InMemoryLink::new()),
        LinkTransport::Udp => {
            let bind = config
                .link
                .udp_bind
                .context("link.udp_bind missing for udp transport")?;
            let peer = config
                .link
                .udp_peer
                .context("link.udp_peer missing for udp transport")?;
            Box::new(UdpJsonLink::bind(bind, peer).context("unable to bind autopilot link")?)
        }
    };

    let mut console: Box<dyn DynamicsConsole> = match config.link.console_addr {
        Some(addr) => Box::new(
            TcpConsole::connect(addr)
                .with_context(|| format!("unable to reach dynamics console at {}", addr))?,
        ),
        None => Box::new(InMemoryConsole::new()),
    };

    let feed = match config.link.fdm_bind {
        Some(addr) => {
            Some(FdmFeed::bind(addr).context("unable to bind the dynamics state feed")?)
        }
        None => None,
    };

    let sensors = SensorSet::for_mode(config.mode, &config.adversarial);
    let mut scheduler = TelemetryScheduler::new(Arc::new(SystemClock), sensors, &config.channels);

    info!(
        mode = ?config.mode,
        link = link.name(),
        console = console.name(),
        synthetic = config.synthetic.enabled,
        tick_hz,
        "bridge started"
    );

    let mut pacer = TickPacer::new(Duration::from_secs_f64(1.0 / tick_hz));
    let started = Instant::now();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            _ = pacer.tick() => {
                drain_inbound(&mut scheduler, link.as_ref(), console.as_mut());

                if config.synthetic.enabled {
                    scheduler.refresh_synthetic(
                        config.synthetic.speed_mps,
                        config.synthetic.course_rad,
                    );
                } else if let Some(feed) = &feed {
                    drain_dynamics(&mut scheduler, feed);
                }

                let outcome = scheduler.tick(link.as_ref());
                for err in &outcome.errors {
                    warn!(channel = err.channel, error = %err.source, "channel dispatch failed");
                }

                if let Some(limit) = duration {
                    if started.elapsed().as_secs_f64() >= limit {
                        info!(seconds = limit, "run duration reached");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Relay every pending actuator command; other inbound kinds are ignored.
fn drain_inbound(
    scheduler: &mut TelemetryScheduler,
    link: &dyn AutopilotLink,
    console: &mut dyn DynamicsConsole,
) {
    loop {
        match link.poll() {
            Ok(Some(msg)) => match &msg.payload {
                LinkPayload::Actuators(command) => {
                    if let Err(err) = scheduler.handle_command(command, console) {
                        warn!(error = %err, "failed to relay actuator command");
                    }
                }
                _ => debug!(kind = msg.kind(), "ignoring inbound message"),
            },
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "inbound link read failed");
                break;
            }
        }
    }
}

/// Ingest every pending dynamics frame, keeping only the newest state.
fn drain_dynamics(scheduler: &mut TelemetryScheduler, feed: &FdmFeed) {
    loop {
        match feed.poll() {
            Ok(Some(bytes)) => match FdmFrame::decode(&bytes) {
                Ok(frame) => scheduler.ingest_dynamics(&frame),
                Err(err) => warn!(error = %err, "dropping malformed dynamics frame"),
            },
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "dynamics feed read failed");
                break;
            }
        }
    }
}
