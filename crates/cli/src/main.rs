use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use presence_core::camera::domain::device::Facing;
use presence_core::camera::infrastructure::synthetic_camera::{SyntheticCamera, SyntheticDevice};
use presence_core::detection::domain::face_detector::FaceDetector;
use presence_core::detection::infrastructure::model_resolver::{self, ModelOrigin};
use presence_core::detection::infrastructure::scripted_detector::ScriptedDetector;
use presence_core::facade::display::Status;
use presence_core::facade::runner::{run, RunnerConfig, StopReason};
use presence_core::facade::session_facade::SessionFacade;
use presence_core::overlay::domain::overlay_surface::NullOverlaySurface;
use presence_core::scan::controller::ScanConfig;
use presence_core::shared::constants::{DETECTOR_MODEL_FALLBACK_URL, DETECTOR_MODEL_NAME};
use presence_core::shared::geometry::DisplayBox;
use presence_core::shared::profile::ClientProfile;

/// Headless face-presence session against a synthetic camera.
#[derive(Parser)]
#[command(name = "presence")]
struct Cli {
    /// Keep scanning automatically instead of a single scan.
    #[arg(long)]
    auto: bool,

    /// Post-hit cooldown in milliseconds.
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Tick interval in milliseconds.
    #[arg(long, default_value = "33")]
    tick_ms: u64,

    /// Stop after this many ticks (auto mode never settles on its own).
    #[arg(long, default_value = "900")]
    ticks: u64,

    /// Simulated camera devices.
    #[arg(long, default_value = "1")]
    cameras: u32,

    /// Simulated face presence: a hit every Nth detection attempt.
    #[arg(long, default_value = "4")]
    hit_every: usize,

    /// Frames the simulated stream warms up before it is decodable.
    #[arg(long, default_value = "3")]
    warmup: u32,

    /// Flip cameras once after the session starts.
    #[arg(long)]
    flip: bool,

    /// Resolve the detection model from this directory (with the
    /// release download as fallback) before starting.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Constrained client profile (shorter cooldown, smaller input).
    #[arg(long)]
    constrained: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run_session() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_session() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let profile = if cli.constrained {
        ClientProfile::Constrained
    } else {
        ClientProfile::Standard
    };
    let mut scan_config = ScanConfig::for_profile(profile);
    if let Some(cooldown) = cli.cooldown_ms {
        scan_config.cooldown = Duration::from_millis(cooldown);
    }

    if let Some(models_dir) = &cli.models_dir {
        resolve_model(models_dir)?;
    }

    let detector: Box<dyn FaceDetector> = Box::new(ScriptedDetector::periodic(cli.hit_every));
    let mut facade = SessionFacade::new(
        Box::new(build_camera(&cli)),
        detector,
        Box::new(NullOverlaySurface),
        profile,
        scan_config,
    );

    facade.start_camera(DisplayBox {
        width: 640.0,
        height: 480.0,
    })?;

    if cli.flip {
        facade.flip()?;
    }

    if cli.auto {
        facade.toggle_auto();
    } else {
        facade.start();
    }

    let summary = run(
        &mut facade,
        &RunnerConfig {
            tick_interval: Duration::from_millis(cli.tick_ms),
            max_ticks: Some(cli.ticks),
        },
    );
    facade.close();

    match summary.stop {
        StopReason::Halted(e) => {
            eprintln!("Session halted: {e}");
        }
        _ => {
            println!(
                "Session finished after {} tick(s): {} presence detection(s)",
                summary.ticks, summary.total_count
            );
        }
    }
    Ok(())
}

fn resolve_model(models_dir: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("{}", Status::LoadingModels);
    match model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        Some(models_dir),
        DETECTOR_MODEL_FALLBACK_URL,
    ) {
        Ok((path, origin)) => {
            log::info!(
                "{}",
                Status::Ready {
                    via_fallback: origin == ModelOrigin::Downloaded
                }
            );
            log::debug!("detection model at {}", path.display());
            Ok(())
        }
        Err(e) => {
            log::error!("{}", Status::ModelLoadFailed);
            Err(e.into())
        }
    }
}

fn build_camera(cli: &Cli) -> SyntheticCamera {
    let devices = (0..cli.cameras)
        .map(|i| {
            let facing = if i % 2 == 0 { Facing::Front } else { Facing::Back };
            SyntheticDevice::new(format!("synthetic-{i}"), facing).with_warmup(cli.warmup)
        })
        .collect();
    SyntheticCamera::new(devices)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.cameras == 0 {
        return Err("at least one simulated camera is required".into());
    }
    if cli.hit_every == 0 {
        return Err("--hit-every must be at least 1".into());
    }
    if cli.tick_ms == 0 {
        return Err("--tick-ms must be at least 1".into());
    }
    Ok(())
}
