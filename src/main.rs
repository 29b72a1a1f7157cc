use std::{
    io,
    path::PathBuf,
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use clap::{Args as ClapArgs, Parser, Subcommand};
use egui::Vec2;
use log::{error, info};

use terratracer::{
    PlaybackController, TerraTracerApp, TerraTracerError, ViewerConfig,
    flight_log::{load_detection_csv, load_flight_csv},
    playback::{ExternalPlayer, MediaPlayer, SilentPlayer, SystemClock, VideoAsset},
    replay::run_headless,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
struct Inputs {
    /// Flight log CSV
    #[arg(short, long)]
    flight: Option<PathBuf>,

    /// Detection log CSV
    #[arg(short, long)]
    detections: Option<PathBuf>,

    /// Flight video
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Config file, instead of the one in the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the playback viewer
    View {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Play back in the terminal, printing detections as they appear
    Replay {
        #[command(flatten)]
        inputs: Inputs,

        /// Stop after this many milliseconds instead of at the end of the logs
        #[arg(short, long)]
        until_ms: Option<f64>,
    },
    /// Print the effective configuration
    Config {
        #[command(flatten)]
        inputs: Inputs,

        /// Also save it to the user config directory
        #[arg(short, long)]
        save: bool,
    },
}

fn resolve_config(inputs: &Inputs) -> Result<ViewerConfig, TerraTracerError> {
    let mut config = match &inputs.config {
        Some(path) => ViewerConfig::from_path(path)?,
        None => ViewerConfig::from_local_file()?.unwrap_or_default(),
    };
    if let Some(flight) = &inputs.flight {
        config.flight_csv = flight.clone();
    }
    if let Some(detections) = &inputs.detections {
        config.detection_csv = detections.clone();
    }
    if let Some(video) = &inputs.video {
        config.video = video.clone();
    }
    Ok(config)
}

/// Loads the startup assets. The flight log and video are required; the
/// detection log may be missing.
fn build_playback(
    config: &ViewerConfig,
) -> Result<(PlaybackController, VideoAsset), TerraTracerError> {
    let flight_samples = load_flight_csv(&config.flight_csv)?;
    let detections = load_detection_csv(&config.detection_csv);
    let video = VideoAsset::locate(&config.video)?;

    let media: Box<dyn MediaPlayer> = match &config.player_command {
        Some(command) => Box::new(ExternalPlayer::new(command, &video)?),
        None => Box::new(SilentPlayer::default()),
    };

    let playback = PlaybackController::new(
        flight_samples,
        detections,
        config.timing.clone(),
        Box::new(SystemClock),
        media,
    );
    Ok((playback, video))
}

fn view(config: ViewerConfig) -> Result<(), TerraTracerError> {
    let (playback, video) = build_playback(&config)?;

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("TerraTracer")
        .with_inner_size(Vec2::new(1400., 1000.));

    eframe::run_native(
        "TerraTracer",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(TerraTracerApp::new(
                playback,
                config,
                video.file_name(),
                cc,
            )))
        }),
    )
    .map_err(|e| TerraTracerError::ViewerStartup {
        description: e.to_string(),
    })
}

fn replay(config: ViewerConfig, until_ms: Option<f64>) -> Result<(), TerraTracerError> {
    let (mut playback, video) = build_playback(&config)?;
    let until_ms = until_ms.unwrap_or_else(|| playback.end_ms());
    info!(
        "Replaying {} up to {}ms",
        video.path().display(),
        until_ms
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_flag = cancelled.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        error!("Could not set Ctrl-C handler: {}", e);
    }

    let stdout = io::stdout();
    run_headless(
        &mut playback,
        config.units,
        until_ms,
        &cancelled,
        &mut stdout.lock(),
    )
    .map_err(|e| TerraTracerError::ReplayOutput { source: e })
}

fn run(cli: Args) -> Result<(), TerraTracerError> {
    match cli.command {
        Commands::View { inputs } => view(resolve_config(&inputs)?),
        Commands::Replay { inputs, until_ms } => replay(resolve_config(&inputs)?, until_ms),
        Commands::Config { inputs, save } => {
            let config = resolve_config(&inputs)?;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| TerraTracerError::ConfigSerializeError { source: e })?;
            println!("{}", json);
            if save {
                config.save()?;
                info!("Saved config to {:?}", ViewerConfig::default_path());
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("terratracer: {}", e);
            ExitCode::FAILURE
        }
    }
}
