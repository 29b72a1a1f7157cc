// Error types for terratracer

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum TerraTracerError {
    // Startup assets. These are fatal, the viewer cannot run without them
    #[snafu(display("Could not find flight log: {}", path.display()))]
    FlightLogMissing { path: PathBuf },
    #[snafu(display("Error reading flight log {}", path.display()))]
    FlightLogRead { path: PathBuf, source: io::Error },
    #[snafu(display("Could not find flight video: {}", path.display()))]
    VideoMissing { path: PathBuf },

    // Media playback errors
    #[snafu(display("Media player error: {description}"))]
    MediaPlayer { description: String },
    #[snafu(display("Could not launch media player {command}"))]
    MediaPlayerSpawn { command: String, source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error parsing config file {}", path.display()))]
    ConfigParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Output errors
    #[snafu(display("Error writing replay output"))]
    ReplayOutput { source: io::Error },

    // UI errors
    #[snafu(display("Could not start viewer window: {description}"))]
    ViewerStartup { description: String },
}
