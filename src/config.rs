use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::TerraTracerError;
use crate::playback::PlaybackTiming;

const CONFIG_DIR_NAME: &str = "terratracer";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayUnits {
    #[default]
    Imperial,
    Metric,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub flight_csv: PathBuf,
    pub detection_csv: PathBuf,
    pub video: PathBuf,
    pub point_cloud_image: Option<PathBuf>,
    pub drone_icon: Option<PathBuf>,
    pub alien_image: Option<PathBuf>,
    pub alien_grayscale_image: Option<PathBuf>,
    /// External video player argv; `{video}` is replaced with the video path
    pub player_command: Option<Vec<String>>,
    pub units: DisplayUnits,
    pub timing: PlaybackTiming,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            flight_csv: PathBuf::from("flight_data.csv"),
            detection_csv: PathBuf::from("alien_detection.csv"),
            video: PathBuf::from("drone_video.mp4"),
            point_cloud_image: None,
            drone_icon: None,
            alien_image: None,
            alien_grayscale_image: None,
            player_command: None,
            units: DisplayUnits::default(),
            timing: PlaybackTiming::default(),
        }
    }
}

impl ViewerConfig {
    pub fn default_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    /// Reads the config from the user's config directory, if one was saved.
    pub fn from_local_file() -> Result<Option<Self>, TerraTracerError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TerraTracerError> {
        let file = File::open(path).map_err(|e| TerraTracerError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| TerraTracerError::ConfigParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self) -> Result<(), TerraTracerError> {
        let config_path = Self::default_path().ok_or(TerraTracerError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), TerraTracerError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| TerraTracerError::ConfigIOError { source: e })?;
        }

        let file = File::create(config_path)
            .map_err(|e| TerraTracerError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TerraTracerError::ConfigSerializeError { source: e })
    }
}
