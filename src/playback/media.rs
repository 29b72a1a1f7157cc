//! Video handling. The crate does not decode video: frames are shown by an
//! external player program, and the viewer's video pane is a status panel
//! that follows its state.

use std::{
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use log::{debug, info, warn};

use crate::TerraTracerError;

const VIDEO_PLACEHOLDER: &str = "{video}";

/// The flight video. Its existence is checked once at startup.
#[derive(Debug, Clone)]
pub struct VideoAsset {
    path: PathBuf,
}

impl VideoAsset {
    pub fn locate(path: &Path) -> Result<Self, TerraTracerError> {
        if !path.is_file() {
            return Err(TerraTracerError::VideoMissing {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Playback surface for the flight video. Playback always restarts from the
/// beginning; there is no resume from the paused position.
pub trait MediaPlayer {
    fn seek_to_start(&mut self) -> Result<(), TerraTracerError>;
    fn play(&mut self) -> Result<(), TerraTracerError>;
    fn pause(&mut self) -> Result<(), TerraTracerError>;
    /// Takes `&mut self` so implementations can notice playback that ended on its own.
    fn is_playing(&mut self) -> bool;
}

/// Tracks play/pause state without rendering anything.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    playing: bool,
    restarts: usize,
}

impl SilentPlayer {
    /// Number of times playback was rewound to the start.
    pub fn restarts(&self) -> usize {
        self.restarts
    }
}

impl MediaPlayer for SilentPlayer {
    fn seek_to_start(&mut self) -> Result<(), TerraTracerError> {
        self.restarts += 1;
        Ok(())
    }

    fn play(&mut self) -> Result<(), TerraTracerError> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TerraTracerError> {
        self.playing = false;
        Ok(())
    }

    fn is_playing(&mut self) -> bool {
        self.playing
    }
}

/// Hands the video to an external program, e.g. `ffplay -autoexit {video}`.
/// Pausing terminates the process; playing again spawns a new one from the
/// start of the file.
#[derive(Debug)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl ExternalPlayer {
    pub fn new(command: &[String], video: &VideoAsset) -> Result<Self, TerraTracerError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| TerraTracerError::MediaPlayer {
                description: "empty player command".to_string(),
            })?;
        let video_path = video.path().display().to_string();
        let mut args: Vec<String> = args
            .iter()
            .map(|a| a.replace(VIDEO_PLACEHOLDER, &video_path))
            .collect();
        if !command.iter().any(|a| a.contains(VIDEO_PLACEHOLDER)) {
            args.push(video_path);
        }
        Ok(Self {
            program: program.clone(),
            args,
            child: None,
        })
    }

    fn terminate(&mut self) -> Result<(), TerraTracerError> {
        if let Some(mut child) = self.child.take() {
            debug!("Stopping media player pid {}", child.id());
            // the player may already have exited on its own
            if let Err(e) = child.kill() {
                debug!("Media player already stopped: {}", e);
            }
            child.wait().map_err(|e| TerraTracerError::MediaPlayer {
                description: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl MediaPlayer for ExternalPlayer {
    fn seek_to_start(&mut self) -> Result<(), TerraTracerError> {
        self.terminate()
    }

    fn play(&mut self) -> Result<(), TerraTracerError> {
        if self.child.is_some() {
            return Ok(());
        }
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TerraTracerError::MediaPlayerSpawn {
                command: self.program.clone(),
                source: e,
            })?;
        info!("Started media player {} (pid {})", self.program, child.id());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TerraTracerError> {
        self.terminate()
    }

    fn is_playing(&mut self) -> bool {
        match self.child.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(Ok(Some(status))) => {
                debug!("Media player exited: {}", status);
                self.child = None;
                false
            }
            Some(Err(e)) => {
                warn!("Could not query media player: {}", e);
                false
            }
            None => false,
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            warn!("Error while stopping media player: {}", e);
        }
    }
}
