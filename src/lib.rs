// Library interface for terratracer
// This allows integration tests to access internal modules

pub mod config;
pub mod errors;
pub mod flight_log;
pub mod playback;
pub mod replay;
pub mod ui;

// Re-export commonly used types
pub use config::{DisplayUnits, ViewerConfig};
pub use errors::TerraTracerError;
pub use flight_log::{BoundingBox, DetectionEvent, DetectionId, FlightSample};
pub use playback::{PlaybackController, PlaybackEvent, PlaybackTiming};
pub use ui::TerraTracerApp;
