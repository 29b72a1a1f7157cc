//! Text shown by the viewer, computed from playback state without touching egui.

use std::time::Duration;

use uom::si::{
    length::{foot, meter},
    velocity::{meter_per_second, mile_per_hour},
};

use crate::config::DisplayUnits;
use crate::flight_log::FlightSample;

pub const DETECTION_LOG_HEADER: &str = "ms    datetime          label prob%  x  y  w  h";
pub const NO_DETECTIONS_TEXT: &str = "No aliens detected yet";

/// Formats milliseconds as `MM:SS:CC` (minutes, seconds, hundredths).
pub fn format_elapsed(milliseconds: f64) -> String {
    let total_seconds = (milliseconds / 1000.) as i64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let hundredths = ((milliseconds % 1000.) / 10.) as i64;
    format!("{:02}:{:02}:{:02}", minutes, seconds, hundredths)
}

/// One label/value line of the flight data panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadoutRow {
    pub label: &'static str,
    pub value: String,
}

impl ReadoutRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

pub fn flight_readout(sample: Option<&FlightSample>, units: DisplayUnits) -> Vec<ReadoutRow> {
    let Some(sample) = sample else {
        let (height, speed) = match units {
            DisplayUnits::Imperial => ("0 ft", "0 mph"),
            DisplayUnits::Metric => ("0 m", "0 m/s"),
        };
        return vec![
            ReadoutRow::new("Time", "00:00:00"),
            ReadoutRow::new("UTC", "--:--:--"),
            ReadoutRow::new("Height Above Takeoff", height),
            ReadoutRow::new("Z Speed", speed),
            ReadoutRow::new("Fly State", "Unknown"),
        ];
    };

    let (height, speed) = match units {
        DisplayUnits::Imperial => (
            format!("{:.3} ft", sample.height_above_takeoff().get::<foot>()),
            format!("{:.3} mph", sample.z_speed().get::<mile_per_hour>()),
        ),
        DisplayUnits::Metric => (
            format!("{:.3} m", sample.height_above_takeoff().get::<meter>()),
            format!("{:.3} m/s", sample.z_speed().get::<meter_per_second>()),
        ),
    };
    vec![
        ReadoutRow::new("Time", format_elapsed(sample.time_ms)),
        ReadoutRow::new("Datetime", sample.datetime_utc.clone()),
        ReadoutRow::new("Height Above Takeoff", height),
        ReadoutRow::new("Z Speed", speed),
        ReadoutRow::new("Fly State", sample.fly_state.clone()),
    ]
}

/// The point cloud image appears a short while after playback starts.
pub fn point_cloud_visible(time_since_start: Option<Duration>, delay: Duration) -> bool {
    time_since_start.is_some_and(|t| t >= delay)
}
