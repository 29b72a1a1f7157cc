use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::{BoundingBox, DetectionEvent, FlightSample};
use crate::TerraTracerError;

const MIN_FLIGHT_FIELDS: usize = 5;
const MIN_DETECTION_FIELDS: usize = 7;

fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

fn number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}

fn flight_row(line: &str) -> Option<FlightSample> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FLIGHT_FIELDS {
        return None;
    }
    Some(FlightSample {
        time_ms: number(fields[0])?,
        datetime_utc: fields[1].to_string(),
        height_above_takeoff_ft: number(fields[3])?,
        z_speed_mph: number(fields[4])?,
        fly_state: fields.get(5).map(|s| s.to_string()).unwrap_or_default(),
    })
}

fn detection_row(line: &str) -> Option<DetectionEvent> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_DETECTION_FIELDS {
        return None;
    }
    // a trailing empty column counts as no height
    let height = match fields.get(7) {
        Some(field) if !field.trim().is_empty() => number(field)?,
        _ => 0.,
    };
    Some(DetectionEvent::new(
        number(fields[0])?,
        fields[1].to_string(),
        fields[2].to_string(),
        number(fields[3])?,
        BoundingBox {
            x: number(fields[4])?,
            y: number(fields[5])?,
            width: number(fields[6])?,
            height,
        },
    ))
}

/// Parses the flight log. The first line is a header and is skipped; rows that
/// are too short or carry a non-numeric value in a numeric column are dropped.
pub fn parse_flight_csv(text: &str) -> Vec<FlightSample> {
    data_lines(text).skip(1).filter_map(flight_row).collect()
}

/// Parses the detection log, which has no header row.
pub fn parse_detection_csv(text: &str) -> Vec<DetectionEvent> {
    data_lines(text)
        .filter_map(|line| {
            let row = detection_row(line);
            if row.is_none() {
                warn!("Skipping malformed detection row: {}", line);
            }
            row
        })
        .collect()
}

pub fn load_flight_csv(path: &Path) -> Result<Vec<FlightSample>, TerraTracerError> {
    if !path.exists() {
        return Err(TerraTracerError::FlightLogMissing {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| TerraTracerError::FlightLogRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let samples = parse_flight_csv(&text);
    info!("Loaded {:?}, found {} flight samples", path, samples.len());
    Ok(samples)
}

/// Loads the detection log. A missing or unreadable file is not fatal: the
/// viewer runs without detections.
pub fn load_detection_csv(path: &Path) -> Vec<DetectionEvent> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not read detection log {:?}: {}", path, e);
            return Vec::new();
        }
    };
    let events = parse_detection_csv(&text);
    info!("Loaded {:?}, found {} detection events", path, events.len());
    for event in &events {
        debug!("Detection at {}ms: {}", event.time_ms, event.summary());
    }
    events
}
