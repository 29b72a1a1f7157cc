pub(crate) mod loader;

pub use loader::{load_detection_csv, load_flight_csv, parse_detection_csv, parse_flight_csv};

use uom::si::{
    f64::{Length, Velocity},
    length::foot,
    velocity::mile_per_hour,
};

/// One row of the drone flight log.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightSample {
    /// Milliseconds since the start of the recording
    pub time_ms: f64,
    /// Wall-clock time of the sample, as written by the drone
    pub datetime_utc: String,
    /// Height above the takeoff point, feet
    pub height_above_takeoff_ft: f64,
    /// Vertical speed, mph
    pub z_speed_mph: f64,
    pub fly_state: String,
}

impl FlightSample {
    pub fn height_above_takeoff(&self) -> Length {
        Length::new::<foot>(self.height_above_takeoff_ft)
    }

    pub fn z_speed(&self) -> Velocity {
        Velocity::new::<mile_per_hour>(self.z_speed_mph)
    }
}

/// Identity of a detection: its position in the loaded detection table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectionId(pub usize);

/// Bounding box of a detection in image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One row of the detection log.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionEvent {
    pub time_ms: f64,
    pub timestamp: String,
    pub label: String,
    /// Classifier confidence, 0 to 1
    pub probability: f64,
    pub bbox: BoundingBox,
    summary: String,
}

impl DetectionEvent {
    pub fn new(
        time_ms: f64,
        timestamp: String,
        label: String,
        probability: f64,
        bbox: BoundingBox,
    ) -> Self {
        let summary = format!(
            "{}, {}, {}, {:.0}%, {:.0}, {:.0}, {:.0}, {:.0}",
            time_ms as i64,
            timestamp,
            label,
            probability * 100.,
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
        Self {
            time_ms,
            timestamp,
            label,
            probability,
            bbox,
            summary,
        }
    }

    /// Fixed-format line shown in the detection log.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::{length::meter, velocity::meter_per_second};

    #[test]
    fn test_summary_rounds_numeric_fields() {
        let event = DetectionEvent::new(
            1234.9,
            "2024-05-01 12:00:01".to_string(),
            "alien".to_string(),
            0.873,
            BoundingBox {
                x: 10.4,
                y: 20.6,
                width: 30.2,
                height: 40.7,
            },
        );
        assert_eq!(
            event.summary(),
            "1234, 2024-05-01 12:00:01, alien, 87%, 10, 21, 30, 41"
        );
    }

    #[test]
    fn test_summary_with_default_height() {
        let event = DetectionEvent::new(
            500.,
            "t".to_string(),
            "alien".to_string(),
            1.0,
            BoundingBox {
                x: 1.,
                y: 2.,
                width: 3.,
                height: 0.,
            },
        );
        assert_eq!(event.summary(), "500, t, alien, 100%, 1, 2, 3, 0");
    }

    #[test]
    fn test_flight_sample_units() {
        let sample = FlightSample {
            time_ms: 0.,
            datetime_utc: String::new(),
            height_above_takeoff_ft: 100.,
            z_speed_mph: 10.,
            fly_state: "P-GPS".to_string(),
        };
        assert!((sample.height_above_takeoff().get::<meter>() - 30.48).abs() < 1e-9);
        assert!((sample.z_speed().get::<meter_per_second>() - 4.4704).abs() < 1e-9);
    }
}
