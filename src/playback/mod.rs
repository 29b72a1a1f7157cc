pub(crate) mod clock;
pub(crate) mod media;

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use media::{ExternalPlayer, MediaPlayer, SilentPlayer, VideoAsset};

use crate::flight_log::{DetectionEvent, DetectionId, FlightSample};

pub const TICK_INTERVAL_MS: u64 = 10;
pub const DETECTED_NOW_WINDOW_MS: f64 = 300.;
pub const SEEN_LEAD_MS: f64 = 50.;
pub const POINT_CLOUD_DELAY_MS: u64 = 500;

/// Timing constants that drive playback. The detection windows were tuned by
/// eye against the recorded video.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlaybackTiming {
    pub tick_interval_ms: u64,
    /// A detection counts as "happening now" within this distance of elapsed time
    pub detected_now_window_ms: f64,
    /// Detections are added to the log this far ahead of elapsed time
    pub seen_lead_ms: f64,
    pub point_cloud_delay_ms: u64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            detected_now_window_ms: DETECTED_NOW_WINDOW_MS,
            seen_lead_ms: SEEN_LEAD_MS,
            point_cloud_delay_ms: POINT_CLOUD_DELAY_MS,
        }
    }
}

impl PlaybackTiming {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn point_cloud_delay(&self) -> Duration {
        Duration::from_millis(self.point_cloud_delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing { started_at: Instant },
}

/// Observable changes, queued in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Started,
    Stopped,
    FlightIndexChanged(usize),
    DetectedNowChanged(bool),
    DetectionsSeen(Vec<DetectionId>),
}

/// Index of the last sample at or before `elapsed_ms`. Past the end of the log
/// this is the last sample, and an empty log yields 0.
pub fn select_flight_index(samples: &[FlightSample], elapsed_ms: f64) -> usize {
    let last = samples.len().saturating_sub(1);
    samples
        .iter()
        .position(|s| s.time_ms > elapsed_ms)
        .map_or(last, |next| next.saturating_sub(1))
        .min(last)
}

/// Replays the flight and detection logs against a clock.
///
/// All state changes go through `start`, `stop` and `tick`, which the owner
/// calls from a single thread. Views read the state between ticks and can
/// drain [`PlaybackEvent`]s with [`PlaybackController::take_events`].
pub struct PlaybackController {
    flight_samples: Vec<FlightSample>,
    detections: Vec<DetectionEvent>,
    timing: PlaybackTiming,
    clock: Box<dyn Clock>,
    media: Box<dyn MediaPlayer>,

    state: PlaybackState,
    current_flight_index: usize,
    is_detected_now: bool,
    seen: Vec<DetectionId>,
    seen_mask: Vec<bool>,
    elapsed_ms: f64,
    media_playing: bool,
    events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    pub fn new(
        flight_samples: Vec<FlightSample>,
        detections: Vec<DetectionEvent>,
        timing: PlaybackTiming,
        clock: Box<dyn Clock>,
        media: Box<dyn MediaPlayer>,
    ) -> Self {
        let seen_mask = vec![false; detections.len()];
        Self {
            flight_samples,
            detections,
            timing,
            clock,
            media,
            state: PlaybackState::Stopped,
            current_flight_index: 0,
            is_detected_now: false,
            seen: Vec::new(),
            seen_mask,
            elapsed_ms: 0.,
            media_playing: false,
            events: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        if self.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing {
            started_at: self.clock.now(),
        };
        self.events.push(PlaybackEvent::Started);

        // only values that actually change are reported
        if self.current_flight_index != 0 {
            self.current_flight_index = 0;
            self.events.push(PlaybackEvent::FlightIndexChanged(0));
        }
        if self.is_detected_now {
            self.is_detected_now = false;
            self.events.push(PlaybackEvent::DetectedNowChanged(false));
        }
        self.seen.clear();
        self.seen_mask.iter_mut().for_each(|s| *s = false);
        self.elapsed_ms = 0.;

        if let Err(e) = self.media.seek_to_start().and_then(|_| self.media.play()) {
            warn!("Could not start video playback: {}", e);
        }
        self.media_playing = self.media.is_playing();
        info!(
            "Playback started: {} flight samples, {} detections",
            self.flight_samples.len(),
            self.detections.len()
        );
    }

    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.state = PlaybackState::Stopped;
        if let Err(e) = self.media.pause() {
            warn!("Could not pause video playback: {}", e);
        }
        self.media_playing = self.media.is_playing();
        info!(
            "Playback stopped at {:.0}ms with {} detections seen",
            self.elapsed_ms,
            self.seen.len()
        );
        self.events.push(PlaybackEvent::Stopped);
    }

    /// Advances playback to the clock's current time.
    pub fn tick(&mut self) {
        if let PlaybackState::Playing { started_at } = self.state {
            self.media_playing = self.media.is_playing();
            let elapsed = self.clock.now().saturating_duration_since(started_at);
            self.tick_at(elapsed.as_nanos() as f64 / 1_000_000.);
        }
    }

    /// Advances playback to an explicit elapsed time. Ignored while stopped.
    pub fn tick_at(&mut self, elapsed_ms: f64) {
        if !self.is_playing() {
            return;
        }
        self.elapsed_ms = elapsed_ms;

        let index = select_flight_index(&self.flight_samples, elapsed_ms);
        if index != self.current_flight_index {
            self.current_flight_index = index;
            self.events.push(PlaybackEvent::FlightIndexChanged(index));
        }

        let window = self.timing.detected_now_window_ms;
        let detected_now = self
            .detections
            .iter()
            .any(|d| d.time_ms >= elapsed_ms - window && d.time_ms <= elapsed_ms + window);
        if detected_now != self.is_detected_now {
            self.is_detected_now = detected_now;
            self.events.push(PlaybackEvent::DetectedNowChanged(detected_now));
        }

        let horizon = elapsed_ms + self.timing.seen_lead_ms;
        let newly_seen: Vec<DetectionId> = self
            .detections
            .iter()
            .enumerate()
            .filter(|(i, d)| d.time_ms <= horizon && !self.seen_mask[*i])
            .map(|(i, _)| DetectionId(i))
            .collect();
        if !newly_seen.is_empty() {
            for id in &newly_seen {
                self.seen_mask[id.0] = true;
                debug!(
                    "Detection at {}ms: {}",
                    self.detections[id.0].time_ms,
                    self.detections[id.0].summary()
                );
            }
            self.seen.extend_from_slice(&newly_seen);
            debug!(
                "Added {} new detections. Total: {}",
                newly_seen.len(),
                self.seen.len()
            );
            self.events.push(PlaybackEvent::DetectionsSeen(newly_seen));
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn timing(&self) -> &PlaybackTiming {
        &self.timing
    }

    /// Elapsed time as of the last tick.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Time since `start`, read from the clock. `None` while stopped.
    pub fn time_since_start(&self) -> Option<Duration> {
        match self.state {
            PlaybackState::Playing { started_at } => {
                Some(self.clock.now().saturating_duration_since(started_at))
            }
            PlaybackState::Stopped => None,
        }
    }

    pub fn flight_samples(&self) -> &[FlightSample] {
        &self.flight_samples
    }

    pub fn detections(&self) -> &[DetectionEvent] {
        &self.detections
    }

    pub fn current_flight_index(&self) -> usize {
        self.current_flight_index
    }

    pub fn current_flight_sample(&self) -> Option<&FlightSample> {
        self.flight_samples.get(self.current_flight_index)
    }

    pub fn is_detected_now(&self) -> bool {
        self.is_detected_now
    }

    pub fn seen_ids(&self) -> &[DetectionId] {
        &self.seen
    }

    /// Detections shown so far in this session, in the order they appeared.
    pub fn seen_detections(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.seen.iter().map(|id| &self.detections[id.0])
    }

    /// Media state as of the last start, stop or tick.
    pub fn is_media_playing(&self) -> bool {
        self.media_playing
    }

    /// Elapsed time at which the last flight sample or detection happens.
    pub fn end_ms(&self) -> f64 {
        self.flight_samples
            .iter()
            .map(|s| s.time_ms)
            .chain(self.detections.iter().map(|d| d.time_ms))
            .fold(0., f64::max)
    }

    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_log::BoundingBox;
    use proptest::prelude::*;

    fn sample(time_ms: f64) -> FlightSample {
        FlightSample {
            time_ms,
            datetime_utc: format!("t{}", time_ms),
            height_above_takeoff_ft: time_ms / 10.,
            z_speed_mph: 1.,
            fly_state: "P-GPS".to_string(),
        }
    }

    fn detection(time_ms: f64) -> DetectionEvent {
        DetectionEvent::new(
            time_ms,
            format!("t{}", time_ms),
            "alien".to_string(),
            0.9,
            BoundingBox::default(),
        )
    }

    fn controller(samples: &[f64], detections: &[f64]) -> PlaybackController {
        PlaybackController::new(
            samples.iter().copied().map(sample).collect(),
            detections.iter().copied().map(detection).collect(),
            PlaybackTiming::default(),
            Box::new(ManualClock::new()),
            Box::new(SilentPlayer::default()),
        )
    }

    #[test]
    fn test_start_then_stop_keeps_initial_state() {
        let mut playback = controller(&[0., 100., 200.], &[10.]);
        playback.start();
        playback.stop();
        assert!(!playback.is_playing());
        assert_eq!(playback.current_flight_index(), 0);
        assert_eq!(playback.seen_ids().len(), 0);
    }

    #[test]
    fn test_flight_index_selection() {
        let mut playback = controller(&[0., 100., 200.], &[]);
        playback.start();
        playback.tick_at(150.);
        assert_eq!(playback.current_flight_index(), 1);
        playback.tick_at(250.);
        assert_eq!(playback.current_flight_index(), 2);
        playback.tick_at(-10.);
        assert_eq!(playback.current_flight_index(), 0);
        playback.tick_at(100.);
        assert_eq!(playback.current_flight_index(), 1);
    }

    #[test]
    fn test_empty_flight_log_selects_zero() {
        let mut playback = controller(&[], &[]);
        playback.start();
        playback.tick_at(1000.);
        assert_eq!(playback.current_flight_index(), 0);
        assert!(playback.current_flight_sample().is_none());
    }

    #[test]
    fn test_detected_now_window() {
        let mut playback = controller(&[0.], &[500.]);
        playback.start();
        for elapsed in [200., 350., 500., 650., 800.] {
            playback.tick_at(elapsed);
            assert!(playback.is_detected_now(), "expected detection at {}", elapsed);
        }
        for elapsed in [150., 850.] {
            playback.tick_at(elapsed);
            assert!(!playback.is_detected_now(), "unexpected detection at {}", elapsed);
        }
    }

    #[test]
    fn test_seen_detections_grow_in_order() {
        let mut playback = controller(&[0.], &[10., 1000.]);
        playback.start();
        playback.tick_at(60.);
        assert_eq!(playback.seen_ids(), &[DetectionId(0)]);
        playback.tick_at(500.);
        assert_eq!(playback.seen_ids(), &[DetectionId(0)]);
        playback.tick_at(1060.);
        assert_eq!(playback.seen_ids(), &[DetectionId(0), DetectionId(1)]);
        playback.tick_at(2000.);
        assert_eq!(playback.seen_ids().len(), 2);
        let times: Vec<f64> = playback.seen_detections().map(|d| d.time_ms).collect();
        assert_eq!(times, vec![10., 1000.]);
    }

    #[test]
    fn test_seen_uses_identity_not_content() {
        let mut playback = controller(&[0.], &[10., 10.]);
        playback.start();
        playback.tick_at(60.);
        assert_eq!(playback.seen_ids(), &[DetectionId(0), DetectionId(1)]);
    }

    #[test]
    fn test_second_start_is_noop() {
        let mut playback = controller(&[0., 100., 200.], &[10.]);
        playback.start();
        playback.tick_at(150.);
        playback.start();
        assert_eq!(playback.current_flight_index(), 1);
        assert_eq!(playback.seen_ids(), &[DetectionId(0)]);
    }

    #[test]
    fn test_restart_clears_session() {
        let mut playback = controller(&[0., 100.], &[10.]);
        playback.start();
        playback.tick_at(150.);
        playback.stop();
        assert_eq!(playback.current_flight_index(), 1);
        assert_eq!(playback.seen_ids().len(), 1);
        playback.start();
        assert_eq!(playback.current_flight_index(), 0);
        assert!(playback.seen_ids().is_empty());
        assert!(!playback.is_detected_now());
    }

    #[test]
    fn test_ticks_ignored_while_stopped() {
        let mut playback = controller(&[0., 100.], &[10.]);
        playback.tick_at(150.);
        assert_eq!(playback.current_flight_index(), 0);
        assert!(playback.seen_ids().is_empty());
        assert!(playback.take_events().is_empty());
    }

    #[test]
    fn test_no_changes_after_stop() {
        let clock = ManualClock::new();
        let mut playback = PlaybackController::new(
            vec![sample(0.), sample(100.), sample(200.)],
            vec![detection(10.), detection(1000.)],
            PlaybackTiming::default(),
            Box::new(clock.clone()),
            Box::new(SilentPlayer::default()),
        );
        playback.start();
        playback.tick_at(150.);
        playback.stop();
        playback.take_events();

        playback.tick_at(5000.);
        clock.advance(Duration::from_millis(5000));
        playback.tick();

        assert_eq!(playback.current_flight_index(), 1);
        assert_eq!(playback.seen_ids(), &[DetectionId(0)]);
        assert!(playback.is_detected_now());
        assert_eq!(playback.elapsed_ms(), 150.);
        assert!(playback.take_events().is_empty());
    }

    #[test]
    fn test_restart_reports_reset_values() {
        let mut playback = controller(&[0., 100.], &[150.]);
        playback.start();
        playback.tick_at(150.);
        playback.stop();
        playback.take_events();

        playback.start();
        assert_eq!(
            playback.take_events(),
            vec![
                PlaybackEvent::Started,
                PlaybackEvent::FlightIndexChanged(0),
                PlaybackEvent::DetectedNowChanged(false),
            ]
        );
    }

    #[test]
    fn test_tick_reads_clock() {
        let clock = ManualClock::new();
        let mut playback = PlaybackController::new(
            vec![sample(0.), sample(100.), sample(200.)],
            vec![detection(120.)],
            PlaybackTiming::default(),
            Box::new(clock.clone()),
            Box::new(SilentPlayer::default()),
        );
        playback.start();
        clock.advance(Duration::from_millis(110));
        playback.tick();
        assert_eq!(playback.elapsed_ms(), 110.);
        assert_eq!(playback.current_flight_index(), 1);
        assert_eq!(playback.seen_ids(), &[DetectionId(0)]);
        assert_eq!(playback.time_since_start(), Some(Duration::from_millis(110)));
    }

    #[test]
    fn test_events_report_changes() {
        let mut playback = controller(&[0., 100.], &[500.]);
        playback.start();
        playback.tick_at(150.);
        playback.tick_at(160.);
        playback.tick_at(460.);
        playback.stop();
        assert_eq!(
            playback.take_events(),
            vec![
                PlaybackEvent::Started,
                PlaybackEvent::FlightIndexChanged(1),
                PlaybackEvent::DetectedNowChanged(true),
                PlaybackEvent::DetectionsSeen(vec![DetectionId(0)]),
                PlaybackEvent::Stopped,
            ]
        );
        assert!(playback.take_events().is_empty());
    }

    #[test]
    fn test_custom_windows() {
        let timing = PlaybackTiming {
            detected_now_window_ms: 10.,
            seen_lead_ms: 0.,
            ..Default::default()
        };
        let mut playback = PlaybackController::new(
            vec![sample(0.)],
            vec![detection(100.)],
            timing,
            Box::new(ManualClock::new()),
            Box::new(SilentPlayer::default()),
        );
        playback.start();
        playback.tick_at(80.);
        assert!(!playback.is_detected_now());
        assert!(playback.seen_ids().is_empty());
        playback.tick_at(95.);
        assert!(playback.is_detected_now());
        assert!(playback.seen_ids().is_empty());
        playback.tick_at(100.);
        assert_eq!(playback.seen_ids().len(), 1);
    }

    #[test]
    fn test_media_follows_playback() {
        let mut playback = controller(&[0.], &[]);
        assert!(!playback.is_media_playing());
        playback.start();
        assert!(playback.is_media_playing());
        playback.stop();
        assert!(!playback.is_media_playing());
    }

    #[test]
    fn test_end_ms() {
        let playback = controller(&[0., 100., 200.], &[10., 1000.]);
        assert_eq!(playback.end_ms(), 1000.);
        assert_eq!(controller(&[], &[]).end_ms(), 0.);
    }

    proptest! {
        #[test]
        fn prop_selected_index_in_range_and_not_ahead(
            times in proptest::collection::vec(0u32..10_000, 0..50),
            elapsed in -100i64..12_000,
        ) {
            let mut times = times;
            times.sort_unstable();
            let samples: Vec<FlightSample> = times.iter().map(|t| sample(*t as f64)).collect();
            let elapsed = elapsed as f64;
            let index = select_flight_index(&samples, elapsed);
            if samples.is_empty() {
                prop_assert_eq!(index, 0);
            } else {
                prop_assert!(index < samples.len());
                if index > 0 {
                    prop_assert!(samples[index].time_ms <= elapsed);
                }
                if let Some(next) = samples.get(index + 1) {
                    prop_assert!(next.time_ms > elapsed || samples[index].time_ms > elapsed);
                }
            }
        }
    }
}
