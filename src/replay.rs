use std::{
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use itertools::Itertools;
use log::info;

use crate::config::DisplayUnits;
use crate::playback::{PlaybackController, PlaybackEvent};
use crate::ui::readout::{DETECTION_LOG_HEADER, flight_readout, format_elapsed};

/// Plays back to `out` without a window. Detections are printed as they are
/// seen and the flight readout whenever the current sample changes. Returns
/// once elapsed time passes `until_ms` or `cancelled` is set.
pub fn run_headless(
    playback: &mut PlaybackController,
    units: DisplayUnits,
    until_ms: f64,
    cancelled: &Arc<AtomicBool>,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let interval = playback.timing().tick_interval();
    playback.start();
    writeln!(out, "{}", DETECTION_LOG_HEADER)?;
    write_readout(playback, playback.current_flight_index(), units, out)?;
    while !cancelled.load(Ordering::SeqCst) {
        playback.tick();
        write_events(playback, units, out)?;
        if playback.elapsed_ms() > until_ms {
            break;
        }
        thread::sleep(interval);
    }
    playback.stop();
    write_events(playback, units, out)?;
    info!(
        "Replay finished at {} with {} detections",
        format_elapsed(playback.elapsed_ms()),
        playback.seen_ids().len()
    );
    Ok(())
}

fn write_readout(
    playback: &PlaybackController,
    index: usize,
    units: DisplayUnits,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let readout = flight_readout(playback.flight_samples().get(index), units)
        .into_iter()
        .map(|row| format!("{}: {}", row.label, row.value))
        .join(" | ");
    writeln!(out, "[{}] {}", format_elapsed(playback.elapsed_ms()), readout)
}

fn write_events(
    playback: &mut PlaybackController,
    units: DisplayUnits,
    out: &mut impl Write,
) -> std::io::Result<()> {
    for event in playback.take_events() {
        match event {
            PlaybackEvent::FlightIndexChanged(index) => {
                write_readout(playback, index, units, out)?;
            }
            PlaybackEvent::DetectionsSeen(ids) => {
                for id in ids {
                    writeln!(out, "{}", playback.detections()[id.0].summary())?;
                }
            }
            PlaybackEvent::DetectedNowChanged(true) => {
                writeln!(out, "[{}] alien in view", format_elapsed(playback.elapsed_ms()))?;
            }
            PlaybackEvent::DetectedNowChanged(false) => {}
            PlaybackEvent::Started => info!("Replay started"),
            PlaybackEvent::Stopped => info!("Replay stopped"),
        }
    }
    Ok(())
}
