// Timing instrumentation
// A stopwatch driven by pipeline events: it opens on the window's start event
// and closes on its stop event; other events are ignored
//
// Numan Thabit 2025 Nov

use super::profiles::{PipelineEvent, TimingWindow};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug)]
pub struct Stopwatch {
    window: TimingWindow,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Stopwatch {
    pub fn new(window: TimingWindow) -> Self {
        Self {
            window,
            started: None,
            elapsed: None,
        }
    }

    /// Feed a pipeline event as soon as it happens.
    pub fn observe(&mut self, event: PipelineEvent) {
        if event == self.window.start && self.started.is_none() {
            self.started = Some(Instant::now());
            trace!(?event, "timing window opened");
        } else if event == self.window.stop && self.elapsed.is_none() {
            if let Some(started) = self.started {
                self.elapsed = Some(started.elapsed());
                trace!(?event, "timing window closed");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.elapsed.is_none()
    }

    /// Measured window, once closed.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }
}

/// `MM:SS.mmm` from whole milliseconds (truncating integer arithmetic).
pub fn format_duration(millis: u128) -> String {
    let total_seconds = millis / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let ms = millis % 1000;
    format!("{minutes:02}:{seconds:02}.{ms:03}")
}
