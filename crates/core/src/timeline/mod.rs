use serde::{Deserialize, Serialize};

use crate::{config::TimingConfig, MorphError, Result};

#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    pub time_seconds: f64,
}

impl FrameClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance_to(&mut self, time_seconds: f64) {
        self.time_seconds = self.time_seconds.max(time_seconds);
    }

    pub fn millis(&self) -> f64 {
        self.time_seconds * 1000.0
    }
}

/// Something due at a point on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Tick {
    /// The display wants a new frame.
    Display { index: u64, time_seconds: f64 },
    /// The camera delivered a new video frame.
    Video { index: u64, time_seconds: f64 },
}

impl Tick {
    pub fn time_seconds(&self) -> f64 {
        match self {
            Tick::Display { time_seconds, .. } | Tick::Video { time_seconds, .. } => *time_seconds,
        }
    }
}

/// Interleaves display refreshes and video frames running at independent
/// rates, for driving the core without a real display or camera.
///
/// When both fall due at the same instant the video tick comes first, so a
/// frame always renders with the freshest mode.
#[derive(Debug, Clone)]
pub struct Scheduler {
    display_interval: f64,
    video_interval: f64,
    next_display: u64,
    next_video: u64,
}

impl Scheduler {
    /// `display_hz` must be finite and positive. A `video_hz` of zero or
    /// below disables video ticks.
    pub fn new(display_hz: f32, video_hz: f32) -> Result<Self> {
        if !display_hz.is_finite() || display_hz <= 0.0 {
            return Err(MorphError::invalid(format!(
                "display rate must be a positive number of hertz, got {display_hz}"
            )));
        }
        if !video_hz.is_finite() {
            return Err(MorphError::invalid(format!(
                "video rate must be finite, got {video_hz}"
            )));
        }

        Ok(Self {
            display_interval: interval(display_hz),
            video_interval: interval(video_hz),
            next_display: 0,
            next_video: 0,
        })
    }

    pub fn from_config(config: &TimingConfig) -> Result<Self> {
        Self::new(config.display_hz, config.video_hz)
    }

    /// Returns the next due tick and moves the clock to it.
    pub fn tick(&mut self, clock: &mut FrameClock) -> Tick {
        let display_at = due_at(self.next_display, self.display_interval);
        let video_at = due_at(self.next_video, self.video_interval);

        let tick = if video_at <= display_at {
            let tick = Tick::Video {
                index: self.next_video,
                time_seconds: video_at,
            };
            self.next_video += 1;
            tick
        } else {
            let tick = Tick::Display {
                index: self.next_display,
                time_seconds: display_at,
            };
            self.next_display += 1;
            tick
        };

        clock.advance_to(tick.time_seconds());
        tick
    }

    pub fn display_frames_emitted(&self) -> u64 {
        self.next_display
    }
}

fn due_at(index: u64, interval: f64) -> f64 {
    if interval.is_finite() {
        index as f64 * interval
    } else {
        f64::INFINITY
    }
}

fn interval(hz: f32) -> f64 {
    if hz > 0.0 {
        1.0 / hz as f64
    } else {
        f64::INFINITY
    }
}
