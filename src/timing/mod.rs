// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tempo configuration.
//!
//! Holds the externally supplied playback settings and derives step and
//! beat durations from them. Fields are stored raw and clamped on every
//! read, so the builder and scheduler always see valid values even when
//! the struct is edited between frames.

use serde::{Deserialize, Serialize};

/// Tempo and grid settings read on each chart build and scheduler frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Tempo in BPM (valid 20-300)
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Grid subdivisions per beat (valid 1-12, 4 = sixteenth notes)
    #[serde(default = "default_steps_per_beat")]
    pub steps_per_beat: u32,
    /// Silent lead-in seconds before step 0
    #[serde(default)]
    pub lead_in: f64,
    /// Time signature numerator (valid 1-32), metronome accent cadence
    #[serde(default = "default_beats_per_bar")]
    pub beats_per_bar: u32,
    /// Time signature denominator (valid 1-32)
    #[serde(default = "default_beat_unit")]
    pub beat_unit: u32,
}

fn default_bpm() -> f64 {
    120.0
}
fn default_steps_per_beat() -> u32 {
    4
}
fn default_beats_per_bar() -> u32 {
    4
}
fn default_beat_unit() -> u32 {
    4
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            steps_per_beat: default_steps_per_beat(),
            lead_in: 0.0,
            beats_per_bar: default_beats_per_bar(),
            beat_unit: default_beat_unit(),
        }
    }
}

impl TempoConfig {
    /// Create a config with the given tempo, defaults elsewhere
    pub fn with_bpm(bpm: f64) -> Self {
        Self {
            bpm,
            ..Default::default()
        }
    }

    /// Tempo clamped to 20-300 BPM
    pub fn bpm(&self) -> f64 {
        if self.bpm.is_finite() {
            self.bpm.clamp(20.0, 300.0)
        } else {
            default_bpm()
        }
    }

    /// Steps per beat clamped to 1-12
    pub fn steps_per_beat(&self) -> u32 {
        self.steps_per_beat.clamp(1, 12)
    }

    /// Lead-in clamped to be non-negative
    pub fn lead_in(&self) -> f64 {
        if self.lead_in.is_finite() {
            self.lead_in.max(0.0)
        } else {
            0.0
        }
    }

    /// Time signature numerator clamped to 1-32
    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar.clamp(1, 32)
    }

    /// Time signature denominator clamped to 1-32
    pub fn beat_unit(&self) -> u32 {
        self.beat_unit.clamp(1, 32)
    }

    /// Seconds per beat at the current tempo
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.bpm()
    }

    /// Seconds per grid step: `60 / bpm / steps_per_beat`
    pub fn step_duration(&self) -> f64 {
        self.beat_duration() / self.steps_per_beat() as f64
    }

    /// Grid steps per bar
    pub fn steps_per_bar(&self) -> u32 {
        self.beats_per_bar() * self.steps_per_beat()
    }
}
