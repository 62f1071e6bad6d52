// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback transport: state machine and performance time.
//!
//! The current position is computed from wall-clock time, never
//! stored: pausing freezes it by remembering when the pause began, and
//! resuming adds the gap to the accumulated paused duration.

use std::time::{Duration, Instant};

use tracing::info;

/// Playback session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No session
    #[default]
    Idle,
    /// Session running
    Playing,
    /// Session frozen, resumable
    Paused,
    /// Session discarded; a fresh start begins at zero
    Stopped,
}

/// Transport clock for one playback session
#[derive(Debug, Clone)]
pub struct Transport {
    state: PlaybackState,
    /// Wall clock at the moment play began
    started_at: Option<Instant>,
    /// Total time spent paused so far
    pause_accum: Duration,
    /// Wall clock at the moment the current pause began
    pause_started: Option<Instant>,
}

impl Transport {
    /// Create an idle transport
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            started_at: None,
            pause_accum: Duration::ZERO,
            pause_started: None,
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the session is running
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Begin a session at position zero. Starting while already
    /// playing restarts position tracking; sessions never layer.
    pub fn start(&mut self) {
        self.state = PlaybackState::Playing;
        self.started_at = Some(Instant::now());
        self.pause_accum = Duration::ZERO;
        self.pause_started = None;
        info!("transport started");
    }

    /// Freeze the position. Only meaningful while playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.pause_started = Some(Instant::now());
        info!("transport paused");
    }

    /// Continue from the frozen position. Only meaningful while
    /// paused; there is no resume after stop.
    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        if let Some(pause_started) = self.pause_started.take() {
            self.pause_accum += pause_started.elapsed();
        }
        self.state = PlaybackState::Playing;
        info!("transport resumed");
    }

    /// Discard the session and reset the position to zero
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.started_at = None;
        self.pause_started = None;
        self.pause_accum = Duration::ZERO;
        info!("transport stopped");
    }

    /// Current performance time in seconds.
    ///
    /// Zero in idle/stopped; frozen at the pause point while paused;
    /// wall clock minus start minus accumulated pauses while playing.
    pub fn position(&self) -> f64 {
        match self.state {
            PlaybackState::Idle | PlaybackState::Stopped => 0.0,
            PlaybackState::Paused => match (self.pause_started, self.started_at) {
                (Some(pause_started), Some(started_at)) => pause_started
                    .duration_since(started_at)
                    .saturating_sub(self.pause_accum)
                    .as_secs_f64(),
                _ => 0.0,
            },
            PlaybackState::Playing => match self.started_at {
                Some(started_at) => started_at
                    .elapsed()
                    .saturating_sub(self.pause_accum)
                    .as_secs_f64(),
                None => 0.0,
            },
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}
