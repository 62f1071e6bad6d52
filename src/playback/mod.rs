// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback engine.
//!
//! This module provides the playback infrastructure:
//! - Transport state machine with computed performance time
//! - Lookahead scheduler emitting metronome ticks and note triggers

pub mod scheduler;
pub mod transport;

pub use scheduler::{PlaybackError, PlaybackEvent, Player, DEFAULT_LOOKAHEAD};
pub use transport::{PlaybackState, Transport};
