// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! DRUMTAB - drum tablature parser and playback scheduler.
//!
//! Turns three tablature representations - classic ASCII drum tabs,
//! guitar-tab lines carrying two-digit percussion numbers, and binary
//! Standard MIDI Files - into a single time-quantized chart, then
//! drives that chart through a lookahead playback scheduler with
//! metronome generation.

pub mod chart;
pub mod config;
pub mod lanes;
pub mod parser;
pub mod playback;
pub mod timing;

pub use chart::{build, Chart, ChartNote};
pub use config::SessionFile;
pub use lanes::{Lane, LaneCatalog, LaneKey};
pub use parser::{
    parse, FormatHint, ParseError, ParseOptions, ParsedNote, ParsedTab, TabFormat, TabInput,
};
pub use playback::{PlaybackError, PlaybackEvent, PlaybackState, Player, Transport};
pub use timing::TempoConfig;
