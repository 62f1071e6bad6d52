// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tab parser for the three supported input formats.
//!
//! Accepts raw text or raw bytes plus an optional forced-format hint,
//! detects the intended format and emits a canonical note list:
//! - Classic ASCII drum tabs (`HH|x-x-|`)
//! - Guitar-tab-style lines carrying two-digit percussion numbers
//!   (`E|-42--|`)
//! - Binary Standard MIDI Files (channel 10 Note-On extraction)

pub mod classic;
pub mod guitar;
pub mod midi;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::lanes::{LaneCatalog, LaneKey};

/// Default velocity for a plain hit
pub const DEFAULT_VELOCITY: f64 = 0.8;

/// A recognized tablature format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabFormat {
    /// Classic ASCII drum notation
    Classic,
    /// Guitar-tab lines with two-digit percussion numbers
    Guitar,
    /// Binary Standard MIDI File
    Midi,
}

impl TabFormat {
    /// Display name for this format
    pub fn as_str(self) -> &'static str {
        match self {
            TabFormat::Classic => "classic",
            TabFormat::Guitar => "guitar",
            TabFormat::Midi => "midi",
        }
    }
}

/// Caller-supplied format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    /// Detect the format from the input
    #[default]
    Auto,
    /// Force classic ASCII parsing
    Classic,
    /// Force guitar-numeric parsing
    Guitar,
    /// Force binary MIDI parsing
    Midi,
}

impl FormatHint {
    /// Parse a hint name (`auto`, `classic`, `guitar`, `midi`)
    pub fn from_name(name: &str) -> Option<FormatHint> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Some(FormatHint::Auto),
            "classic" => Some(FormatHint::Classic),
            "guitar" => Some(FormatHint::Guitar),
            "midi" => Some(FormatHint::Midi),
            _ => None,
        }
    }
}

/// One abstract note event before timing is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNote {
    /// Percussion voice
    pub lane: LaneKey,
    /// Grid position, relative to the start of the chart
    pub step: u32,
    /// Normalized intensity (ghost ~0.3, accents up to 1.2)
    pub velocity: f64,
    /// Whether this is a ghost note (classic format only)
    pub ghost: bool,
}

/// Parser output: canonical unsorted note list plus grid width
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedTab {
    /// Note events, unsorted
    pub notes: Vec<ParsedNote>,
    /// Total grid width in steps
    pub step_count: u32,
    /// Format the input was parsed as (None when nothing was recognized)
    pub detected_format: Option<TabFormat>,
}

impl ParsedTab {
    fn empty(format: Option<TabFormat>) -> Self {
        Self {
            notes: Vec::new(),
            step_count: 0,
            detected_format: format,
        }
    }
}

/// Raw input handed to the parser
#[derive(Debug, Clone, Copy)]
pub enum TabInput<'a> {
    /// UTF-8 tab text (classic or guitar formats)
    Text(&'a str),
    /// Raw file bytes (binary MIDI, or text loaded as bytes)
    Bytes(&'a [u8]),
}

/// Parse failures surfaced to the caller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Binary input selected or detected as MIDI without the `MThd`
    /// signature. The one anomaly that rejects the input entirely.
    #[error("not a Standard MIDI File: missing MThd header")]
    MalformedHeader,
}

/// Options read by `parse`
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Format hint (`Auto` detects)
    pub format: FormatHint,
    /// Grid subdivisions per beat, used by MIDI tick quantization
    pub steps_per_beat: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            format: FormatHint::Auto,
            steps_per_beat: 4,
        }
    }
}

/// Parse raw tab input into a canonical note list.
///
/// A byte buffer opening with the SMF magic is parsed as MIDI
/// regardless of an `Auto` hint; an explicit text hint keeps such a
/// buffer in the text path. Empty or unrecognized text yields an empty
/// result, never an error.
pub fn parse(
    catalog: &LaneCatalog,
    input: TabInput<'_>,
    opts: &ParseOptions,
) -> Result<ParsedTab, ParseError> {
    let bytes = match input {
        TabInput::Text(text) => text.as_bytes(),
        TabInput::Bytes(bytes) => bytes,
    };

    if midi::has_header(bytes) {
        match opts.format {
            // text-specific hints were explicitly supplied; honor them
            FormatHint::Classic | FormatHint::Guitar => {}
            FormatHint::Auto | FormatHint::Midi => {
                return midi::parse(catalog, bytes, opts.steps_per_beat);
            }
        }
    } else if opts.format == FormatHint::Midi {
        return Err(ParseError::MalformedHeader);
    }

    let text = String::from_utf8_lossy(bytes);
    Ok(parse_text(catalog, &text, opts.format))
}

/// Cleaned per-format line content collected from a text scan
struct ScannedText {
    /// Concatenated classic sequences per lane, in catalog key order
    tracks: BTreeMap<LaneKey, String>,
    /// Cleaned guitar string sequences in file order
    guitar: Vec<String>,
}

impl ScannedText {
    fn has_classic(&self) -> bool {
        self.tracks.values().any(|seq| !seq.is_empty())
    }
}

/// Split a line into label and body at the first `:` or `|`
fn split_track_line(line: &str) -> Option<(&str, &str)> {
    let sep = match (line.find(':'), line.find('|')) {
        (Some(c), Some(p)) => c.min(p),
        (Some(c), None) => c,
        (None, Some(p)) => p,
        (None, None) => return None,
    };
    if sep == 0 {
        return None;
    }
    Some((line[..sep].trim(), &line[sep + 1..]))
}

fn scan_lines(catalog: &LaneCatalog, text: &str) -> ScannedText {
    let mut tracks: BTreeMap<LaneKey, String> = BTreeMap::new();
    let mut guitar = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        let Some((label, body)) = split_track_line(line) else {
            continue;
        };

        // String names first: the 'B' string collides with the
        // ride-bell alias.
        if catalog.is_string_name(label) {
            let cleaned = guitar::clean_body(body);
            if !cleaned.is_empty() {
                guitar.push(cleaned);
            }
            continue;
        }

        if let Some(lane) = catalog.lane_for_label(label) {
            // Repeated labels concatenate, supporting multi-row takes
            // of one instrument across bars.
            let cleaned = classic::clean_body(body);
            tracks.entry(lane).or_default().push_str(&cleaned);
        } else {
            debug!(label, "unrecognized track label, line skipped");
        }
    }

    ScannedText { tracks, guitar }
}

fn parse_text(catalog: &LaneCatalog, text: &str, hint: FormatHint) -> ParsedTab {
    let scanned = scan_lines(catalog, text);

    match hint {
        FormatHint::Classic => {
            if !scanned.has_classic() {
                return ParsedTab::empty(Some(TabFormat::Classic));
            }
            classic::build(&scanned.tracks)
        }
        FormatHint::Guitar => {
            if scanned.guitar.is_empty() {
                return ParsedTab::empty(Some(TabFormat::Guitar));
            }
            guitar::build(catalog, scanned.guitar)
        }
        FormatHint::Auto | FormatHint::Midi => {
            if scanned.has_classic() {
                let parsed = classic::build(&scanned.tracks);
                // Alias lines that produce no notes fall through to the
                // numeric parser when string lines are present.
                if !parsed.notes.is_empty() || scanned.guitar.is_empty() {
                    return parsed;
                }
            }
            if scanned.guitar.is_empty() {
                return ParsedTab::empty(None);
            }
            guitar::build(catalog, scanned.guitar)
        }
    }
}
