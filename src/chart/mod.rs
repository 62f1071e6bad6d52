// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chart builder.
//!
//! Converts a parsed note list plus the current tempo configuration
//! into an immutable, time-resolved chart. The step-to-time mapping is
//! baked in at build time, so tempo changes require building a new
//! chart rather than mutating one in place.

use crate::lanes::{Lane, LaneCatalog, LaneKey};
use crate::parser::{ParsedTab, TabFormat};
use crate::timing::TempoConfig;

/// One time-resolved note event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartNote {
    /// Percussion voice
    pub lane: LaneKey,
    /// Grid position
    pub step: u32,
    /// Normalized intensity
    pub velocity: f64,
    /// Whether this is a ghost note
    pub ghost: bool,
    /// Absolute seconds: `lead_in + step * step_duration`
    pub time: f64,
}

/// The immutable unit handed to the renderer and the scheduler.
/// Rebuilt wholesale on every re-parse or tempo change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chart {
    notes: Vec<ChartNote>,
    step_count: u32,
    step_duration: f64,
    lead_in: f64,
    lanes: Vec<&'static Lane>,
    detected_format: Option<TabFormat>,
}

impl Chart {
    /// Notes in playback order (ascending time; catalog order within
    /// one step)
    pub fn notes(&self) -> &[ChartNote] {
        &self.notes
    }

    /// Total grid width in steps
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Seconds per grid step, baked at build time
    pub fn step_duration(&self) -> f64 {
        self.step_duration
    }

    /// Lanes actually present, in catalog stacking order
    pub fn lanes(&self) -> &[&'static Lane] {
        &self.lanes
    }

    /// Format the source was parsed as
    pub fn detected_format(&self) -> Option<TabFormat> {
        self.detected_format
    }

    /// Whether the chart carries no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total chart duration in seconds, lead-in included
    pub fn duration(&self) -> f64 {
        self.lead_in + f64::from(self.step_count) * self.step_duration
    }
}

/// Build a chart from a parse result and the current tempo settings.
/// Pure: equal inputs produce equal charts.
pub fn build(catalog: &LaneCatalog, parsed: &ParsedTab, tempo: &TempoConfig) -> Chart {
    let step_duration = tempo.step_duration();
    let lead_in = tempo.lead_in();

    let mut notes: Vec<ChartNote> = parsed
        .notes
        .iter()
        .map(|n| ChartNote {
            lane: n.lane,
            step: n.step,
            velocity: n.velocity,
            ghost: n.ghost,
            time: lead_in + f64::from(n.step) * step_duration,
        })
        .collect();
    notes.sort_by_key(|n| (n.step, n.lane.catalog_index()));

    // Catalog order, never input order, keeps row indices stable no
    // matter how the source text ordered its tracks.
    let lanes = catalog
        .lanes()
        .iter()
        .filter(|lane| notes.iter().any(|n| n.lane == lane.key))
        .collect();

    Chart {
        notes,
        step_count: parsed.step_count,
        step_duration,
        lead_in,
        lanes,
        detected_format: parsed.detected_format,
    }
}
