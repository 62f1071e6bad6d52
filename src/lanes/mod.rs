// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lane catalog for percussion voices.
//!
//! Provides the fixed catalog of drum lanes in visual stacking order,
//! the classic-tab label alias table, the guitar string-name set, and
//! the bidirectional percussion-number mapping shared by all parsers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one percussion voice. Serialized as the stable key
/// string (`hhc`, `sn`, `bd`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaneKey {
    /// Closed hi-hat
    #[serde(rename = "hhc")]
    HiHatClosed,
    /// Open hi-hat
    #[serde(rename = "hho")]
    HiHatOpen,
    /// Pedal (foot) hi-hat
    #[serde(rename = "hhp")]
    HiHatPedal,
    /// Crash cymbal 1
    #[serde(rename = "cr1")]
    Crash1,
    /// Crash cymbal 2
    #[serde(rename = "cr2")]
    Crash2,
    /// Splash cymbal
    #[serde(rename = "splash")]
    Splash,
    /// China cymbal
    #[serde(rename = "china")]
    China,
    /// Ride cymbal
    #[serde(rename = "ride")]
    Ride,
    /// Ride bell
    #[serde(rename = "ridebell")]
    RideBell,
    /// Snare drum
    #[serde(rename = "sn")]
    Snare,
    /// High tom
    #[serde(rename = "t1")]
    Tom1,
    /// High-mid tom
    #[serde(rename = "t2")]
    Tom2,
    /// Low-mid tom
    #[serde(rename = "t3")]
    Tom3,
    /// Low tom
    #[serde(rename = "t4")]
    Tom4,
    /// Floor tom (high)
    #[serde(rename = "t5")]
    Tom5,
    /// Floor tom (low)
    #[serde(rename = "t6")]
    Tom6,
    /// Bass drum
    #[serde(rename = "bd")]
    BassDrum,
}

impl LaneKey {
    /// All lanes in canonical visual stacking order
    /// (hi-hats/cymbals at the top, bass drum at the bottom).
    pub const ALL: [LaneKey; 17] = [
        LaneKey::HiHatClosed,
        LaneKey::HiHatOpen,
        LaneKey::HiHatPedal,
        LaneKey::Crash1,
        LaneKey::Crash2,
        LaneKey::Splash,
        LaneKey::China,
        LaneKey::Ride,
        LaneKey::RideBell,
        LaneKey::Snare,
        LaneKey::Tom1,
        LaneKey::Tom2,
        LaneKey::Tom3,
        LaneKey::Tom4,
        LaneKey::Tom5,
        LaneKey::Tom6,
        LaneKey::BassDrum,
    ];

    /// Short stable key string for this lane
    pub fn as_str(self) -> &'static str {
        match self {
            LaneKey::HiHatClosed => "hhc",
            LaneKey::HiHatOpen => "hho",
            LaneKey::HiHatPedal => "hhp",
            LaneKey::Crash1 => "cr1",
            LaneKey::Crash2 => "cr2",
            LaneKey::Splash => "splash",
            LaneKey::China => "china",
            LaneKey::Ride => "ride",
            LaneKey::RideBell => "ridebell",
            LaneKey::Snare => "sn",
            LaneKey::Tom1 => "t1",
            LaneKey::Tom2 => "t2",
            LaneKey::Tom3 => "t3",
            LaneKey::Tom4 => "t4",
            LaneKey::Tom5 => "t5",
            LaneKey::Tom6 => "t6",
            LaneKey::BassDrum => "bd",
        }
    }

    /// Parse a stable key string back into a lane
    pub fn from_key(key: &str) -> Option<LaneKey> {
        LaneKey::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    /// Position of this lane in the stacking order. Variants are
    /// declared in stacking order, so the discriminant is the index.
    pub fn catalog_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry: a percussion voice with its display attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lane {
    /// Stable lane key
    pub key: LaneKey,
    /// Display label
    pub label: &'static str,
    /// Representative General-MIDI percussion number
    pub number: u8,
    /// Render color (cosmetic)
    pub color: &'static str,
}

/// Catalog entries in stacking order. Matches `LaneKey::ALL`.
const CATALOG: [Lane; 17] = [
    Lane { key: LaneKey::HiHatClosed, label: "Closed Hi-Hat", number: 42, color: "#ffd166" },
    Lane { key: LaneKey::HiHatOpen, label: "Open Hi-Hat", number: 46, color: "#ffb347" },
    Lane { key: LaneKey::HiHatPedal, label: "Pedal Hi-Hat", number: 44, color: "#ffc14d" },
    Lane { key: LaneKey::Crash1, label: "Crash 1", number: 49, color: "#f7a8f0" },
    Lane { key: LaneKey::Crash2, label: "Crash 2", number: 57, color: "#f58ae6" },
    Lane { key: LaneKey::Splash, label: "Splash", number: 55, color: "#f6cf6f" },
    Lane { key: LaneKey::China, label: "China", number: 52, color: "#f68f6f" },
    Lane { key: LaneKey::Ride, label: "Ride", number: 51, color: "#9ad1ff" },
    Lane { key: LaneKey::RideBell, label: "Ride Bell", number: 53, color: "#8bc7ff" },
    Lane { key: LaneKey::Snare, label: "Snare", number: 38, color: "#ef476f" },
    Lane { key: LaneKey::Tom1, label: "High Tom", number: 50, color: "#d4e157" },
    Lane { key: LaneKey::Tom2, label: "High-Mid Tom", number: 48, color: "#b0d445" },
    Lane { key: LaneKey::Tom3, label: "Low-Mid Tom", number: 47, color: "#8cc64a" },
    Lane { key: LaneKey::Tom4, label: "Low Tom", number: 45, color: "#5cc06e" },
    Lane { key: LaneKey::Tom5, label: "Floor Tom High", number: 43, color: "#41b58a" },
    Lane { key: LaneKey::Tom6, label: "Floor Tom Low", number: 41, color: "#2aa57a" },
    Lane { key: LaneKey::BassDrum, label: "Bass Drum", number: 36, color: "#06d6a0" },
];

/// Percussion numbers that map into a lane but are not that lane's
/// representative number (kit variants sharing a voice).
const NUMBER_ALIASES: [(u8, LaneKey); 5] = [
    (35, LaneKey::BassDrum),  // Acoustic Bass Drum
    (37, LaneKey::Snare),     // Side Stick
    (39, LaneKey::Snare),     // Hand Clap
    (40, LaneKey::Snare),     // Electric Snare
    (59, LaneKey::Ride),      // Ride 2
];

/// Classic-format label aliases, matched after normalization
/// (lowercased, non-alphanumerics stripped).
const LABEL_ALIASES: [(&str, LaneKey); 42] = [
    ("hh", LaneKey::HiHatClosed),
    ("hc", LaneKey::HiHatClosed),
    ("h", LaneKey::HiHatClosed),
    ("ch", LaneKey::HiHatClosed),
    ("c", LaneKey::HiHatClosed),
    ("hat", LaneKey::HiHatClosed),
    ("ho", LaneKey::HiHatOpen),
    ("oh", LaneKey::HiHatOpen),
    ("hho", LaneKey::HiHatOpen),
    ("hp", LaneKey::HiHatPedal),
    ("hf", LaneKey::HiHatPedal),
    ("hhp", LaneKey::HiHatPedal),
    ("cc", LaneKey::Crash1),
    ("cr", LaneKey::Crash1),
    ("c1", LaneKey::Crash1),
    ("crash", LaneKey::Crash1),
    ("c2", LaneKey::Crash2),
    ("sp", LaneKey::Splash),
    ("spl", LaneKey::Splash),
    ("splash", LaneKey::Splash),
    ("cn", LaneKey::China),
    ("china", LaneKey::China),
    ("rd", LaneKey::Ride),
    ("ri", LaneKey::Ride),
    ("cy", LaneKey::Ride),
    ("cym", LaneKey::Ride),
    ("ride", LaneKey::Ride),
    ("rb", LaneKey::RideBell),
    // 'b' is shadowed by the guitar string-name set, which callers
    // must check first.
    ("b", LaneKey::RideBell),
    ("bell", LaneKey::RideBell),
    ("sn", LaneKey::Snare),
    ("s", LaneKey::Snare),
    ("sd", LaneKey::Snare),
    ("snare", LaneKey::Snare),
    ("tt", LaneKey::Tom2),
    ("ft", LaneKey::Tom5),
    ("f1", LaneKey::Tom5),
    ("f2", LaneKey::Tom6),
    ("k", LaneKey::BassDrum),
    ("bs", LaneKey::BassDrum),
    ("kick", LaneKey::BassDrum),
    ("bass", LaneKey::BassDrum),
];

/// Guitar-tab string labels. Checked before the alias table because
/// the 'b' string collides with the ride-bell alias.
const STRING_NAMES: [&str; 5] = ["e", "a", "d", "g", "b"];

/// The immutable lane catalog, injected into parser, builder and player.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaneCatalog;

impl LaneCatalog {
    /// Create the catalog
    pub fn new() -> Self {
        LaneCatalog
    }

    /// All lanes in stacking order
    pub fn lanes(&self) -> &'static [Lane] {
        &CATALOG
    }

    /// Full catalog entry for a lane
    pub fn lane(&self, key: LaneKey) -> &'static Lane {
        &CATALOG[key.catalog_index()]
    }

    /// Representative percussion number for a lane
    pub fn number_for_lane(&self, key: LaneKey) -> u8 {
        self.lane(key).number
    }

    /// Map a percussion number to its lane, if known
    pub fn lane_for_number(&self, number: u8) -> Option<LaneKey> {
        if let Some(lane) = CATALOG.iter().find(|l| l.number == number) {
            return Some(lane.key);
        }
        NUMBER_ALIASES
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, key)| *key)
    }

    /// Map a classic-tab label to its lane, if known.
    ///
    /// The label is normalized first: lowercased with everything but
    /// ascii letters and digits stripped. Lane keys themselves
    /// (`t1`..`t6`, `bd`, ...) always resolve.
    pub fn lane_for_label(&self, label: &str) -> Option<LaneKey> {
        let norm = normalize_label(label);
        if norm.is_empty() {
            return None;
        }
        if let Some(key) = LaneKey::from_key(&norm) {
            return Some(key);
        }
        LABEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == norm)
            .map(|(_, key)| *key)
    }

    /// Whether a label names a guitar string (`e a d g b`)
    pub fn is_string_name(&self, label: &str) -> bool {
        let norm = normalize_label(label);
        STRING_NAMES.contains(&norm.as_str())
    }
}

/// Lowercase and strip everything but ascii letters and digits.
pub(crate) fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
