// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session configuration.
//!
//! This module provides the YAML session file: tempo settings,
//! metronome toggle, per-lane mutes and an optional format override,
//! loaded by the CLI and applied to the player.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::lanes::LaneKey;
use crate::parser::FormatHint;
use crate::timing::TempoConfig;

/// Root configuration for a practice session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFile {
    /// Tempo and grid settings
    #[serde(default)]
    pub tempo: TempoConfig,
    /// Whether metronome ticks are produced
    #[serde(default = "default_metronome")]
    pub metronome: bool,
    /// Lane keys muted during playback
    #[serde(default)]
    pub muted: Vec<LaneKey>,
    /// Format override: auto, classic, guitar or midi
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_metronome() -> bool {
    true
}
fn default_format() -> String {
    "auto".to_string()
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            tempo: TempoConfig::default(),
            metronome: default_metronome(),
            muted: Vec::new(),
            format: default_format(),
        }
    }
}

impl SessionFile {
    /// Load a session configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read session file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a session configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML session configuration")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize session configuration to YAML")
    }

    /// Save the configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write session file: {:?}", path.as_ref()))
    }

    /// The parser hint named by the format override; unknown names
    /// fall back to auto detection
    pub fn format_hint(&self) -> FormatHint {
        FormatHint::from_name(&self.format).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session() {
        let yaml = r#"
tempo:
  bpm: 96
  steps_per_beat: 4
  lead_in: 2.0
  beats_per_bar: 3

metronome: false

muted:
  - sn
  - bd
"#;
        let session = SessionFile::from_yaml(yaml).unwrap();
        assert_eq!(session.tempo.bpm(), 96.0);
        assert_eq!(session.tempo.lead_in(), 2.0);
        assert_eq!(session.tempo.beats_per_bar(), 3);
        assert!(!session.metronome);
        assert_eq!(session.muted, vec![LaneKey::Snare, LaneKey::BassDrum]);
        assert_eq!(session.format_hint(), FormatHint::Auto);
    }

    #[test]
    fn test_default_values() {
        let session = SessionFile::from_yaml("{}").unwrap();
        assert_eq!(session, SessionFile::default());
        assert_eq!(session.tempo.bpm(), 120.0);
        assert!(session.metronome);
        assert!(session.muted.is_empty());
    }

    #[test]
    fn test_format_override() {
        let session = SessionFile::from_yaml("format: guitar").unwrap();
        assert_eq!(session.format_hint(), FormatHint::Guitar);

        let session = SessionFile::from_yaml("format: MIDI").unwrap();
        assert_eq!(session.format_hint(), FormatHint::Midi);

        // Unknown names fall back to auto
        let session = SessionFile::from_yaml("format: nonsense").unwrap();
        assert_eq!(session.format_hint(), FormatHint::Auto);
    }

    #[test]
    fn test_round_trip() {
        let original = SessionFile {
            tempo: TempoConfig {
                bpm: 140.0,
                steps_per_beat: 8,
                lead_in: 1.0,
                beats_per_bar: 7,
                beat_unit: 8,
            },
            metronome: true,
            muted: vec![LaneKey::HiHatClosed, LaneKey::Crash1],
            format: "classic".to_string(),
        };

        let yaml = original.to_yaml().unwrap();
        let parsed = SessionFile::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_save_and_load() {
        let session = SessionFile {
            tempo: TempoConfig::with_bpm(132.0),
            muted: vec![LaneKey::Ride],
            ..Default::default()
        };

        let file = tempfile::NamedTempFile::new().unwrap();
        session.save(file.path()).unwrap();
        let loaded = SessionFile::load(file.path()).unwrap();
        assert_eq!(session, loaded);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = SessionFile::load("/nonexistent/session.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read session file"));
    }

    #[test]
    fn test_invalid_yaml_errors() {
        assert!(SessionFile::from_yaml("tempo: [not, a, map]").is_err());
    }
}
