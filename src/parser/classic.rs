// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Classic ASCII drum tab sub-parser.
//!
//! Track lines are labeled with lane aliases (`HH|x-x-|`, `SN: --o-`).
//! Glyphs carry velocity: `x` normal, `o`/`O` soft accent, `X`/`*`
//! strong, `!` extra strong, `(x)` ghost. Bar separators and unknown
//! characters are dropped during cleaning.

use std::collections::BTreeMap;

use crate::lanes::LaneKey;

use super::{ParsedNote, ParsedTab, TabFormat, DEFAULT_VELOCITY};

/// Rest column
pub(crate) const REST: char = '-';

/// Internal one-glyph ghost token. Never present in raw input ('g' is
/// dropped as noise during cleaning), so it cannot collide.
pub(crate) const GHOST_MARK: char = 'g';

fn is_hit_glyph(c: char) -> bool {
    matches!(c, 'x' | 'X' | 'o' | 'O' | '*' | '!')
}

/// Clean a raw track body into step glyphs.
///
/// Drops `|` bar separators, whitespace and unrecognized characters.
/// A parenthesized hit like `(o)` spans three source columns and is
/// encoded as one ghost token plus two rests so that step alignment
/// with sibling lanes is preserved.
pub(crate) fn clean_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '|' => {}
            REST => out.push(REST),
            c if is_hit_glyph(c) => out.push(c),
            '(' => {
                let mut look = chars.clone();
                match (look.next(), look.next()) {
                    (Some(inner), Some(')')) if is_hit_glyph(inner) => {
                        chars = look;
                        out.push(GHOST_MARK);
                        out.push(REST);
                        out.push(REST);
                    }
                    // stray paren is noise
                    _ => {}
                }
            }
            _ => {}
        }
    }

    out
}

/// Velocity and ghost flag for a cleaned glyph; None is a rest
fn glyph_velocity(glyph: char) -> Option<(f64, bool)> {
    match glyph {
        GHOST_MARK => Some((0.3, true)),
        'o' | 'O' => Some((0.5, false)),
        'x' => Some((DEFAULT_VELOCITY, false)),
        'X' | '*' => Some((1.0, false)),
        '!' => Some((1.2, false)),
        _ => None,
    }
}

/// Build the canonical note list from concatenated per-lane sequences.
///
/// Every lane is right-padded with rests to the longest sequence, so
/// each lane has a defined glyph at every step. A step may carry
/// simultaneous notes on any subset of lanes.
pub(crate) fn build(tracks: &BTreeMap<LaneKey, String>) -> ParsedTab {
    let max_len = tracks.values().map(|seq| seq.chars().count()).max().unwrap_or(0);
    if max_len == 0 {
        return ParsedTab {
            notes: Vec::new(),
            step_count: 0,
            detected_format: Some(TabFormat::Classic),
        };
    }

    let padded: Vec<(LaneKey, Vec<char>)> = tracks
        .iter()
        .map(|(&lane, seq)| {
            let mut glyphs: Vec<char> = seq.chars().collect();
            glyphs.resize(max_len, REST);
            (lane, glyphs)
        })
        .collect();

    let mut notes = Vec::new();
    for step in 0..max_len {
        for (lane, glyphs) in &padded {
            if let Some((velocity, ghost)) = glyph_velocity(glyphs[step]) {
                notes.push(ParsedNote {
                    lane: *lane,
                    step: step as u32,
                    velocity,
                    ghost,
                });
            }
        }
    }

    ParsedTab {
        notes,
        step_count: max_len as u32,
        detected_format: Some(TabFormat::Classic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::{LaneCatalog, LaneKey};
    use crate::parser::{parse, ParseOptions, TabInput};

    fn parse_classic(text: &str) -> ParsedTab {
        let catalog = LaneCatalog::new();
        parse(&catalog, TabInput::Text(text), &ParseOptions::default()).unwrap()
    }

    fn note_at(parsed: &ParsedTab, lane: LaneKey, step: u32) -> Option<&ParsedNote> {
        parsed
            .notes
            .iter()
            .find(|n| n.lane == lane && n.step == step)
    }

    #[test]
    fn test_clean_body_drops_separators_and_noise() {
        assert_eq!(clean_body("x-x-|x-x-|"), "x-x-x-x-");
        assert_eq!(clean_body("  x - x - "), "x-x-");
        assert_eq!(clean_body("x?z-#-"), "x--");
    }

    #[test]
    fn test_clean_body_ghost_spans_three_columns() {
        let cleaned = clean_body("(o)-x-");
        assert_eq!(cleaned, "g---x-");
        assert_eq!(cleaned.chars().count(), 6);

        // A malformed paren is dropped alone; what follows is kept
        assert_eq!(clean_body("(o-x"), "o-x");
        assert_eq!(clean_body("(-)x"), "-x");
        assert_eq!(clean_body("x("), "x");
    }

    #[test]
    fn test_glyph_velocities() {
        let parsed = parse_classic("SN|xX*!oO(x)|");
        // (x) occupies three columns: steps 6, 7, 8
        assert_eq!(parsed.step_count, 9);

        let expect = [
            (0, 0.8, false),
            (1, 1.0, false),
            (2, 1.0, false),
            (3, 1.2, false),
            (4, 0.5, false),
            (5, 0.5, false),
            (6, 0.3, true),
        ];
        assert_eq!(parsed.notes.len(), expect.len());
        for (step, velocity, ghost) in expect {
            let note = note_at(&parsed, LaneKey::Snare, step).unwrap();
            assert_eq!(note.velocity, velocity, "step {step}");
            assert_eq!(note.ghost, ghost, "step {step}");
        }
    }

    #[test]
    fn test_lanes_padded_to_longest() {
        let parsed = parse_classic("HH|x-x-x-x-|\nBD|o-|");
        assert_eq!(parsed.step_count, 8);
        assert!(note_at(&parsed, LaneKey::BassDrum, 0).is_some());
        // Padding adds rests, never notes
        assert_eq!(
            parsed
                .notes
                .iter()
                .filter(|n| n.lane == LaneKey::BassDrum)
                .count(),
            1
        );
    }

    #[test]
    fn test_repeated_labels_concatenate() {
        // Two rows of the same instrument form one 8-step sequence
        let parsed = parse_classic("BD|o---|\nBD|--o-|");
        assert_eq!(parsed.step_count, 8);
        assert!(note_at(&parsed, LaneKey::BassDrum, 0).is_some());
        assert!(note_at(&parsed, LaneKey::BassDrum, 6).is_some());
    }

    #[test]
    fn test_simultaneous_notes_on_one_step() {
        let parsed = parse_classic("HH|x|\nSN|x|\nBD|x|");
        assert_eq!(parsed.step_count, 1);
        assert_eq!(parsed.notes.len(), 3);
        let lanes: Vec<LaneKey> = parsed.notes.iter().map(|n| n.lane).collect();
        assert!(lanes.contains(&LaneKey::HiHatClosed));
        assert!(lanes.contains(&LaneKey::Snare));
        assert!(lanes.contains(&LaneKey::BassDrum));
    }

    #[test]
    fn test_extended_lane_labels() {
        let parsed = parse_classic("CC|x---|\nT1|-x--|\nFT|--x-|\nHO|---x|");
        assert!(note_at(&parsed, LaneKey::Crash1, 0).is_some());
        assert!(note_at(&parsed, LaneKey::Tom1, 1).is_some());
        assert!(note_at(&parsed, LaneKey::Tom5, 2).is_some());
        assert!(note_at(&parsed, LaneKey::HiHatOpen, 3).is_some());
    }

    #[test]
    fn test_unknown_labels_skipped() {
        let parsed = parse_classic("ZZ|xxxx|\nBD|o---|");
        assert_eq!(parsed.step_count, 4);
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].lane, LaneKey::BassDrum);
    }
}
