// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Guitar-numeric sub-parser.
//!
//! Lines labeled with string names (`e a d g b`) carry two-digit
//! percussion numbers in place of fret numbers (`E|-42--|` is a closed
//! hi-hat at step 1). Two adjacent digits form one token consuming two
//! columns; single-digit percussion numbers are not supported, so a
//! digit that cannot complete a valid pair is noise.

use tracing::debug;

use crate::lanes::LaneCatalog;

use super::{ParsedNote, ParsedTab, TabFormat, DEFAULT_VELOCITY};

/// Rest column
const REST: char = '-';

/// Clean a raw string-line body down to digits and rests.
/// Bar separators, whitespace and ornaments are dropped.
pub(crate) fn clean_body(body: &str) -> String {
    body.chars()
        .filter(|c| *c == REST || c.is_ascii_digit())
        .collect()
}

/// Scan cleaned string sequences for two-digit percussion tokens.
pub(crate) fn build(catalog: &LaneCatalog, mut seqs: Vec<String>) -> ParsedTab {
    let max_len = seqs.iter().map(|seq| seq.chars().count()).max().unwrap_or(0);
    if max_len == 0 {
        return ParsedTab {
            notes: Vec::new(),
            step_count: 0,
            detected_format: Some(TabFormat::Guitar),
        };
    }

    // Pad every string to the same width
    for seq in &mut seqs {
        let len = seq.chars().count();
        if len < max_len {
            seq.extend(std::iter::repeat(REST).take(max_len - len));
        }
    }

    let mut notes = Vec::new();
    for seq in &seqs {
        let glyphs: Vec<char> = seq.chars().collect();
        let mut i = 0;
        while i < glyphs.len() {
            if glyphs[i].is_ascii_digit() && i + 1 < glyphs.len() && glyphs[i + 1].is_ascii_digit()
            {
                let number = (glyphs[i] as u8 - b'0') * 10 + (glyphs[i + 1] as u8 - b'0');
                if let Some(lane) = catalog.lane_for_number(number) {
                    notes.push(ParsedNote {
                        lane,
                        step: i as u32,
                        velocity: DEFAULT_VELOCITY,
                        ghost: false,
                    });
                    // the token consumed both columns
                    i += 2;
                    continue;
                }
                debug!(number, "unmapped percussion number dropped");
                // The first digit is noise; the second is NOT consumed
                // and may start a new token.
            }
            i += 1;
        }
    }

    ParsedTab {
        notes,
        step_count: max_len as u32,
        detected_format: Some(TabFormat::Guitar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::LaneKey;
    use crate::parser::{parse, ParseOptions, TabInput};

    fn parse_guitar(text: &str) -> ParsedTab {
        let catalog = LaneCatalog::new();
        parse(&catalog, TabInput::Text(text), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_clean_body() {
        assert_eq!(clean_body("-42--|"), "-42--");
        assert_eq!(clean_body(" -4 2h-- "), "-42--");
        assert_eq!(clean_body("xyz"), "");
    }

    #[test]
    fn test_two_digit_token() {
        let parsed = parse_guitar("E|-42--|");
        assert_eq!(parsed.step_count, 5);
        assert_eq!(parsed.notes.len(), 1);
        let note = &parsed.notes[0];
        assert_eq!(note.lane, LaneKey::HiHatClosed);
        assert_eq!(note.step, 1);
        assert_eq!(note.velocity, DEFAULT_VELOCITY);
        assert!(!note.ghost);
    }

    #[test]
    fn test_adjacent_tokens_consume_two_columns_each() {
        // 3838 scans as two snare tokens at steps 0 and 2
        let parsed = parse_guitar("G|3838|");
        assert_eq!(parsed.notes.len(), 2);
        assert_eq!(parsed.notes[0].lane, LaneKey::Snare);
        assert_eq!(parsed.notes[0].step, 0);
        assert_eq!(parsed.notes[1].lane, LaneKey::Snare);
        assert_eq!(parsed.notes[1].step, 2);
    }

    #[test]
    fn test_lone_digit_is_noise() {
        let parsed = parse_guitar("E|--4--|");
        assert!(parsed.notes.is_empty());
        assert_eq!(parsed.step_count, 5);

        // Trailing digit cannot complete a pair
        let parsed = parse_guitar("E|-383|");
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].step, 1);
    }

    #[test]
    fn test_unmapped_pair_first_digit_skipped() {
        // 93 maps to nothing; scan resumes at the 3, which pairs with 8
        let parsed = parse_guitar("A|938-|");
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].lane, LaneKey::Snare);
        assert_eq!(parsed.notes[0].step, 1);

        // Fully unmapped run produces nothing
        let parsed = parse_guitar("A|99-99|");
        assert!(parsed.notes.is_empty());
    }

    #[test]
    fn test_multiple_strings_padded() {
        let parsed = parse_guitar("E|-42--42-|\nA|36|");
        assert_eq!(parsed.step_count, 8);
        let bd: Vec<u32> = parsed
            .notes
            .iter()
            .filter(|n| n.lane == LaneKey::BassDrum)
            .map(|n| n.step)
            .collect();
        assert_eq!(bd, vec![0]);
        let hh: Vec<u32> = parsed
            .notes
            .iter()
            .filter(|n| n.lane == LaneKey::HiHatClosed)
            .map(|n| n.step)
            .collect();
        assert_eq!(hh, vec![1, 5]);
    }

    #[test]
    fn test_string_name_b_not_treated_as_bell_lane() {
        // 'B' is a string label here, not the ride-bell alias
        let parsed = parse_guitar("B|-51-|");
        assert_eq!(parsed.detected_format, Some(TabFormat::Guitar));
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].lane, LaneKey::Ride);
    }

    #[test]
    fn test_scan_cursor_advancement() {
        // N valid tokens advance the cursor by exactly 2N plus noise:
        // 42 42 42 back to back leaves no overlapping tokens
        let parsed = parse_guitar("D|424242|");
        let steps: Vec<u32> = parsed.notes.iter().map(|n| n.step).collect();
        assert_eq!(steps, vec![0, 2, 4]);
    }
}
