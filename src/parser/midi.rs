// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Binary Standard MIDI File sub-parser.
//!
//! Extracts Note-On events on the percussion channel (channel index 9)
//! and quantizes their tick positions onto the step grid. Everything
//! else in the file (other channels, meta events, sysex, controllers)
//! is skipped byte-accurately to keep the cursor aligned. Tempo meta
//! events are NOT applied to timing: quantization uses ticks-per-quarter
//! and steps-per-beat only.

use std::collections::HashSet;

use tracing::debug;

use crate::lanes::LaneCatalog;

use super::{ParseError, ParsedNote, ParsedTab, TabFormat};

const HEADER_MAGIC: &[u8; 4] = b"MThd";
const TRACK_MAGIC: &[u8; 4] = b"MTrk";

/// Channel index carrying percussion in General MIDI
const PERCUSSION_CHANNEL: u8 = 9;

/// Fixed fallback for SMPTE-style division. Frame-based timing is
/// intentionally not computed.
const SMPTE_FALLBACK_TPQ: u32 = 480;

/// MIDI velocities rescale onto this normalized range
const VELOCITY_FLOOR: f64 = 0.2;

/// Whether a buffer opens with the SMF header signature
pub(crate) fn has_header(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == HEADER_MAGIC
}

/// Bounds-checked big-endian byte cursor
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn u8(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn u32(&mut self) -> Option<u32> {
        let bytes = self.bytes(4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn skip(&mut self, n: usize) -> bool {
        match self.pos.checked_add(n) {
            Some(end) if end <= self.data.len() => {
                self.pos = end;
                true
            }
            _ => false,
        }
    }

    fn back(&mut self) {
        self.pos -= 1;
    }

    /// Decode a variable-length quantity (at most four bytes)
    fn vlq(&mut self) -> Option<u32> {
        let mut value: u32 = 0;
        for _ in 0..4 {
            let byte = self.u8()?;
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Some(value);
            }
        }
        // continuation bit still set after four bytes: malformed
        None
    }
}

/// A retained percussion Note-On before quantization
#[derive(Debug, Clone, Copy)]
struct RawHit {
    tick: u64,
    note: u8,
    velocity: u8,
}

/// Parse an SMF byte buffer into quantized percussion notes.
///
/// A missing `MThd` signature is the one hard failure. Truncated
/// chunks and unknown status bytes end the affected track quietly,
/// completing with a partial result.
pub(crate) fn parse(
    catalog: &LaneCatalog,
    bytes: &[u8],
    steps_per_beat: u32,
) -> Result<ParsedTab, ParseError> {
    if !has_header(bytes) {
        return Err(ParseError::MalformedHeader);
    }

    let mut r = Reader::new(bytes);
    r.skip(4); // MThd
    let header_len = r.u32().ok_or(ParseError::MalformedHeader)? as usize;
    let header = r.bytes(header_len).ok_or(ParseError::MalformedHeader)?;
    if header.len() < 6 {
        return Err(ParseError::MalformedHeader);
    }
    // format (2) and track count (2) are not needed for extraction
    let division = u16::from_be_bytes([header[4], header[5]]);
    let tpq = if division & 0x8000 != 0 {
        debug!(division, "SMPTE division, using fixed {SMPTE_FALLBACK_TPQ} TPQ");
        SMPTE_FALLBACK_TPQ
    } else {
        u32::from(division).max(1)
    };

    let mut hits = Vec::new();
    while r.remaining() >= 8 {
        let Some(id) = r.bytes(4) else { break };
        let is_track = id == TRACK_MAGIC;
        let Some(chunk_len) = r.u32() else { break };
        // A final chunk shorter than declared is read to the buffer end
        let take = (chunk_len as usize).min(r.remaining());
        if take < chunk_len as usize {
            debug!(chunk_len, "truncated chunk, reading to end of buffer");
        }
        let Some(body) = r.bytes(take) else { break };
        if is_track {
            read_track(body, &mut hits);
        } else {
            debug!(?id, "skipping non-track chunk");
        }
    }

    Ok(quantize(catalog, &hits, tpq, steps_per_beat))
}

/// Walk one track chunk, accumulating percussion Note-Ons.
fn read_track(body: &[u8], hits: &mut Vec<RawHit>) {
    let mut r = Reader::new(body);
    let mut tick: u64 = 0;
    let mut running: Option<u8> = None;

    loop {
        let Some(delta) = r.vlq() else { break };
        tick += u64::from(delta);

        let Some(first) = r.u8() else { break };
        let status = if first & 0x80 != 0 {
            first
        } else {
            // data byte: reuse the running status
            r.back();
            match running {
                Some(status) => status,
                None => {
                    debug!("data byte with no running status, abandoning track");
                    break;
                }
            }
        };

        match status {
            0xFF => {
                // meta event: type byte, then length-prefixed payload
                running = None;
                let Some(kind) = r.u8() else { break };
                let Some(len) = r.vlq() else { break };
                if kind == 0x2F {
                    break; // end of track
                }
                // tempo (0x51) and everything else skipped, not applied
                if !r.skip(len as usize) {
                    break;
                }
            }
            0xF0 | 0xF7 => {
                // sysex: length-prefixed payload
                running = None;
                let Some(len) = r.vlq() else { break };
                if !r.skip(len as usize) {
                    break;
                }
            }
            status if status >= 0xF0 => {
                debug!(status, "unexpected system status in track, abandoning track");
                break;
            }
            status => {
                running = Some(status);
                let kind = status & 0xF0;
                let channel = status & 0x0F;
                match kind {
                    0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => {
                        let Some(d1) = r.u8() else { break };
                        let Some(d2) = r.u8() else { break };
                        // Note-On with velocity 0 is a Note-Off; ignored
                        if kind == 0x90 && channel == PERCUSSION_CHANNEL && d2 > 0 {
                            hits.push(RawHit {
                                tick,
                                note: d1,
                                velocity: d2,
                            });
                        }
                    }
                    0xC0 | 0xD0 => {
                        if r.u8().is_none() {
                            break;
                        }
                    }
                    _ => {
                        debug!(status, "unhandled status byte, abandoning track");
                        break;
                    }
                }
            }
        }
    }
}

/// Quantize raw tick positions onto the step grid.
///
/// The earliest retained event lands at step 0; each event's tick
/// offset becomes `round((delta / tpq) * steps_per_beat)`. Rounding
/// collisions on one (lane, step) pair collapse to the first
/// occurrence. Velocity rescales from 0-127 into 0.2-1.2.
fn quantize(catalog: &LaneCatalog, hits: &[RawHit], tpq: u32, steps_per_beat: u32) -> ParsedTab {
    let spb = steps_per_beat.clamp(1, 12);

    let Some(first_tick) = hits.iter().map(|h| h.tick).min() else {
        return ParsedTab {
            notes: Vec::new(),
            step_count: 0,
            detected_format: Some(TabFormat::Midi),
        };
    };

    let mut seen: HashSet<(crate::lanes::LaneKey, u32)> = HashSet::new();
    let mut notes = Vec::new();
    let mut max_step = 0u32;

    for hit in hits {
        let Some(lane) = catalog.lane_for_number(hit.note) else {
            debug!(note = hit.note, "unmapped percussion number dropped");
            continue;
        };
        let delta = (hit.tick - first_tick) as f64;
        let step = ((delta / f64::from(tpq)) * f64::from(spb)).round() as u32;
        if !seen.insert((lane, step)) {
            continue; // rounding collision, first occurrence wins
        }
        let velocity = VELOCITY_FLOOR + f64::from(hit.velocity) / 127.0;
        notes.push(ParsedNote {
            lane,
            step,
            velocity,
            ghost: false,
        });
        max_step = max_step.max(step);
    }

    let step_count = if notes.is_empty() { 0 } else { max_step + 1 };
    ParsedTab {
        notes,
        step_count,
        detected_format: Some(TabFormat::Midi),
    }
}
