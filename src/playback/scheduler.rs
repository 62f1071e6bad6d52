// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lookahead playback scheduler.
//!
//! Drives a chart through the transport clock. Each frame emits one
//! metronome tick when a beat boundary was crossed, then every chart
//! note whose time falls inside the lookahead window, so a downstream
//! sound engine can render audio exactly on time despite dispatch
//! jitter. Tempo and mute state are read fresh each frame.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

use crate::chart::Chart;
use crate::lanes::LaneKey;
use crate::timing::TempoConfig;

use super::transport::{PlaybackState, Transport};

/// How far ahead of the current position triggers are dispatched
pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_millis(200);

/// Playback precondition failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// Starting with zero notes loaded is a reported user error
    #[error("cannot start playback: no notes loaded")]
    EmptyChart,
}

/// One per-frame output of the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Metronome tick on a beat boundary, accented on bar starts
    Metronome {
        /// Beat index since position zero
        beat: u64,
        /// Whether this beat opens a bar
        accent: bool,
    },
    /// Fire one percussion voice `due_in` from now
    Trigger {
        /// Percussion voice to sound
        lane: LaneKey,
        /// Normalized intensity
        velocity: f64,
        /// Delay until the note is due; zero when already due
        due_in: Duration,
    },
}

/// Chart player: owns the transport, the scheduling cursor and the
/// per-lane mute set.
#[derive(Debug)]
pub struct Player {
    chart: Chart,
    transport: Transport,
    /// Index of the next unfired note in the chart's sorted notes
    cursor: usize,
    last_beat: Option<u64>,
    muted: HashSet<LaneKey>,
    metronome: bool,
    lookahead: Duration,
}

impl Player {
    /// Create a player with no chart loaded
    pub fn new() -> Self {
        Self {
            chart: Chart::default(),
            transport: Transport::new(),
            cursor: 0,
            last_beat: None,
            muted: HashSet::new(),
            metronome: true,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    /// Create a player around an existing chart
    pub fn with_chart(chart: Chart) -> Self {
        let mut player = Self::new();
        player.set_chart(chart);
        player
    }

    /// Replace the chart. Any active session is stopped first so no
    /// pending fire can index into a stale chart.
    pub fn set_chart(&mut self, chart: Chart) {
        if self.transport.state() != PlaybackState::Idle {
            debug!("chart replaced mid-session, cancelling playback");
            self.stop();
        }
        self.chart = chart;
        self.cursor = 0;
        self.last_beat = None;
    }

    /// The loaded chart
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Begin playback at position zero.
    ///
    /// The cursor is resynchronized to the chart start, so notes
    /// consumed by an earlier session are scheduled again.
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        if self.chart.is_empty() {
            return Err(PlaybackError::EmptyChart);
        }
        self.transport.start();
        self.last_beat = None;
        self.resync(0.0);
        Ok(())
    }

    /// Freeze playback. The cursor is left untouched; resume picks up
    /// without re-scanning.
    pub fn pause(&mut self) {
        self.transport.pause();
    }

    /// Continue from the frozen position
    pub fn resume(&mut self) {
        self.transport.resume();
    }

    /// Discard the session and all pending lookahead fires
    pub fn stop(&mut self) {
        self.transport.stop();
        self.cursor = 0;
        self.last_beat = None;
    }

    /// Current session state
    pub fn state(&self) -> PlaybackState {
        self.transport.state()
    }

    /// Current performance time in seconds
    pub fn position(&self) -> f64 {
        self.transport.position()
    }

    /// Enable or disable metronome ticks
    pub fn set_metronome(&mut self, enabled: bool) {
        self.metronome = enabled;
    }

    /// Whether metronome ticks are enabled
    pub fn metronome(&self) -> bool {
        self.metronome
    }

    /// Mute or unmute one lane. Takes effect within a frame; muted
    /// notes are still consumed in order but produce no trigger.
    pub fn set_muted(&mut self, lane: LaneKey, muted: bool) {
        if muted {
            self.muted.insert(lane);
        } else {
            self.muted.remove(&lane);
        }
    }

    /// Whether a lane is muted
    pub fn is_muted(&self, lane: LaneKey) -> bool {
        self.muted.contains(&lane)
    }

    /// Override the lookahead window
    pub fn set_lookahead(&mut self, lookahead: Duration) {
        self.lookahead = lookahead;
    }

    /// Whether the session has played past the end of the chart
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.chart.notes().len() && self.position() >= self.chart.duration()
    }

    /// Reposition the cursor to the first note at or after `t`
    fn resync(&mut self, t: f64) {
        self.cursor = self.chart.notes().partition_point(|n| n.time < t);
    }

    /// Advance one scheduling frame.
    ///
    /// Within a frame the metronome is evaluated before note
    /// scheduling, and triggers come out in non-decreasing time order.
    /// Returns nothing unless the session is playing.
    pub fn poll(&mut self, tempo: &TempoConfig) -> Vec<PlaybackEvent> {
        if !self.transport.is_playing() {
            return Vec::new();
        }

        let t = self.transport.position();
        let mut events = Vec::new();

        if self.metronome && t >= 0.0 {
            let beat = (t / tempo.beat_duration()).floor() as u64;
            if self.last_beat != Some(beat) {
                self.last_beat = Some(beat);
                let accent = beat % u64::from(tempo.beats_per_bar()) == 0;
                events.push(PlaybackEvent::Metronome { beat, accent });
            }
        }

        let horizon = t + self.lookahead.as_secs_f64();
        let notes = self.chart.notes();
        while self.cursor < notes.len() && notes[self.cursor].time <= horizon {
            let note = notes[self.cursor];
            self.cursor += 1;
            // Muted lanes are consumed to keep scheduling order intact
            if self.muted.contains(&note.lane) {
                continue;
            }
            let due_in = Duration::from_secs_f64((note.time - t).max(0.0));
            trace!(lane = %note.lane, time = note.time, "trigger scheduled");
            events.push(PlaybackEvent::Trigger {
                lane: note.lane,
                velocity: note.velocity,
                due_in,
            });
        }

        events
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build;
    use crate::lanes::LaneCatalog;
    use crate::parser::{parse, ParseOptions, TabInput};
    use std::thread;

    fn make_player(text: &str, tempo: &TempoConfig) -> Player {
        let catalog = LaneCatalog::new();
        let parsed = parse(&catalog, TabInput::Text(text), &ParseOptions::default()).unwrap();
        Player::with_chart(build(&catalog, &parsed, tempo))
    }

    /// Poll with a window wide enough to cover the whole chart
    fn drain(player: &mut Player, tempo: &TempoConfig) -> Vec<PlaybackEvent> {
        player.set_lookahead(Duration::from_secs(3600));
        player.poll(tempo)
    }

    fn triggers(events: &[PlaybackEvent]) -> Vec<(LaneKey, Duration)> {
        events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::Trigger { lane, due_in, .. } => Some((*lane, *due_in)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_chart_start_fails() {
        let tempo = TempoConfig::default();
        let mut player = make_player("", &tempo);
        assert_eq!(player.start(), Err(PlaybackError::EmptyChart));
        // Precondition failure causes no state transition
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_poll_outside_playing_is_empty() {
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---|", &tempo);
        assert!(player.poll(&tempo).is_empty());

        player.start().unwrap();
        player.pause();
        assert!(player.poll(&tempo).is_empty());
    }

    #[test]
    fn test_triggers_fire_in_time_order() {
        let tempo = TempoConfig::default();
        let mut player = make_player("HH|x-x-x-x-|\nSN|--x---x-|\nBD|o---o---|", &tempo);
        player.start().unwrap();
        let events = drain(&mut player, &tempo);
        let fired = triggers(&events);
        assert_eq!(fired.len(), player.chart().notes().len());
        for pair in fired.windows(2) {
            assert!(pair[1].1 >= pair[0].1, "fire order regressed: {pair:?}");
        }
    }

    #[test]
    fn test_lookahead_window_limits_triggers() {
        // 0.125s steps; only step 0 falls inside the default window
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---o---|", &tempo);
        player.start().unwrap();
        let events = player.poll(&tempo);
        assert_eq!(triggers(&events).len(), 1);
    }

    #[test]
    fn test_metronome_before_triggers() {
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---|", &tempo);
        player.start().unwrap();
        let events = drain(&mut player, &tempo);
        assert!(matches!(
            events[0],
            PlaybackEvent::Metronome { beat: 0, accent: true }
        ));
        assert!(matches!(events[1], PlaybackEvent::Trigger { .. }));
    }

    #[test]
    fn test_metronome_single_tick_per_beat() {
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---|", &tempo);
        player.start().unwrap();
        player.poll(&tempo);
        // Same beat on the next frame: no second tick
        let again = player.poll(&tempo);
        assert!(!again
            .iter()
            .any(|e| matches!(e, PlaybackEvent::Metronome { .. })));
    }

    #[test]
    fn test_metronome_accent_cadence() {
        // 300 BPM, 3/4: beats every 200ms, accent every third beat
        let tempo = TempoConfig {
            bpm: 300.0,
            beats_per_bar: 3,
            ..Default::default()
        };
        let mut player = make_player("BD|o-----------|", &tempo);
        player.start().unwrap();

        let mut ticks = Vec::new();
        let deadline = std::time::Instant::now() + Duration::from_millis(900);
        while std::time::Instant::now() < deadline {
            for event in player.poll(&tempo) {
                if let PlaybackEvent::Metronome { beat, accent } = event {
                    ticks.push((beat, accent));
                }
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert!(ticks.len() >= 4, "expected several beats, got {ticks:?}");
        for (beat, accent) in ticks {
            assert_eq!(accent, beat % 3 == 0, "beat {beat}");
        }
    }

    #[test]
    fn test_metronome_disabled() {
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---|", &tempo);
        player.set_metronome(false);
        player.start().unwrap();
        let events = drain(&mut player, &tempo);
        assert!(!events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::Metronome { .. })));
    }

    #[test]
    fn test_muted_lane_consumed_but_silent() {
        let tempo = TempoConfig::default();
        let mut player = make_player("HH|x-x-|\nBD|o-o-|", &tempo);
        player.set_muted(LaneKey::BassDrum, true);
        player.start().unwrap();
        let events = drain(&mut player, &tempo);
        let fired = triggers(&events);
        assert_eq!(fired.len(), 2);
        assert!(fired.iter().all(|(lane, _)| *lane == LaneKey::HiHatClosed));
        // The cursor consumed the muted notes too: nothing left to fire
        assert!(triggers(&player.poll(&tempo)).is_empty());

        player.set_muted(LaneKey::BassDrum, false);
        assert!(!player.is_muted(LaneKey::BassDrum));
    }

    #[test]
    fn test_restart_refires_from_zero() {
        let tempo = TempoConfig::default();
        let mut player = make_player("HH|x-x-|", &tempo);

        player.start().unwrap();
        let first = triggers(&drain(&mut player, &tempo));
        assert_eq!(first.len(), 2);
        player.stop();

        // A fresh session resynchronizes the cursor to the chart start
        player.start().unwrap();
        let second = triggers(&drain(&mut player, &tempo));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_stop_cancels_pending_fires() {
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---o---|", &tempo);
        player.start().unwrap();
        player.poll(&tempo);
        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(player.poll(&tempo).is_empty());
    }

    #[test]
    fn test_set_chart_cancels_session() {
        let catalog = LaneCatalog::new();
        let tempo = TempoConfig::default();
        let mut player = make_player("BD|o---|", &tempo);
        player.start().unwrap();

        let parsed = parse(
            &catalog,
            TabInput::Text("SN|x-x-|"),
            &ParseOptions::default(),
        )
        .unwrap();
        player.set_chart(build(&catalog, &parsed, &tempo));
        // Old session is gone; the new chart starts clean
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(player.poll(&tempo).is_empty());
        player.start().unwrap();
        assert_eq!(player.chart().notes().len(), 2);
    }

    #[test]
    fn test_pause_resume_keeps_cursor() {
        let tempo = TempoConfig::default();
        let mut player = make_player("HH|x-x-|", &tempo);
        player.set_lookahead(Duration::from_secs(3600));
        player.start().unwrap();
        let before = triggers(&player.poll(&tempo)).len();
        assert_eq!(before, 2);

        player.pause();
        player.resume();
        // No re-scan: already-consumed notes do not fire again
        let after = triggers(&player.poll(&tempo)).len();
        assert_eq!(after, 0);
    }
}
