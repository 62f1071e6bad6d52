// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use drumtab::{
    build, parse, FormatHint, LaneCatalog, ParseOptions, ParsedTab, PlaybackEvent, Player,
    SessionFile, TabInput, TempoConfig,
};

/// Frame cadence of the drive loop
const FRAME: Duration = Duration::from_millis(15);

fn print_usage() {
    println!("DRUMTAB - Drum Tab Player");
    println!();
    println!("Usage: drumtab [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --parse <FILE>              Parse a tab file and print the chart");
    println!("  --play <FILE> [BPM]         Play a tab file, printing fired events");
    println!("  --session <YAML> <FILE>     Play a tab file with session settings");
    println!("  --legend                    List all lanes with percussion numbers");
    println!("  --demo                      Parse and print the built-in demo tab");
    println!("  --help                      Show this help message");
}

/// The built-in demo pattern
fn demo_tabs() -> String {
    [
        "HH|x-x-|x-x-|x-x-|x-x-|",
        "SN|----|o---|----|o---|",
        "BD|o---|----|o---|----|",
        "",
        "HH|x-x-|x-x-|x-x-|x-x-|",
        "SN|----|--o-|----|--o-|",
        "BD|o---|o---|o---|o---|",
    ]
    .join("\n")
}

/// Read a tab file. A `.mid`/`.midi` extension forces the MIDI hint;
/// everything else goes through auto detection.
fn load_source(path: &Path) -> Result<(Vec<u8>, FormatHint)> {
    let is_midi = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi")
    );
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read tab file: {path:?}"))?;
    let hint = if is_midi {
        FormatHint::Midi
    } else {
        FormatHint::Auto
    };
    Ok((bytes, hint))
}

fn parse_source(
    catalog: &LaneCatalog,
    bytes: &[u8],
    hint: FormatHint,
    tempo: &TempoConfig,
) -> Result<ParsedTab> {
    let opts = ParseOptions {
        format: hint,
        steps_per_beat: tempo.steps_per_beat(),
    };
    let parsed = parse(catalog, TabInput::Bytes(bytes), &opts)?;
    Ok(parsed)
}

fn print_chart_summary(catalog: &LaneCatalog, parsed: &ParsedTab, tempo: &TempoConfig) {
    let chart = build(catalog, parsed, tempo);
    let format = chart
        .detected_format()
        .map(|f| f.as_str())
        .unwrap_or("none");
    println!("Format:   {format}");
    println!("Steps:    {}", chart.step_count());
    println!("Notes:    {}", chart.notes().len());
    println!(
        "Duration: {:.2}s at {:.0} BPM, {} steps/beat",
        chart.duration(),
        tempo.bpm(),
        tempo.steps_per_beat()
    );
    if chart.lanes().is_empty() {
        println!("Lanes:    (none)");
    } else {
        println!("Lanes:");
        for lane in chart.lanes() {
            let count = chart.notes().iter().filter(|n| n.lane == lane.key).count();
            println!("  {:8} {:16} {count} notes", lane.key, lane.label);
        }
    }
}

fn print_legend(catalog: &LaneCatalog) {
    println!("Lane legend (stacking order):");
    println!();
    for lane in catalog.lanes() {
        println!("  {:8} #{:<3} {}", lane.key, lane.number, lane.label);
    }
}

fn parse_command(path: &Path) -> Result<()> {
    let catalog = LaneCatalog::new();
    let tempo = TempoConfig::default();
    let (bytes, hint) = load_source(path)?;
    let parsed = parse_source(&catalog, &bytes, hint, &tempo)?;
    print_chart_summary(&catalog, &parsed, &tempo);
    Ok(())
}

fn play_command(path: &Path, session: &SessionFile) -> Result<()> {
    let catalog = LaneCatalog::new();
    let tempo = session.tempo;

    let (bytes, extension_hint) = load_source(path)?;
    // An explicit session override outranks the extension hint
    let hint = match session.format_hint() {
        FormatHint::Auto => extension_hint,
        forced => forced,
    };
    let parsed = parse_source(&catalog, &bytes, hint, &tempo)?;
    print_chart_summary(&catalog, &parsed, &tempo);
    println!();

    let mut player = Player::with_chart(build(&catalog, &parsed, &tempo));
    player.set_metronome(session.metronome);
    for lane in &session.muted {
        player.set_muted(*lane, true);
    }

    player.start()?;
    println!("Playing (Ctrl+C to abort)...");

    while !player.is_finished() {
        for event in player.poll(&tempo) {
            let t = player.position();
            match event {
                PlaybackEvent::Metronome { beat, accent } => {
                    let mark = if accent { " *" } else { "" };
                    println!("[{t:7.3}] beat {beat}{mark}");
                }
                PlaybackEvent::Trigger {
                    lane,
                    velocity,
                    due_in,
                } => {
                    println!(
                        "[{t:7.3}] fire {lane:8} vel {velocity:.2} due in {:3} ms",
                        due_in.as_millis()
                    );
                }
            }
        }
        thread::sleep(FRAME);
    }

    player.stop();
    println!("Done.");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("DRUMTAB - Drum Tab Player");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--parse" => {
            if args.len() < 3 {
                eprintln!("Error: --parse requires a file path");
                std::process::exit(1);
            }
            parse_command(Path::new(&args[2]))?;
        }
        "--play" => {
            if args.len() < 3 {
                eprintln!("Error: --play requires a file path");
                std::process::exit(1);
            }
            let mut session = SessionFile::default();
            if args.len() >= 4 {
                let bpm: f64 = args[3]
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid BPM: {}", args[3]))?;
                session.tempo.bpm = bpm;
            }
            play_command(Path::new(&args[2]), &session)?;
        }
        "--session" => {
            if args.len() < 4 {
                eprintln!("Error: --session requires a session file and a tab file");
                std::process::exit(1);
            }
            let session = SessionFile::load(&args[2])?;
            play_command(Path::new(&args[3]), &session)?;
        }
        "--legend" => {
            print_legend(&LaneCatalog::new());
        }
        "--demo" => {
            let catalog = LaneCatalog::new();
            let tempo = TempoConfig::default();
            let parsed = parse_source(
                &catalog,
                demo_tabs().as_bytes(),
                FormatHint::Auto,
                &tempo,
            )?;
            print_chart_summary(&catalog, &parsed, &tempo);
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
