// Melody generator CLI entry point.
//
// Pipeline: resolve key + scale → build settings (JSON file, then flags) →
// generate → print → write MIDI → optionally draw the piano roll and play.
//
// Usage:
//   cargo run -p melody_gen -- [output.mid] [--key KEY] [--scale SCALE]
//     [--length N] [--tempo BPM] [--octave-range R] [--seed N]
//     [--settings FILE] [--piano-roll [PNG]] [--show] [--play] [--player CMD]
//
// Scales: major, minor, pentatonic_major, pentatonic_minor, blues, dorian,
// mixolydian. Set RUST_LOG=debug for library diagnostics.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use melody_gen::midi::{ExportOptions, export_to_midi};
use melody_gen::piano_roll::plot_piano_roll;
use melody_gen::player::{PlayerCommand, play_midi};
use melody_gen::text::pretty_print_melody;
use melody_gen::{GeneratorSettings, MelodyGenerator, Scale, ScaleType};
use melody_prng::MelodyRng;

#[derive(Parser, Debug)]
#[command(name = "generate", about = "Generate a random melody in a scale and export it to MIDI")]
struct Args {
    /// MIDI file to write; ".mid" is appended if missing.
    #[arg(default_value = "output.mid")]
    output: PathBuf,

    /// Key name, e.g. C, F#, Bb.
    #[arg(short, long, default_value = "C")]
    key: String,

    /// Scale type.
    #[arg(short, long, default_value = "major")]
    scale: String,

    /// Number of notes (overrides the settings file).
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=64))]
    length: Option<u16>,

    /// Tempo in BPM, used for the MIDI tempo event.
    #[arg(
        short,
        long,
        default_value_t = 120,
        value_parser = clap::value_parser!(u32).range(40..=300)
    )]
    tempo: u32,

    /// Octave spread around the root (overrides the settings file).
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
    octave_range: Option<u8>,

    /// Seed for reproducible output; derived from the clock when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with generator settings.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write a piano-roll PNG, next to the MIDI file unless a path is given.
    #[arg(long, num_args = 0..=1)]
    piano_roll: Option<Option<PathBuf>>,

    /// Open the piano roll in the system image viewer.
    #[arg(long)]
    show: bool,

    /// Play the MIDI file when done, waiting for the player to exit.
    #[arg(long)]
    play: bool,

    /// MIDI player command; the file path is appended.
    #[arg(long, default_value = "timidity")]
    player: String,

    /// Note-on velocity.
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u8).range(0..=127))]
    velocity: u8,

    /// MIDI resolution in ticks per beat.
    #[arg(long, default_value_t = 480, value_parser = clap::value_parser!(u16).range(1..=32767))]
    ticks_per_beat: u16,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let scale_type: ScaleType = args.scale.parse().context("resolving scale type")?;
    let scale = Scale::from_key(&args.key, scale_type).context("resolving key")?;
    let settings = build_settings(&args)?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    let output = with_mid_extension(&args.output);

    println!("{}", "=".repeat(50));
    println!("Key: {} {}", args.key, scale_type);
    println!("Tempo: {} BPM", args.tempo);
    println!("Notes: {}", settings.length);
    println!("Octave range: +/-{}", settings.octave_range);
    println!("Seed: {seed}");
    println!("{}", "=".repeat(50));
    println!();

    let mut generator = MelodyGenerator::new(scale, settings, MelodyRng::new(seed))
        .context("checking generator settings")?;
    let melody = generator.generate();
    println!("{}", pretty_print_melody(&melody, &args.key));
    println!();

    let options = ExportOptions {
        tempo_bpm: args.tempo,
        velocity: args.velocity,
        ticks_per_beat: args.ticks_per_beat,
    };
    let midi_path = export_to_midi(&melody, &output, &options)
        .with_context(|| format!("writing MIDI to {}", output.display()))?;
    println!("MIDI file saved: {}", midi_path.display());

    if args.piano_roll.is_some() || args.show {
        let image_path = match &args.piano_roll {
            Some(Some(path)) => Some(path.clone()),
            Some(None) => Some(midi_path.with_extension("png")),
            None => None,
        };
        let written = plot_piano_roll(
            &melody,
            &args.key,
            scale_type.name(),
            image_path.as_deref(),
            args.show,
        )
        .context("drawing piano roll")?;
        if let Some(path) = written {
            println!("Piano roll saved: {}", path.display());
        }
    }

    if args.play {
        let player: PlayerCommand = args.player.parse()?;
        println!();
        println!("Playing melody with {}...", player.program);
        play_midi(&midi_path, true, &player).context("playing melody")?;
        println!("Playback finished.");
    }

    Ok(())
}

/// Settings file first (or defaults), then command line overrides.
fn build_settings(args: &Args) -> Result<GeneratorSettings> {
    let mut settings = match &args.settings {
        Some(path) => GeneratorSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GeneratorSettings::default(),
    };
    if let Some(length) = args.length {
        settings.length = usize::from(length);
    }
    if let Some(octave_range) = args.octave_range {
        settings.octave_range = octave_range;
    }
    Ok(settings)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn with_mid_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "mid") {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".mid");
    PathBuf::from(name)
}
