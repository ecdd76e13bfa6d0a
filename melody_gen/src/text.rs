// Pitch naming and the text rendering of a melody.
//
// Flat-convention keys (F, Bb, Eb, Ab, Db, Gb, Cb) spell accidentals as flats;
// every other key uses sharps. Octave numbers follow the MIDI convention where
// 60 is C4.

use std::fmt::Write as _;

use crate::melody::Melody;
use crate::scale::normalize_key;

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

const FLAT_KEYS: [&str; 7] = ["F", "Bb", "Eb", "Ab", "Db", "Gb", "Cb"];

/// Blocks drawn per beat in the text view.
const BLOCKS_PER_BEAT: f64 = 4.0;

/// Name a MIDI pitch, e.g. 61 → "C#4" (or "Db4" with flats).
pub fn midi_to_name(pitch: u8, use_flats: bool) -> String {
    let octave = i32::from(pitch / 12) - 1;
    let names = if use_flats {
        &NOTE_NAMES_FLAT
    } else {
        &NOTE_NAMES_SHARP
    };
    format!("{}{}", names[usize::from(pitch % 12)], octave)
}

/// Whether accidentals in `key` are conventionally written as flats.
pub fn should_use_flats(key: &str) -> bool {
    let key = normalize_key(key);
    FLAT_KEYS.contains(&key.as_str())
}

/// Round to two decimals and print with at least one fractional digit
/// ("1.0", "0.25").
fn format_beats(value: f64) -> String {
    format!("{:?}", (value * 100.0).round() / 100.0)
}

/// Sequencer-style text view: one line of blocks per note, then the total.
pub fn pretty_print_melody(melody: &Melody, key: &str) -> String {
    let use_flats = should_use_flats(key);
    let mut out = String::new();
    out.push_str("Generated melody\n\n");

    for note in &melody.notes {
        let blocks = ((note.duration * BLOCKS_PER_BEAT).floor() as usize).max(1);
        let _ = writeln!(
            out,
            "{}: {} ({} beats)",
            midi_to_name(note.pitch, use_flats),
            "█".repeat(blocks),
            format_beats(note.duration)
        );
    }

    out.push('\n');
    let _ = write!(
        out,
        "Total duration: {} beats",
        format_beats(melody.total_duration())
    );
    out
}
