// Random melody generator.
//
// Draws short monophonic melodies from a musical scale, prints them as text,
// draws them as a piano roll, writes them to Standard MIDI Files, and hands
// those files to an external player.
//
// Architecture:
// - scale.rs: key-name and scale-formula tables, Scale construction
// - melody.rs: Note and Melody (ordered, monophonic)
// - settings.rs: GeneratorSettings, defaults, JSON loading + validation
// - generator.rs: uniform per-note sampling over pitch and duration
// - midi.rs: format 0 MIDI export via midly
// - text.rs: pitch naming (sharps/flats by key) and the text view
// - piano_roll.rs: PNG piano-roll rendering
// - glyphs.rs: bitmap font used for chart labels
// - player.rs: playback through an external MIDI player
// - error.rs: MelodyError
//
// Generation is deterministic given a seed.

pub mod error;
pub mod generator;
pub mod glyphs;
pub mod melody;
pub mod midi;
pub mod piano_roll;
pub mod player;
pub mod scale;
pub mod settings;
pub mod text;

pub use error::{MelodyError, Result};
pub use generator::MelodyGenerator;
pub use melody::{Melody, Note};
pub use scale::{Scale, ScaleType};
pub use settings::GeneratorSettings;

#[cfg(test)]
mod test_util;
