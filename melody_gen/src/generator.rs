// Random melody generation.
//
// Every note is an independent uniform draw: a scale offset, an octave shift
// in [-octave_range, +octave_range], and a duration from the allowed set.
// There is no contour, harmony or rhythm model on top.
//
// The PRNG is passed in at construction, so a seeded generator reproduces the
// same melody and tests can pin exact output.

use melody_prng::MelodyRng;

use crate::error::Result;
use crate::melody::{Melody, Note};
use crate::scale::Scale;
use crate::settings::GeneratorSettings;

pub struct MelodyGenerator {
    scale: Scale,
    settings: GeneratorSettings,
    rng: MelodyRng,
}

impl MelodyGenerator {
    /// Fails with `InvalidSettings` if the duration set is empty or holds a
    /// non-positive value. `Scale` can only be built non-empty.
    pub fn new(scale: Scale, settings: GeneratorSettings, rng: MelodyRng) -> Result<Self> {
        settings.validate()?;
        Ok(MelodyGenerator {
            scale,
            settings,
            rng,
        })
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Draw a fresh melody of exactly `settings.length` notes.
    pub fn generate(&mut self) -> Melody {
        let mut notes = Vec::with_capacity(self.settings.length);
        for _ in 0..self.settings.length {
            let pitch = self.random_pitch();
            let duration = self.random_duration();
            notes.push(Note::new(pitch, duration));
        }
        log::debug!(
            "generated {} notes (root {}, {} intervals, octave range {})",
            notes.len(),
            self.scale.root(),
            self.scale.intervals().len(),
            self.settings.octave_range
        );
        Melody::new(notes)
    }

    // Both slices are non-empty: `Scale` guarantees it, `new` validated the
    // settings.
    fn random_pitch(&mut self) -> u8 {
        let intervals = self.scale.intervals();
        let offset = intervals[self.rng.index(intervals.len())];
        let range = i64::from(self.settings.octave_range);
        let shift = self.rng.range_i64_inclusive(-range, range);
        let pitch = i64::from(self.scale.root()) + i64::from(offset) + 12 * shift;
        fold_into_midi_range(pitch)
    }

    fn random_duration(&mut self) -> f64 {
        let durations = &self.settings.allowed_durations;
        durations[self.rng.index(durations.len())]
    }
}

/// Move an out-of-range pitch by whole octaves until it fits 0..=127,
/// keeping its pitch class.
fn fold_into_midi_range(pitch: i64) -> u8 {
    if (0..=127).contains(&pitch) {
        return pitch as u8;
    }
    let mut folded = pitch;
    while folded < 0 {
        folded += 12;
    }
    while folded > 127 {
        folded -= 12;
    }
    log::warn!("pitch {pitch} outside MIDI range, folded to {folded}");
    folded as u8
}
