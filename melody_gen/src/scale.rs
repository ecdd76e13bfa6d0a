// Scales: a root pitch plus the semitone offsets that make up one octave.
//
// Two fixed tables drive everything here. Key names (C, C#/Db, ... B) map to
// MIDI pitches in octave 4, with sharps and flats as enharmonic aliases. Scale
// types map to ascending interval formulas that all start at 0.
//
// Used by generator.rs to draw pitches, and by the CLI to resolve user input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MelodyError, Result};

/// Key name → MIDI pitch of the tonic in octave 4.
const KEY_TABLE: [(&str, u8); 17] = [
    ("C", 60),
    ("C#", 61),
    ("Db", 61),
    ("D", 62),
    ("D#", 63),
    ("Eb", 63),
    ("E", 64),
    ("F", 65),
    ("F#", 66),
    ("Gb", 66),
    ("G", 67),
    ("G#", 68),
    ("Ab", 68),
    ("A", 69),
    ("A#", 70),
    ("Bb", 70),
    ("B", 71),
];

/// The scale formulas a melody can be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    /// Natural minor.
    Minor,
    PentatonicMajor,
    PentatonicMinor,
    /// Minor pentatonic plus the flat fifth.
    Blues,
    Dorian,
    Mixolydian,
}

impl ScaleType {
    pub const ALL: [ScaleType; 7] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::PentatonicMajor,
        ScaleType::PentatonicMinor,
        ScaleType::Blues,
        ScaleType::Dorian,
        ScaleType::Mixolydian,
    ];

    /// Semitone offsets from the root, ascending, within one octave.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleType::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
            ScaleType::PentatonicMajor => "pentatonic_major",
            ScaleType::PentatonicMinor => "pentatonic_minor",
            ScaleType::Blues => "blues",
            ScaleType::Dorian => "dorian",
            ScaleType::Mixolydian => "mixolydian",
        }
    }

    pub fn available_names() -> Vec<String> {
        Self::ALL.iter().map(|t| t.name().to_string()).collect()
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleType {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| MelodyError::UnknownScale {
                name: s.to_string(),
                available: Self::available_names(),
            })
    }
}

/// A concrete scale: tonic pitch plus one octave of offsets.
///
/// Invariant: `intervals` is non-empty and every offset is in `0..=11`.
/// Fields are private so the only ways in are `new` and `from_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    root: u8,
    intervals: Vec<u8>,
}

impl Scale {
    /// Build a scale from an explicit root and interval set.
    pub fn new(root: u8, intervals: Vec<u8>) -> Result<Self> {
        if root > 127 {
            return Err(MelodyError::InvalidScale(format!(
                "root {root} is outside the MIDI range 0-127"
            )));
        }
        if intervals.is_empty() {
            return Err(MelodyError::InvalidScale(
                "interval set is empty".to_string(),
            ));
        }
        if let Some(bad) = intervals.iter().find(|&&iv| iv > 11) {
            return Err(MelodyError::InvalidScale(format!(
                "interval {bad} is outside one octave (0-11)"
            )));
        }
        Ok(Scale { root, intervals })
    }

    /// Resolve a key name and scale type. Key names are case-normalized
    /// ("bb" and "BB" both mean "Bb").
    pub fn from_key(key: &str, scale_type: ScaleType) -> Result<Self> {
        let root = key_to_midi(key)?;
        Ok(Scale {
            root,
            intervals: scale_type.intervals().to_vec(),
        })
    }

    /// Tonic as a MIDI pitch.
    pub fn root(&self) -> u8 {
        self.root
    }

    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// The scale's pitches in the root octave, `root + offset` per interval.
    /// Offsets that would land above 127 are left out.
    pub fn pitches(&self) -> Vec<u8> {
        self.intervals
            .iter()
            .filter_map(|&iv| self.root.checked_add(iv))
            .filter(|&p| p <= 127)
            .collect()
    }
}

/// Capitalize the first letter and lower-case the rest, so accidentals read
/// the way the key table spells them.
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Look up the MIDI pitch of a key name.
pub fn key_to_midi(key: &str) -> Result<u8> {
    let normalized = normalize_key(key);
    KEY_TABLE
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, pitch)| pitch)
        .ok_or_else(|| MelodyError::UnknownKey {
            key: key.to_string(),
            available: available_keys(),
        })
}

/// Every accepted key name, sorted.
pub fn available_keys() -> Vec<String> {
    let mut names: Vec<String> = KEY_TABLE.iter().map(|(n, _)| n.to_string()).collect();
    names.sort();
    names.dedup();
    names
}
