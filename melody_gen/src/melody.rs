// Notes and melodies.
//
// A melody is a monophonic sequence: each note starts when the previous one
// ends, so the only timing information a note carries is its own duration in
// beats (quarter note = 1.0). Onset times are derived on demand.

use serde::{Deserialize, Serialize};

/// A single pitched note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI note number (0-127, 60 = C4).
    pub pitch: u8,
    /// Length in beats.
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: u8, duration: f64) -> Self {
        Note { pitch, duration }
    }
}

/// An ordered sequence of notes; order is performance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    pub notes: Vec<Note>,
}

impl Melody {
    pub fn new(notes: Vec<Note>) -> Self {
        Melody { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sum of all note durations, in beats.
    pub fn total_duration(&self) -> f64 {
        self.notes.iter().fold(0.0, |acc, n| acc + n.duration)
    }

    /// Each note paired with its onset time in beats.
    pub fn timed_notes(&self) -> impl Iterator<Item = (f64, &Note)> + '_ {
        self.notes.iter().scan(0.0, |time, note| {
            let start = *time;
            *time += note.duration;
            Some((start, note))
        })
    }

    /// Lowest and highest pitch, or `None` for an empty melody.
    pub fn pitch_bounds(&self) -> Option<(u8, u8)> {
        let min = self.notes.iter().map(|n| n.pitch).min()?;
        let max = self.notes.iter().map(|n| n.pitch).max()?;
        Some((min, max))
    }

    /// Distinct pitches in ascending order.
    pub fn distinct_pitches(&self) -> Vec<u8> {
        let mut pitches: Vec<u8> = self.notes.iter().map(|n| n.pitch).collect();
        pitches.sort_unstable();
        pitches.dedup();
        pitches
    }
}
