// MIDI output from melodies.
//
// Writes a Standard MIDI File, format 0 (one track): tempo meta-event,
// program change to program 0, then each note as a note-on at delta 0 followed
// by its note-off `duration * ticks_per_beat` ticks later (truncated), and
// finally end-of-track. Notes never overlap.
//
// Uses the `midly` crate for encoding.

use std::path::{Path, PathBuf};

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::error::Result;
use crate::melody::Melody;

/// Default resolution, in ticks per quarter note.
pub const DEFAULT_TICKS_PER_BEAT: u16 = 480;

/// Default note-on velocity.
pub const DEFAULT_VELOCITY: u8 = 64;

const CHANNEL: u8 = 0;
const PROGRAM: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub tempo_bpm: u32,
    pub velocity: u8,
    pub ticks_per_beat: u16,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            tempo_bpm: 120,
            velocity: DEFAULT_VELOCITY,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
        }
    }
}

impl ExportOptions {
    pub fn with_tempo(tempo_bpm: u32) -> Self {
        ExportOptions {
            tempo_bpm,
            ..Default::default()
        }
    }

    /// Tempo meta-event value. Clamped to what a 24-bit field can hold.
    pub fn microseconds_per_beat(&self) -> u32 {
        (60_000_000 / self.tempo_bpm.max(1)).min(0xFF_FFFF)
    }

    /// Note length in ticks, truncated toward zero (0.5 beats at 480 → 240).
    pub fn duration_ticks(&self, duration: f64) -> u32 {
        let ticks = (duration * f64::from(self.ticks_per_beat)) as u32;
        ticks.min(0x0FFF_FFFF)
    }
}

/// Convert a melody to MIDI and write it to `path`. Returns the path written.
pub fn export_to_midi(melody: &Melody, path: &Path, options: &ExportOptions) -> Result<PathBuf> {
    let buf = melody_to_smf_bytes(melody, options)?;
    std::fs::write(path, &buf)?;
    log::info!(
        "wrote {} notes ({} bytes) to {}",
        melody.len(),
        buf.len(),
        path.display()
    );
    Ok(path.to_path_buf())
}

/// Encode a melody as SMF bytes without touching the filesystem.
pub fn melody_to_smf_bytes(melody: &Melody, options: &ExportOptions) -> Result<Vec<u8>> {
    let smf = melody_to_smf(melody, options);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Build the in-memory SMF for a melody.
pub fn melody_to_smf(melody: &Melody, options: &ExportOptions) -> Smf<'static> {
    let ticks_per_beat = options.ticks_per_beat.clamp(1, 0x7FFF);
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(ticks_per_beat)),
    ));

    let channel = u4::new(CHANNEL);
    let velocity = u7::new(options.velocity.min(127));
    let mut track: Track<'static> = Vec::with_capacity(melody.len() * 2 + 3);

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
            options.microseconds_per_beat(),
        ))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(PROGRAM),
            },
        },
    });

    for note in &melody.notes {
        let key = u7::new(note.pitch.min(127));
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel: velocity },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(options.duration_ticks(note.duration)),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    smf.tracks.push(track);
    log::debug!(
        "built SMF: {} events, {} µs/beat, {} ticks/beat",
        smf.tracks[0].len(),
        options.microseconds_per_beat(),
        ticks_per_beat
    );
    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody::Note;

    fn three_quarters() -> Melody {
        Melody::new(vec![
            Note::new(60, 1.0),
            Note::new(62, 1.0),
            Note::new(64, 1.0),
        ])
    }

    #[test]
    fn tempo_conversion() {
        assert_eq!(ExportOptions::with_tempo(120).microseconds_per_beat(), 500_000);
        assert_eq!(ExportOptions::with_tempo(60).microseconds_per_beat(), 1_000_000);
        assert_eq!(ExportOptions::with_tempo(90).microseconds_per_beat(), 666_666);
    }

    #[test]
    fn duration_ticks_truncate() {
        let opts = ExportOptions::default();
        assert_eq!(opts.duration_ticks(0.5), 240);
        assert_eq!(opts.duration_ticks(0.25), 120);
        assert_eq!(opts.duration_ticks(1.0), 480);
        // 0.3 * 96 = 28.8, truncated.
        let coarse = ExportOptions {
            ticks_per_beat: 96,
            ..Default::default()
        };
        assert_eq!(coarse.duration_ticks(0.3), 28);
    }

    #[test]
    fn single_track_event_layout() {
        let smf = melody_to_smf(&three_quarters(), &ExportOptions::with_tempo(120));
        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(480)));
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        // tempo + program + 3 * (on, off) + end
        assert_eq!(track.len(), 9);
        assert_eq!(
            track[0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000)))
        );
        assert!(matches!(
            track[1].kind,
            TrackEventKind::Midi {
                message: MidiMessage::ProgramChange { .. },
                ..
            }
        ));
        for (i, pitch) in [60u8, 62, 64].into_iter().enumerate() {
            let on = &track[2 + i * 2];
            let off = &track[3 + i * 2];
            assert_eq!(on.delta.as_int(), 0);
            assert_eq!(
                on.kind,
                TrackEventKind::Midi {
                    channel: u4::new(0),
                    message: MidiMessage::NoteOn {
                        key: u7::new(pitch),
                        vel: u7::new(64),
                    },
                }
            );
            assert_eq!(off.delta.as_int(), 480);
            assert_eq!(
                off.kind,
                TrackEventKind::Midi {
                    channel: u4::new(0),
                    message: MidiMessage::NoteOff {
                        key: u7::new(pitch),
                        vel: u7::new(0),
                    },
                }
            );
        }
        assert_eq!(track[8].kind, TrackEventKind::Meta(MetaMessage::EndOfTrack));
    }

    #[test]
    fn custom_velocity_and_resolution() {
        let opts = ExportOptions {
            tempo_bpm: 100,
            velocity: 100,
            ticks_per_beat: 96,
        };
        let melody = Melody::new(vec![Note::new(67, 0.5)]);
        let smf = melody_to_smf(&melody, &opts);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::new(96)));
        let track = &smf.tracks[0];
        assert_eq!(
            track[2].kind,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(67),
                    vel: u7::new(100),
                },
            }
        );
        assert_eq!(track[3].delta.as_int(), 48);
    }

    #[test]
    fn empty_melody_still_has_header_events() {
        let smf = melody_to_smf(&Melody::default(), &ExportOptions::default());
        assert_eq!(smf.tracks[0].len(), 3);
    }

    #[test]
    fn bytes_parse_back() {
        let bytes = melody_to_smf_bytes(&three_quarters(), &ExportOptions::default()).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
        let parsed = Smf::parse(&bytes).unwrap();
        assert_eq!(parsed.tracks.len(), 1);
        let total_ticks: u32 = parsed.tracks[0].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total_ticks, 3 * 480);
    }
}
