// Generator settings and their JSON file form.
//
// Settings may come from a JSON file (any field may be omitted and falls back
// to the default) and are then overridden by command line flags. Validation
// happens once, after loading, so the generator itself never fails.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MelodyError, Result};

/// Durations offered by every front end: sixteenth, eighth and quarter notes.
pub const DEFAULT_DURATIONS: [f64; 3] = [0.25, 0.5, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Number of notes to generate.
    pub length: usize,
    /// Durations (in beats) a note may take; drawn uniformly.
    pub allowed_durations: Vec<f64>,
    /// Maximum octave transposition, applied symmetrically around the root.
    pub octave_range: u8,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            length: 8,
            allowed_durations: DEFAULT_DURATIONS.to_vec(),
            octave_range: 0,
        }
    }
}

impl GeneratorSettings {
    pub fn new(length: usize, allowed_durations: Vec<f64>, octave_range: u8) -> Self {
        GeneratorSettings {
            length,
            allowed_durations,
            octave_range,
        }
    }

    /// Load settings from a JSON file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let settings: GeneratorSettings = serde_json::from_str(&data)?;
        settings.validate()?;
        log::debug!("loaded generator settings from {}", path.display());
        Ok(settings)
    }

    /// Check the duration set: non-empty, every value finite and positive.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_durations.is_empty() {
            return Err(MelodyError::InvalidSettings(
                "allowed_durations must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .allowed_durations
            .iter()
            .find(|d| !d.is_finite() || **d <= 0.0)
        {
            return Err(MelodyError::InvalidSettings(format!(
                "duration {bad} is not a positive number of beats"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_front_ends() {
        let s = GeneratorSettings::default();
        assert_eq!(s.length, 8);
        assert_eq!(s.allowed_durations, vec![0.25, 0.5, 1.0]);
        assert_eq!(s.octave_range, 0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: GeneratorSettings = serde_json::from_str(r#"{"length": 16}"#).unwrap();
        assert_eq!(s.length, 16);
        assert_eq!(s.allowed_durations, DEFAULT_DURATIONS.to_vec());
    }

    #[test]
    fn rejects_bad_durations() {
        let empty = GeneratorSettings::new(4, vec![], 0);
        assert!(matches!(
            empty.validate(),
            Err(MelodyError::InvalidSettings(_))
        ));
        let negative = GeneratorSettings::new(4, vec![0.5, -1.0], 0);
        assert!(negative.validate().is_err());
        let zero = GeneratorSettings::new(4, vec![0.0], 0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn load_reads_and_validates_file() {
        let dir = crate::test_util::scratch_dir("settings_load");
        let good = dir.join("good.json");
        let json = r#"{"length": 3, "allowed_durations": [2.0], "octave_range": 1}"#;
        std::fs::write(&good, json).unwrap();
        let s = GeneratorSettings::load(&good).unwrap();
        assert_eq!(s, GeneratorSettings::new(3, vec![2.0], 1));

        let bad = dir.join("bad.json");
        std::fs::write(&bad, r#"{"allowed_durations": []}"#).unwrap();
        assert!(GeneratorSettings::load(&bad).is_err());

        let garbled = dir.join("garbled.json");
        std::fs::write(&garbled, "not json").unwrap();
        assert!(matches!(
            GeneratorSettings::load(&garbled),
            Err(MelodyError::Json(_))
        ));
    }
}
