// Error type shared by every module of the library.
//
// Lookups against the fixed key and scale tables fail with a message that
// lists the valid names, so a front end can show it to the user verbatim and
// ask again.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MelodyError>;

#[derive(Debug, Error)]
pub enum MelodyError {
    #[error("unknown key: {key}. Available: {}", .available.join(", "))]
    UnknownKey { key: String, available: Vec<String> },

    #[error("unknown scale type: {name}. Available: {}", .available.join(", "))]
    UnknownScale { name: String, available: Vec<String> },

    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("invalid generator settings: {0}")]
    InvalidSettings(String),

    #[error("invalid player command: {0}")]
    InvalidPlayer(String),

    #[error("MIDI file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}
