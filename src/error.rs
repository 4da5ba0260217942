//! Error types for the fallible edges of the crate
//!
//! Gameplay itself never fails: blocked moves stall, missing geometry reads
//! as wall, duplicate events are ignored. Errors only surface when building a
//! maze from text or loading tuning data.

use std::io;

/// Errors raised while parsing or validating a maze layout.
#[derive(thiserror::Error, Debug)]
pub enum MazeError {
    #[error("Unknown character in maze at row {row}, column {col}: {found:?}")]
    UnknownCharacter { row: usize, col: usize, found: char },

    #[error("Maze row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Maze layout is empty")]
    Empty,

    #[error("Maze has no {0} marker")]
    MissingMarker(&'static str),

    #[error("Cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
}

/// Errors raised while loading tuning data.
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Tuning JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
