//! Error types. Nothing here is fatal to a running session: callers log and degrade.

use thiserror::Error;

use crate::domain::ModeId;

/// Failures inside the game engine (catalog, navigation, mode start).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("unknown game mode '{0}'")]
    UnknownMode(String),
    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
    #[error("no mode is live")]
    NoLiveMode,
    #[error("mode {0} is waiting for a difficulty choice")]
    AwaitingDifficulty(ModeId),
    #[error("map is unavailable: {0}")]
    MapUnavailable(String),
    #[error("catalog has no entries for {0}")]
    EmptyCatalog(&'static str),
    #[error("could not find a start/end pair for the border walk")]
    NoWalkPair,
    #[error("invalid mode info for {mode}: {reason}")]
    InvalidModeInfo { mode: String, reason: &'static str },
    #[error("session limit of {0} reached")]
    SessionLimit(usize),
}

/// Failures fetching or decoding geographic datasets.
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("dataset request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("dataset is not valid TopoJSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("TopoJSON has no object named '{0}'")]
    MissingObject(String),
    #[error("arc index {0} out of range")]
    BadArc(i64),
}

/// Failures talking to the records/auth API.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("records API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("records API answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("records API is not configured")]
    Disabled,
}
