//! Per-request load status.

use std::fmt;

/// Progress of one request object (the game, or a single panel).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl LoadState {
    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    /// The error message, if the last request failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => write!(f, "idle"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Success => write!(f, "success"),
            LoadState::Error(message) => write!(f, "error: {message}"),
        }
    }
}
