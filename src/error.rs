use crate::types::GamePhase;

pub type SongfestResult<T> = Result<T, SongfestError>;

/// Operations the engine refuses outright.
///
/// Harmless no-ops (unknown players, duplicate lock-ins, events for the wrong
/// round) are not errors; they are reported through the operation's outcome.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SongfestError {
    #[error("Cannot {action} during the {phase:?} phase")]
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Player '{0}' not found")]
    UnknownPlayer(String),

    #[error("Songfest is not accepting new players")]
    NotAcceptingPlayers,

    #[error("Expected {expected} songs, got {actual}")]
    SubmissionCountMismatch { expected: usize, actual: usize },

    #[error("Invalid clip #{index}: {reason}")]
    InvalidClip { index: usize, reason: String },

    #[error("Player '{0}' has already submitted their songs")]
    AlreadySubmitted(String),
}

impl SongfestError {
    /// Stable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            SongfestError::WrongPhase { .. } => "WRONG_PHASE",
            SongfestError::InvalidSettings(_) => "INVALID_SETTINGS",
            SongfestError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            SongfestError::NotAcceptingPlayers => "NOT_ACCEPTING_PLAYERS",
            SongfestError::SubmissionCountMismatch { .. } => "SUBMISSION_COUNT_MISMATCH",
            SongfestError::InvalidClip { .. } => "INVALID_CLIP",
            SongfestError::AlreadySubmitted(_) => "ALREADY_SUBMITTED",
        }
    }
}
