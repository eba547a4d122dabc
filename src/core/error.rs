//! Engine error type.
//!
//! Only configuration problems and misuse surface here. A player with no
//! legal move is not an error (the engine passes for them), and broken
//! internal invariants panic.

use thiserror::Error;

/// Errors raised while compiling, simulating or replaying a game.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{combinator} in phase `{phase}` exceeded {cap} iterations")]
    LoopLimit {
        combinator: &'static str,
        phase: String,
        cap: usize,
    },
    #[error("{combinator} refers to missing track `{track}`")]
    MissingTrack {
        combinator: &'static str,
        track: String,
    },
    #[error("fast playout unsupported in phase `{phase}`: {reason}")]
    UnsupportedPlayout { phase: String, reason: String },
    #[error("invalid game: {0}")]
    InvalidGame(String),
    #[error("trial is already over")]
    TrialOver,
    #[error("replay diverged at move {index}: expected hash {expected:#018x}, got {actual:#018x}")]
    ReplayDiverged {
        index: usize,
        expected: u64,
        actual: u64,
    },
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
