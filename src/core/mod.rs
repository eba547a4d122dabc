//! Core engine types: players, RNG, configuration, state, actions and
//! the evaluation context.
//!
//! Everything here is game-agnostic. Games describe themselves through
//! `GameConfig` and a rule tree; the core sizes its hash ledgers from them.

pub mod action;
pub mod config;
pub mod context;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, Move};
pub use config::{
    GameConfig, GameFlags, MetaRules, ModeType, RepetitionKind, RepetitionRule, RepetitionScope,
    DEFAULT_HASH_SEED, DEFAULT_LOOP_CAP,
};
pub use context::Context;
pub use error::{EngineError, Result};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS};
pub use rng::{GameRng, GameRngState};
pub use state::State;
