//! # ludeme-sim
//!
//! Simulation substrate for a general game playing system: hashed game
//! state, trial history, move combinators and random playouts.
//!
//! ## Design Principles
//!
//! 1. **Incremental hashing**: every state mutation XORs a Zobrist delta into
//!    the state hash, so repetition checks and transposition lookups are
//!    O(1) per move.
//!
//! 2. **Scoped speculation**: look-ahead never touches the caller's
//!    `Context`. Combinators work on short-lived copies that are mutated and
//!    dropped.
//!
//! 3. **Rules as data**: games are trees of [`Moves`] and [`Condition`]
//!    nodes compiled once into an immutable [`Game`], shared by any number
//!    of contexts.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) trial copies via `im-rs` for
//!   speculative evaluation.
//!
//! - **Deterministic Replay**: fixed-seed hash tables and checkpointable RNG
//!   make a persisted trial reproduce the exact same state hashes.
//!
//! ## Modules
//!
//! - `core`: players, RNG, configuration, actions and moves, state, context
//! - `hash`: Zobrist term tables and hashed ledgers
//! - `topology`: board structure and tracks
//! - `trial`: move history, status, repetition, undo, persisted records
//! - `rules`: compiled games, phases, end rules, conditions, meta rules
//! - `moves`: move rule nodes and combinators
//! - `playout`: general and fast playouts, selectors, agents
//! - `games`: reference games

pub mod core;
pub mod hash;
pub mod topology;
pub mod trial;
pub mod rules;
pub mod moves;
pub mod playout;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Action, Context, EngineError, GameConfig, GameFlags, GameRng, GameRngState, MetaRules, Move,
    PlayerId, PlayerMap, RepetitionRule, Result, State,
};

pub use crate::hash::{HashedBitSet, HashedChunkSet, HashedStack, ZobristTables};

pub use crate::topology::{SquareBoard, Topology, Track};

pub use crate::trial::{EndType, Status, Trial, TrialRecord};

pub use crate::rules::{BooleanFunction, Condition, EndResult, EndRule, Game, GameBuilder, Phase};

pub use crate::moves::{
    AvoidStoredState, Do, FirstMoveOnTrack, MoveGenerator, Moves, Priority, TrackOwner, While,
};

pub use crate::playout::{
    Agent, MoveSelector, PlayoutConfig, PlayoutEngine, PlayoutStats, RandomAgent,
    UniformSelector, WeightedSelector,
};
