//! Random playouts.
//!
//! A playout repeats one ply until the trial is over or the ply budget runs
//! out:
//!
//! 1. take the mover,
//! 2. ask the mover's agent, or generate candidate moves,
//! 3. pick one with the [`MoveSelector`], subject to a legality recheck,
//! 4. apply it through `Game::apply`.
//!
//! ## Strategies
//!
//! - [`PlayoutEngine::run`] evaluates the phase's full rule tree every ply.
//! - [`PlayoutEngine::run_fast`] recognises a bare `Do`, `If/Do` or
//!   `Or[Do, Pass]` at the top of the phase. Prior moves are generated once
//!   per ply and the `Do` filters and meta rules are checked only on the
//!   moves actually sampled. Every move it plays is legal on the general
//!   path. When the phase changes mid-playout the rest is played on the
//!   general path; anything else it cannot handle is reported as
//!   `EngineError::UnsupportedPlayout` before a move is made.
//! - [`PlayoutEngine::run_auto`] picks the fast path when it applies.
//!
//! Both paths offer the swap move before falling back to a pass.

mod config;
mod engine;
mod fast;
mod policy;
mod stats;

pub use config::PlayoutConfig;
pub use engine::PlayoutEngine;
pub use fast::FastShape;
pub use policy::{Agent, Heuristic, MoveSelector, RandomAgent, UniformSelector, WeightedSelector};
pub use stats::PlayoutStats;
