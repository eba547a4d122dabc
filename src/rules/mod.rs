//! Compiled game rules.
//!
//! A [`Game`] bundles configuration, topology, Zobrist tables, phases with
//! their move rule trees, and end rules. It is built once through
//! [`GameBuilder`] and shared read-only by every context playing it.
//!
//! The engine never interprets game-specific concepts directly: predicates
//! it does not know come in through [`BooleanFunction`], move generators
//! through `moves::MoveGenerator`.

pub mod condition;
pub mod game;
pub mod meta;

pub use condition::{BooleanFunction, Condition};
pub use game::{EndResult, EndRule, Game, GameBuilder, Phase, Transition};
