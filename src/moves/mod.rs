//! Move rule nodes and their evaluation.
//!
//! A game's move rules form a tree of [`Moves`] nodes. Evaluating a node
//! against a [`Context`] yields the candidate moves for the current
//! position. Evaluation never mutates the caller's context beyond scratch
//! values it restores (the site pointer); anything speculative happens on a
//! [`Context::temp_copy`].
//!
//! ## Nodes
//!
//! | Node | Result |
//! |------|--------|
//! | `Pass`, `MoveAgain`, `Add` | base generators |
//! | `Generator` | externally defined [`MoveGenerator`] |
//! | [`Do`] | prior moves, then next moves on the advanced position, filtered by an after condition and repetition rule |
//! | [`While`] | moves applied one after another on a shared copy while a condition holds |
//! | [`Priority`] | first non-empty generator, moves tagged with its index |
//! | [`AvoidStoredState`] | inner moves not leading back to the stored state |
//! | [`FirstMoveOnTrack`] | first non-empty result scanning a track |
//! | [`If`], `Or`, [`Then`] | branching, concatenation, consequences |

mod avoid;
mod base;
mod control;
mod do_moves;
mod priority;
mod track;
mod while_moves;

pub use avoid::AvoidStoredState;
pub use base::{Add, Region};
pub use control::{If, Then};
pub use do_moves::Do;
pub use priority::Priority;
pub use track::{FirstMoveOnTrack, TrackOwner};
pub use while_moves::While;

use std::fmt::Debug;
use std::sync::Arc;

use crate::core::{Action, Context, GameFlags, Move, Result};
use crate::rules::Condition;
use crate::topology::Topology;

/// Externally defined move generator.
pub trait MoveGenerator: Debug + Send + Sync {
    /// Candidate moves for the current position.
    fn generate(&self, ctx: &mut Context) -> Result<Vec<Move>>;

    /// True if the result never depends on the context.
    fn is_static(&self) -> bool {
        false
    }

    /// Features the generator relies on.
    fn game_flags(&self) -> GameFlags {
        GameFlags::empty()
    }

    /// Validate against the topology when the game is built.
    fn preprocess(&self, _topology: &dyn Topology) -> Result<()> {
        Ok(())
    }
}

/// A move rule node.
#[derive(Clone, Debug)]
pub enum Moves {
    // === Base generators ===
    Pass,
    /// The mover moves again after this move.
    MoveAgain,
    Add(Add),
    Generator(Arc<dyn MoveGenerator>),

    // === Combinators ===
    Do(Do),
    While(While),
    Priority(Priority),
    AvoidStoredState(AvoidStoredState),
    FirstMoveOnTrack(FirstMoveOnTrack),

    // === Control ===
    If(If),
    Or(Vec<Moves>),
    Then(Then),
}

impl Moves {
    /// Place a piece of type `what` on any empty site.
    #[must_use]
    pub fn add_empty(what: u32) -> Self {
        Self::Add(Add::new(Region::Empty, what))
    }

    /// Place a piece on one of `sites` if empty.
    #[must_use]
    pub fn add_at(sites: Vec<usize>, what: u32) -> Self {
        Self::Add(Add::new(Region::Sites(sites), what))
    }

    /// Place a piece on the current site pointer if empty.
    #[must_use]
    pub fn add_current(what: u32) -> Self {
        Self::Add(Add::new(Region::CurrentSite, what))
    }

    pub fn generator(generator: impl MoveGenerator + 'static) -> Self {
        Self::Generator(Arc::new(generator))
    }

    /// Concatenate the results of several nodes.
    pub fn or(moves: impl IntoIterator<Item = Moves>) -> Self {
        Self::Or(moves.into_iter().collect())
    }

    /// Attach a consequence to every produced move.
    #[must_use]
    pub fn then(self, consequence: Moves) -> Self {
        Self::Then(Then::new(self, consequence))
    }

    /// `then` if `condition` holds, otherwise `otherwise` (or nothing).
    #[must_use]
    pub fn if_else(condition: Condition, then: Moves, otherwise: Option<Moves>) -> Self {
        Self::If(If::new(condition, then, otherwise))
    }

    // === Evaluation ===

    /// Candidate moves for the current position of `ctx`.
    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        match self {
            Moves::Pass => Ok(vec![Move::pass(ctx.mover())]),
            Moves::MoveAgain => {
                let mover = ctx.mover();
                Ok(vec![Move::from_actions(
                    mover,
                    [Action::SetNextPlayer { player: mover }],
                )])
            }
            Moves::Add(add) => Ok(add.eval(ctx)),
            Moves::Generator(generator) => generator.generate(ctx),
            Moves::Do(d) => d.eval(ctx),
            Moves::While(w) => w.eval(ctx),
            Moves::Priority(p) => p.eval(ctx),
            Moves::AvoidStoredState(a) => a.eval(ctx),
            Moves::FirstMoveOnTrack(f) => f.eval(ctx),
            Moves::If(i) => i.eval(ctx),
            Moves::Or(list) => {
                let mut moves = Vec::new();
                for node in list {
                    moves.extend(node.eval(ctx)?);
                }
                Ok(moves)
            }
            Moves::Then(t) => t.eval(ctx),
        }
    }

    /// True if the result never depends on the context.
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            Moves::Pass | Moves::MoveAgain => true,
            Moves::Add(_) => false,
            Moves::Generator(generator) => generator.is_static(),
            Moves::Do(d) => d.is_static(),
            Moves::While(_) | Moves::AvoidStoredState(_) => false,
            Moves::Priority(p) => p.is_static(),
            Moves::FirstMoveOnTrack(f) => f.is_static(),
            Moves::If(i) => i.is_static(),
            Moves::Or(list) => list.iter().all(Moves::is_static),
            Moves::Then(t) => t.is_static(),
        }
    }

    /// Features this subtree relies on.
    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        match self {
            Moves::Pass | Moves::MoveAgain | Moves::Add(_) => GameFlags::empty(),
            Moves::Generator(generator) => generator.game_flags(),
            Moves::Do(d) => d.game_flags(),
            Moves::While(w) => w.game_flags(),
            Moves::Priority(p) => p.game_flags(),
            Moves::AvoidStoredState(a) => a.game_flags(),
            Moves::FirstMoveOnTrack(f) => f.game_flags(),
            Moves::If(i) => i.game_flags(),
            Moves::Or(list) => list
                .iter()
                .fold(GameFlags::empty(), |flags, m| flags | m.game_flags()),
            Moves::Then(t) => t.game_flags(),
        }
    }

    /// Validate the subtree against the topology.
    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        match self {
            Moves::Pass | Moves::MoveAgain | Moves::Add(_) => Ok(()),
            Moves::Generator(generator) => generator.preprocess(topology),
            Moves::Do(d) => d.preprocess(topology),
            Moves::While(w) => w.preprocess(topology),
            Moves::Priority(p) => p.preprocess(topology),
            Moves::AvoidStoredState(a) => a.preprocess(topology),
            Moves::FirstMoveOnTrack(f) => f.preprocess(topology),
            Moves::If(i) => i.preprocess(topology),
            Moves::Or(list) => list.iter().try_for_each(|m| m.preprocess(topology)),
            Moves::Then(t) => t.preprocess(topology),
        }
    }
}

impl From<Add> for Moves {
    fn from(add: Add) -> Self {
        Self::Add(add)
    }
}

impl From<Do> for Moves {
    fn from(d: Do) -> Self {
        Self::Do(d)
    }
}

impl From<While> for Moves {
    fn from(w: While) -> Self {
        Self::While(w)
    }
}

impl From<Priority> for Moves {
    fn from(p: Priority) -> Self {
        Self::Priority(p)
    }
}

impl From<AvoidStoredState> for Moves {
    fn from(a: AvoidStoredState) -> Self {
        Self::AvoidStoredState(a)
    }
}

impl From<FirstMoveOnTrack> for Moves {
    fn from(f: FirstMoveOnTrack) -> Self {
        Self::FirstMoveOnTrack(f)
    }
}

impl From<If> for Moves {
    fn from(i: If) -> Self {
        Self::If(i)
    }
}
