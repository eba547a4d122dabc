//! Primitive actions and moves.
//!
//! An [`Action`] is one atomic state mutation. A [`Move`] bundles the
//! actions a player performs in one decision together with bookkeeping:
//! who moved, from/to sites, whether it is a real decision, and an owned
//! list of "then" consequences evaluated when the move is applied.
//!
//! ## Example
//!
//! ```
//! use ludeme_sim::core::{Action, Move, PlayerId};
//!
//! let p1 = PlayerId::new(1);
//! let mv = Move::add(p1, 4, p1, 1);
//! assert_eq!(mv.to, Some(4));
//! assert!(!mv.is_pass());
//!
//! let pass = Move::pass(p1);
//! assert!(pass.is_pass());
//! assert_eq!(pass.actions[0], Action::Pass);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::PlayerId;
use super::state::State;
use crate::hash::Level;
use crate::moves::Moves;

/// One atomic state mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Place a piece of type `what` owned by `who` at `site`.
    Add { site: usize, who: PlayerId, what: u32 },
    /// Remove the top piece at `site`.
    Remove { site: usize },
    /// Move the top piece from one site to another.
    Move { from: usize, to: usize },
    SetSiteState { site: usize, state: u32 },
    SetRotation { site: usize, rotation: u32 },
    SetValue { site: usize, value: u32 },
    SetScore { player: PlayerId, score: i64 },
    AddScore { player: PlayerId, delta: i64 },
    SetAmount { player: PlayerId, amount: i64 },
    SetHidden { player: PlayerId, site: usize, hidden: bool },
    /// Override who moves after this move.
    SetNextPlayer { player: PlayerId },
    SetVar { value: i64 },
    /// Remember the current state hash for state-avoidance rules.
    StoreState,
    /// Do nothing.
    Pass,
    /// Exchange the roles of two players.
    Swap { first: PlayerId, second: PlayerId },
}

impl Action {
    /// Apply this action to `state`.
    pub fn apply(&self, state: &mut State) {
        match *self {
            Action::Add { site, who, what } => state.place(site, Level::piece(who.0 as u32, what)),
            Action::Remove { site } => {
                state.lift(site);
            }
            Action::Move { from, to } => {
                if let Some(level) = state.lift(from) {
                    if !state.is_stacking() {
                        state.clear_site(to);
                    }
                    state.place(to, level);
                }
            }
            Action::SetSiteState { site, state: value } => state.set_site_state(site, value),
            Action::SetRotation { site, rotation } => state.set_rotation(site, rotation),
            Action::SetValue { site, value } => state.set_value(site, value),
            Action::SetScore { player, score } => state.set_score(player, score),
            Action::AddScore { player, delta } => {
                let score = state.score(player).saturating_add(delta);
                state.set_score(player, score);
            }
            Action::SetAmount { player, amount } => state.set_amount(player, amount),
            Action::SetHidden { player, site, hidden } => state.set_hidden(player, site, hidden),
            Action::SetNextPlayer { player } => state.set_next(player),
            Action::SetVar { value } => state.set_var(value),
            Action::StoreState => state.store_state(),
            Action::Pass => {}
            Action::Swap { first, second } => state.swap_players(first, second),
        }
    }
}

/// A player's move: actions plus bookkeeping.
///
/// Equality compares actions, mover, sites and the decision flag. The
/// consequence list and producer tag are evaluation metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Move {
    /// Actions, applied in order.
    pub actions: SmallVec<[Action; 2]>,

    /// Player making the move.
    pub mover: PlayerId,

    pub from: Option<usize>,
    pub to: Option<usize>,

    /// True for moves chosen by a player (as opposed to setup moves).
    pub decision: bool,

    /// Consequences evaluated and folded in when the move is applied.
    #[serde(skip)]
    pub then: Vec<Arc<Moves>>,

    /// Index of the generator that produced this move in a priority list.
    #[serde(skip)]
    pub produced_by: Option<usize>,
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.actions == other.actions
            && self.mover == other.mover
            && self.from == other.from
            && self.to == other.to
            && self.decision == other.decision
    }
}

impl Eq for Move {}

impl Move {
    /// Create an empty move for `mover`.
    #[must_use]
    pub fn new(mover: PlayerId) -> Self {
        Self {
            mover,
            ..Self::default()
        }
    }

    /// Create a move from a list of actions.
    #[must_use]
    pub fn from_actions(mover: PlayerId, actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            mover,
            ..Self::default()
        }
    }

    /// A pass.
    #[must_use]
    pub fn pass(mover: PlayerId) -> Self {
        Self::from_actions(mover, [Action::Pass]).decided()
    }

    /// A swap of the two players' roles.
    #[must_use]
    pub fn swap(mover: PlayerId) -> Self {
        Self::from_actions(
            mover,
            [Action::Swap {
                first: PlayerId::new(1),
                second: PlayerId::new(2),
            }],
        )
        .decided()
    }

    /// Place a piece at `site`.
    #[must_use]
    pub fn add(mover: PlayerId, site: usize, who: PlayerId, what: u32) -> Self {
        let mut mv = Self::from_actions(mover, [Action::Add { site, who, what }]);
        mv.to = Some(site);
        mv
    }

    /// Mark as a decision.
    #[must_use]
    pub fn decided(mut self) -> Self {
        self.decision = true;
        self
    }

    /// Attach a consequence.
    #[must_use]
    pub fn with_then(mut self, consequence: Arc<Moves>) -> Self {
        self.then.push(consequence);
        self
    }

    /// Append an action.
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// True for a plain pass.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.actions.len() == 1 && self.actions[0] == Action::Pass
    }

    /// True if the move swaps roles.
    #[must_use]
    pub fn is_swap(&self) -> bool {
        self.actions.iter().any(|a| matches!(a, Action::Swap { .. }))
    }

    /// Apply every action to `state`. Consequences are not evaluated here.
    pub fn apply_actions(&self, state: &mut State) {
        for action in &self.actions {
            action.apply(state);
        }
    }
}
