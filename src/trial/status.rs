//! Terminal status of a trial.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndType {
    /// An end rule of the game fired.
    Rules,
    /// The configured move limit was reached.
    MoveLimit,
    /// Every active player passed in a row.
    AllPassed,
}

/// Outcome of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Status {
    winner: Option<PlayerId>,
    /// Set when a player lost with nobody else to credit (solo games).
    loser: Option<PlayerId>,
    end_type: EndType,
}

impl Status {
    /// `winner` won by the rules.
    #[must_use]
    pub const fn win(winner: PlayerId) -> Self {
        Self {
            winner: Some(winner),
            loser: None,
            end_type: EndType::Rules,
        }
    }

    /// `loser` lost by the rules and no other player is credited.
    #[must_use]
    pub const fn loss(loser: PlayerId) -> Self {
        Self {
            winner: None,
            loser: Some(loser),
            end_type: EndType::Rules,
        }
    }

    /// Nobody won.
    #[must_use]
    pub const fn draw(end_type: EndType) -> Self {
        Self {
            winner: None,
            loser: None,
            end_type,
        }
    }

    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub const fn loser(&self) -> Option<PlayerId> {
        self.loser
    }

    #[must_use]
    pub const fn end_type(&self) -> EndType {
        self.end_type
    }

    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.winner.is_none() && self.loser.is_none()
    }

    /// True if `player` lost outright or someone else won.
    #[must_use]
    pub fn is_loss_for(&self, player: PlayerId) -> bool {
        self.loser == Some(player) || self.winner.is_some_and(|w| w != player)
    }
}
