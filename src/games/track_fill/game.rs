//! Track fill rules.

use std::sync::Arc;

use crate::core::{GameConfig, Result};
use crate::moves::{Do, FirstMoveOnTrack, Moves, TrackOwner};
use crate::rules::{Condition, EndResult, EndRule, Game, GameBuilder, Phase};
use crate::topology::{SquareBoard, Track};

/// Name of the track pieces are placed along.
pub const TRACK: &str = "Main";

/// Builder for track fill games.
#[derive(Clone, Debug)]
pub struct TrackFill {
    length: usize,
    players: usize,
    opening: bool,
}

impl Default for TrackFill {
    fn default() -> Self {
        Self {
            length: 8,
            players: 2,
            opening: false,
        }
    }
}

impl TrackFill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(mut self, length: usize) -> Self {
        assert!(length >= 2, "track needs at least two sites");
        self.length = length;
        self
    }

    pub fn player_count(mut self, count: usize) -> Self {
        self.players = count;
        self
    }

    /// Start with an opening phase in which the far end is claimed.
    pub fn opening(mut self) -> Self {
        self.opening = true;
        self
    }

    /// Compile the game.
    pub fn build(self) -> Result<Arc<Game>> {
        let last = self.length - 1;
        let board = SquareBoard::new(self.length, 1)
            .with_track(Track::new(TRACK, (0..self.length).collect()));

        let race = Phase::new(
            "Race",
            FirstMoveOnTrack::new(TRACK, TrackOwner::Mover, Moves::add_current(1)),
        );

        let mut builder = GameBuilder::new(GameConfig::new("Track Fill", self.players), board);
        if self.opening {
            builder = builder.with_phase(
                Phase::new("Opening", Do::new(Moves::add_at(vec![last], 1)))
                    .with_transition(Condition::IsOccupied(last), 1),
            );
        }
        builder
            .with_phase(race)
            .with_end(EndRule::new(Condition::BoardFull, EndResult::MoverWins))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Context, GameFlags, PlayerId};

    #[test]
    fn test_fills_in_track_order() {
        let game = TrackFill::new().length(4).build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);

        for expected in 0..4 {
            let moves = game.moves(&mut ctx).unwrap();
            assert_eq!(moves.len(), 1);
            assert_eq!(moves[0].to, Some(expected));
            game.apply(&mut ctx, moves[0].clone()).unwrap();
        }
        assert_eq!(ctx.trial.status().and_then(|s| s.winner()), Some(PlayerId::new(2)));
        assert!(game.flags().contains(GameFlags::TRACKS));
    }

    #[test]
    fn test_opening_moves_to_race() {
        let game = TrackFill::new().length(4).opening().build().unwrap();
        let mut ctx = Context::new(Arc::clone(&game), 1);

        let moves = game.moves(&mut ctx).unwrap();
        assert_eq!(moves[0].to, Some(3));
        game.apply(&mut ctx, moves[0].clone()).unwrap();

        assert_eq!(ctx.state.phase(ctx.mover()), 1);
        assert_eq!(game.moves(&mut ctx).unwrap()[0].to, Some(0));
        assert!(game.flags().contains(GameFlags::PHASES));
    }
}
