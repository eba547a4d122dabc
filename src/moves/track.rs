//! Scan a track for the first site with moves.

use crate::core::{Context, EngineError, GameFlags, Move, PlayerId, Result};
use crate::topology::Topology;

use super::Moves;

/// Whose copy of a named track to scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackOwner {
    /// The shared track.
    Shared,
    /// The mover's track, falling back to the shared one.
    Mover,
    Player(PlayerId),
}

/// Walk the sites of a track in order with the site pointer on each, and
/// return the first non-empty result of `moves`. The caller's site pointer
/// is restored on every exit.
#[derive(Clone, Debug)]
pub struct FirstMoveOnTrack {
    pub track: String,
    pub owner: TrackOwner,
    pub moves: Box<Moves>,
}

impl FirstMoveOnTrack {
    pub fn new(track: impl Into<String>, owner: TrackOwner, moves: impl Into<Moves>) -> Self {
        Self {
            track: track.into(),
            owner,
            moves: Box::new(moves.into()),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let game = std::sync::Arc::clone(ctx.game());
        let owner = match self.owner {
            TrackOwner::Shared => None,
            TrackOwner::Mover => Some(ctx.mover()),
            TrackOwner::Player(player) => Some(player),
        };
        let Some(track) = game.topology().track(&self.track, owner) else {
            return Ok(Vec::new());
        };

        let saved = ctx.site();
        let found = self.scan(ctx, &track.sites);
        ctx.set_site(saved);
        found
    }

    fn scan(&self, ctx: &mut Context, sites: &[usize]) -> Result<Vec<Move>> {
        for &site in sites {
            ctx.set_site(Some(site));
            let moves = self.moves.eval(ctx)?;
            if !moves.is_empty() {
                return Ok(moves);
            }
        }
        Ok(Vec::new())
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        false
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        GameFlags::TRACKS | self.moves.game_flags()
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        if !topology.has_track(&self.track) {
            return Err(EngineError::MissingTrack {
                combinator: "FirstMoveOnTrack",
                track: self.track.clone(),
            });
        }
        self.moves.preprocess(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::hash::Level;
    use crate::rules::{GameBuilder, Phase};
    use crate::topology::{SquareBoard, Track};

    fn board() -> SquareBoard {
        SquareBoard::new(4, 1)
            .with_track(Track::new("Main", vec![3, 2, 1, 0]))
            .with_track(Track::new("Main", vec![0, 1, 2, 3]).owned_by(PlayerId::new(1)))
    }

    #[test]
    fn test_first_free_site_and_restore() {
        let f = FirstMoveOnTrack::new("Main", TrackOwner::Shared, Moves::add_current(1));
        let game = GameBuilder::new(GameConfig::new("Track", 2), board())
            .with_phase(Phase::new("Main", f.clone()))
            .build()
            .unwrap();
        let mut ctx = Context::new(game, 1);
        ctx.state.place(3, Level::piece(2, 1));
        ctx.set_site(Some(0));

        let moves = f.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Some(2));
        assert_eq!(ctx.site(), Some(0));
    }

    #[test]
    fn test_shared_owner_ignores_player_track_listed_first() {
        let board = SquareBoard::new(4, 1)
            .with_track(Track::new("Main", vec![0, 1, 2, 3]).owned_by(PlayerId::new(1)))
            .with_track(Track::new("Main", vec![3, 2, 1, 0]));
        let f = FirstMoveOnTrack::new("Main", TrackOwner::Shared, Moves::add_current(1));
        let game = GameBuilder::new(GameConfig::new("Track", 2), board)
            .with_phase(Phase::new("Main", f.clone()))
            .build()
            .unwrap();
        let mut ctx = Context::new(game, 1);

        let moves = f.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Some(3));
    }

    #[test]
    fn test_owned_track() {
        let f = FirstMoveOnTrack::new("Main", TrackOwner::Mover, Moves::add_current(1));
        let game = GameBuilder::new(GameConfig::new("Track", 2), board())
            .with_phase(Phase::new("Main", f.clone()))
            .build()
            .unwrap();
        let mut ctx = Context::new(game, 1);

        let moves = f.eval(&mut ctx).unwrap();
        assert_eq!(moves[0].to, Some(0));
        assert_eq!(ctx.site(), None);
    }

    #[test]
    fn test_missing_track_rejected_at_build() {
        let f = FirstMoveOnTrack::new("Ghost", TrackOwner::Shared, Moves::add_current(1));
        let err = GameBuilder::new(GameConfig::new("Track", 2), board())
            .with_phase(Phase::new("Main", f))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingTrack { combinator: "FirstMoveOnTrack", ref track } if track == "Ghost"
        ));
    }

    #[test]
    fn test_site_restored_on_error() {
        let inner = crate::moves::While::new(crate::rules::Condition::True, Moves::Pass);
        let f = FirstMoveOnTrack::new("Main", TrackOwner::Shared, inner);
        let game = GameBuilder::new(GameConfig::new("Track", 2).with_loop_cap(3), board())
            .with_phase(Phase::new("Main", f.clone()))
            .build()
            .unwrap();
        let mut ctx = Context::new(game, 1);
        ctx.set_site(Some(1));

        assert!(f.eval(&mut ctx).is_err());
        assert_eq!(ctx.site(), Some(1));
    }
}
