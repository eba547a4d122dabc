//! Filter against the stored state.

use std::sync::Arc;

use crate::core::{Context, GameFlags, Move, Result};
use crate::topology::Topology;

use super::Moves;

/// Inner moves whose resulting `state_hash` differs from the one remembered
/// by the last store-state action. With nothing stored every move passes.
#[derive(Clone, Debug)]
pub struct AvoidStoredState {
    pub moves: Box<Moves>,
}

impl AvoidStoredState {
    pub fn new(moves: impl Into<Moves>) -> Self {
        Self {
            moves: Box::new(moves.into()),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let candidates = self.moves.eval(ctx)?;
        let Some(stored) = ctx.state.stored_state() else {
            return Ok(candidates);
        };

        let game = Arc::clone(ctx.game());
        let mut kept = Vec::with_capacity(candidates.len());
        for mv in candidates {
            let mut temp = ctx.temp_copy();
            game.apply_actions(&mut temp, mv.clone())?;
            if temp.state.state_hash() != stored {
                kept.push(mv);
            }
        }
        Ok(kept)
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        GameFlags::REPETITION | self.moves.game_flags()
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.moves.preprocess(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use crate::games::TicTacToe;
    use crate::hash::Level;

    #[test]
    fn test_skips_stored_position() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(game, 1);
        let avoid = AvoidStoredState::new(Moves::add_empty(1));

        assert_eq!(avoid.eval(&mut ctx).unwrap().len(), 9);

        // Remember the board with a piece on 4, then take it back.
        ctx.state.place(4, Level::piece(1, 1));
        Action::StoreState.apply(&mut ctx.state);
        ctx.state.lift(4);

        let moves = avoid.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.to != Some(4)));
    }
}
