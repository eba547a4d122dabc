//! Conditional loop.

use std::sync::Arc;

use tracing::warn;

use crate::core::{Context, EngineError, GameFlags, Move, Result};
use crate::rules::Condition;
use crate::topology::Topology;

use super::Moves;

/// While `condition` holds on a shared copy of the context, evaluate
/// `moves` on it and apply every produced move to the same copy. Returns the
/// applied moves in order.
///
/// Each iteration counts against the game's loop cap; a condition that never
/// becomes false fails with [`EngineError::LoopLimit`].
#[derive(Clone, Debug)]
pub struct While {
    pub condition: Condition,
    pub moves: Box<Moves>,
}

impl While {
    pub fn new(condition: Condition, moves: impl Into<Moves>) -> Self {
        Self {
            condition,
            moves: Box::new(moves.into()),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let game = Arc::clone(ctx.game());
        let cap = game.config().max_loop_iterations;
        let mut temp = ctx.temp_copy();
        let mut applied = Vec::new();

        let mut iterations = 0;
        while self.condition.eval(&temp) {
            iterations += 1;
            if iterations > cap {
                let phase = game.phase_name(ctx.state.phase(ctx.mover())).to_string();
                warn!(%phase, cap, "loop condition never became false");
                return Err(EngineError::LoopLimit {
                    combinator: "While",
                    phase,
                    cap,
                });
            }
            for mv in self.moves.eval(&mut temp)? {
                applied.push(game.apply_actions(&mut temp, mv)?);
            }
        }
        Ok(applied)
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        GameFlags::LOOPS | self.condition.game_flags() | self.moves.game_flags()
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.moves.preprocess(topology)
    }
}
