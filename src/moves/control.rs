//! Branching and consequences.

use std::sync::Arc;

use crate::core::{Context, GameFlags, Move, Result};
use crate::rules::Condition;
use crate::topology::Topology;

use super::Moves;

/// `then` when `condition` holds, else `otherwise` (nothing if absent).
#[derive(Clone, Debug)]
pub struct If {
    pub condition: Condition,
    pub then: Box<Moves>,
    pub otherwise: Option<Box<Moves>>,
}

impl If {
    pub fn new(condition: Condition, then: impl Into<Moves>, otherwise: Option<Moves>) -> Self {
        Self {
            condition,
            then: Box::new(then.into()),
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        if self.condition.eval(ctx) {
            self.then.eval(ctx)
        } else if let Some(otherwise) = &self.otherwise {
            otherwise.eval(ctx)
        } else {
            Ok(Vec::new())
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.condition.is_static()
            && self.then.is_static()
            && self.otherwise.as_ref().map_or(true, |m| m.is_static())
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        let mut flags = self.condition.game_flags() | self.then.game_flags();
        if let Some(otherwise) = &self.otherwise {
            flags |= otherwise.game_flags();
        }
        flags
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.then.preprocess(topology)?;
        if let Some(otherwise) = &self.otherwise {
            otherwise.preprocess(topology)?;
        }
        Ok(())
    }
}

/// Moves of `moves`, each carrying `consequence` to evaluate when applied.
#[derive(Clone, Debug)]
pub struct Then {
    pub moves: Box<Moves>,
    pub consequence: Arc<Moves>,
}

impl Then {
    pub fn new(moves: impl Into<Moves>, consequence: Moves) -> Self {
        Self {
            moves: Box::new(moves.into()),
            consequence: Arc::new(consequence),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        let mut moves = self.moves.eval(ctx)?;
        for mv in &mut moves {
            mv.then.push(Arc::clone(&self.consequence));
        }
        Ok(moves)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.moves.is_static() && self.consequence.is_static()
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        GameFlags::CONSEQUENCES | self.moves.game_flags() | self.consequence.game_flags()
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.moves.preprocess(topology)?;
        self.consequence.preprocess(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Action, PlayerId};
    use crate::games::TicTacToe;

    #[test]
    fn test_if_branches() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(game, 1);

        let branch = If::new(Condition::IsEmpty(4), Moves::add_at(vec![4], 1), Some(Moves::Pass));
        assert_eq!(branch.eval(&mut ctx).unwrap()[0].to, Some(4));

        let branch = If::new(Condition::IsOccupied(4), Moves::add_at(vec![4], 1), Some(Moves::Pass));
        assert!(branch.eval(&mut ctx).unwrap()[0].is_pass());

        let branch = If::new(Condition::False, Moves::Pass, None);
        assert!(branch.eval(&mut ctx).unwrap().is_empty());
    }

    #[test]
    fn test_then_attaches_consequence() {
        let game = TicTacToe::new().build().unwrap();
        let mut ctx = Context::new(std::sync::Arc::clone(&game), 1);

        let then = Then::new(Moves::add_at(vec![0, 1], 1), Moves::MoveAgain);
        let moves = then.eval(&mut ctx).unwrap();
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.then.len() == 1));

        let applied = game.apply_actions(&mut ctx, moves[0].clone()).unwrap();
        assert_eq!(
            applied.actions.last(),
            Some(&Action::SetNextPlayer { player: PlayerId::new(1) })
        );
        assert!(applied.then.is_empty());
    }
}
