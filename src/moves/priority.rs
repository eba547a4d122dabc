//! Ordered fallback between generators.

use crate::core::{Context, GameFlags, Move, Result};
use crate::topology::Topology;

use super::Moves;

/// Result of the first generator producing anything. Every returned move
/// records the index of that generator in `Move::produced_by`.
#[derive(Clone, Debug)]
pub struct Priority {
    pub list: Vec<Moves>,
}

impl Priority {
    pub fn new(list: impl IntoIterator<Item = Moves>) -> Self {
        Self {
            list: list.into_iter().collect(),
        }
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Vec<Move>> {
        for (index, generator) in self.list.iter().enumerate() {
            let mut moves = generator.eval(ctx)?;
            if !moves.is_empty() {
                for mv in &mut moves {
                    mv.produced_by = Some(index);
                }
                return Ok(moves);
            }
        }
        Ok(Vec::new())
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.list.iter().all(Moves::is_static)
    }

    #[must_use]
    pub fn game_flags(&self) -> GameFlags {
        self.list
            .iter()
            .fold(GameFlags::empty(), |flags, m| flags | m.game_flags())
    }

    pub fn preprocess(&self, topology: &dyn Topology) -> Result<()> {
        self.list.iter().try_for_each(|m| m.preprocess(topology))
    }
}
