//! Tic-tac-toe rules.

use std::sync::Arc;

use crate::core::{Context, GameConfig, MetaRules, RepetitionRule, Result};
use crate::moves::{Do, Moves};
use crate::rules::{BooleanFunction, Condition, EndResult, EndRule, Game, GameBuilder, Phase};
use crate::topology::SquareBoard;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// How the placement rule is wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuleShape {
    /// Bare placement.
    #[default]
    Plain,
    /// Placement inside a `Do` with a positional repetition check.
    Do,
    /// `If (board not full) Do else Pass`.
    IfElseDo,
    /// `Or [Do, Pass]`.
    OrDoPass,
}

/// True when the mover's role holds a complete line.
#[derive(Debug)]
pub struct ThreeInARow;

impl BooleanFunction for ThreeInARow {
    fn eval(&self, ctx: &Context) -> bool {
        let role = ctx.state.role_of(ctx.mover());
        LINES
            .iter()
            .any(|line| line.iter().all(|&site| !ctx.state.is_empty(site) && ctx.state.who(site) == role))
    }
}

/// Builder for tic-tac-toe variants.
#[derive(Clone, Debug, Default)]
pub struct TicTacToe {
    shape: RuleShape,
    meta: MetaRules,
    max_moves: Option<usize>,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: RuleShape) -> Self {
        self.shape = shape;
        self
    }

    /// Allow the second player to swap sides on their first move.
    pub fn swap(mut self) -> Self {
        self.meta.swap = true;
        self
    }

    pub fn no_repeat(mut self, rule: RepetitionRule) -> Self {
        self.meta.no_repeat = Some(rule);
        self
    }

    pub fn max_moves(mut self, max: usize) -> Self {
        self.max_moves = Some(max);
        self
    }

    /// Compile the game.
    pub fn build(self) -> Result<Arc<Game>> {
        let mut config = GameConfig::new("Tic-Tac-Toe", 2).with_meta(self.meta);
        if let Some(max) = self.max_moves {
            config = config.with_max_moves(max);
        }

        let place = || Do::new(Moves::add_empty(1)).with_repetition(RepetitionRule::positional());
        let moves = match self.shape {
            RuleShape::Plain => Moves::add_empty(1),
            RuleShape::Do => place().into(),
            RuleShape::IfElseDo => Moves::if_else(
                Condition::BoardFull.negate(),
                place().into(),
                Some(Moves::Pass),
            ),
            RuleShape::OrDoPass => Moves::or([place().into(), Moves::Pass]),
        };

        GameBuilder::new(config, SquareBoard::new(3, 3))
            .with_phase(Phase::new("Play", moves))
            .with_end(EndRule::new(
                Condition::Custom(Arc::new(ThreeInARow)),
                EndResult::MoverWins,
            ))
            .with_end(EndRule::new(Condition::BoardFull, EndResult::Draw))
            .build()
    }
}
