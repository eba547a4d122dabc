//! Tic-tac-toe on a 3×3 board.
//!
//! Players alternately place a piece on an empty site; three in a row wins
//! for the player who completed it, a full board is a draw. The move rules
//! can be wrapped in the shapes the fast playout path recognises, so the
//! same game exercises both playout strategies.

mod game;

pub use game::{RuleShape, ThreeInARow, TicTacToe};
