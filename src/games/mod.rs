//! Reference games.
//!
//! Small rule sets built only from engine primitives, used by the tests and
//! benchmarks.

pub mod tic_tac_toe;
pub mod track_fill;

pub use tic_tac_toe::{RuleShape, TicTacToe};
pub use track_fill::TrackFill;
