//! Trial: the append-only record of one game instance.
//!
//! ## Contents
//!
//! - The ordered move sequence, with the `state_hash` reached after each
//!   move and the number of setup moves.
//! - The terminal [`Status`], `None` while the game is running.
//! - The cached legal moves for the position about to be played. They are
//!   installed only through `Context::set_legal_moves`, which applies the
//!   meta rules and the pass fallback.
//! - [`RepetitionHistory`]: positional and situational hashes, game-long
//!   and since the last change of mover.
//! - An undo stack of [`UndoData`] snapshots, released with
//!   [`Trial::null_undo_data`] once undo is no longer needed.
//!
//! [`TrialRecord`] is the persisted, replayable form.

mod history;
mod record;
mod repetition;
mod status;
mod undo;

pub use history::Trial;
pub use record::{MoveRecord, TrialRecord};
pub use repetition::RepetitionHistory;
pub use status::{EndType, Status};
pub use undo::UndoData;
