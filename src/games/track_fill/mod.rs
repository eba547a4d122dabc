//! Track filling race.
//!
//! A single row of sites with a track running along it. On each turn the
//! mover places a piece on the first free site of the track; whoever fills
//! the last site wins. An optional opening phase has the first player claim
//! the far end before the race starts.

mod game;

pub use game::{TrackFill, TRACK};
