//! Board topology seen by the engine.
//!
//! The engine only needs a site count (to size hash ledgers), adjacency,
//! named tracks and the site permutations of the board's symmetries. Any
//! graph structure can implement [`Topology`]; [`SquareBoard`] is the
//! rectangular reference implementation.

mod board;

pub use board::SquareBoard;

use std::fmt::Debug;

use crate::core::PlayerId;

/// Named, optionally owned, ordered list of sites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    /// `None` for tracks shared by every player.
    pub owner: Option<PlayerId>,
    pub sites: Vec<usize>,
}

impl Track {
    #[must_use]
    pub fn new(name: impl Into<String>, sites: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            sites,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Read-only board structure.
pub trait Topology: Debug + Send + Sync {
    /// Number of sites.
    fn num_sites(&self) -> usize;

    /// Sites adjacent to `site`.
    fn neighbours(&self, site: usize) -> &[usize];

    /// Every track on the board.
    fn tracks(&self) -> &[Track];

    /// Site permutations of the board's symmetries, identity excluded.
    fn symmetries(&self) -> Vec<Vec<usize>> {
        Vec::new()
    }

    /// Track called `name`. With an `owner`, that player's track is
    /// preferred and a shared one is the fallback; without, only shared
    /// tracks match.
    fn track(&self, name: &str, owner: Option<PlayerId>) -> Option<&Track> {
        let mut named = self.tracks().iter().filter(|t| t.name == name);
        match owner {
            None => named.find(|t| t.owner.is_none()),
            Some(owner) => {
                let candidates: Vec<&Track> = named.collect();
                candidates
                    .iter()
                    .find(|t| t.owner == Some(owner))
                    .or_else(|| candidates.iter().find(|t| t.owner.is_none()))
                    .copied()
            }
        }
    }

    /// True if some track is called `name`.
    fn has_track(&self, name: &str) -> bool {
        self.tracks().iter().any(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_lookup_prefers_owner() {
        let p1 = PlayerId::new(1);
        let p2 = PlayerId::new(2);
        let board = SquareBoard::new(4, 1)
            .with_track(Track::new("Home", vec![0, 1]).owned_by(p1))
            .with_track(Track::new("Home", vec![3, 2]));

        assert_eq!(board.track("Home", Some(p1)).map(|t| t.sites.clone()), Some(vec![0, 1]));
        assert_eq!(board.track("Home", Some(p2)).map(|t| t.sites.clone()), Some(vec![3, 2]));
        assert!(board.track("Away", None).is_none());
        assert!(board.has_track("Home"));
    }

    #[test]
    fn test_shared_lookup_skips_owned_tracks() {
        let p1 = PlayerId::new(1);
        let board = SquareBoard::new(4, 1)
            .with_track(Track::new("Home", vec![0, 1]).owned_by(p1))
            .with_track(Track::new("Home", vec![3, 2]))
            .with_track(Track::new("Private", vec![2]).owned_by(p1));

        assert_eq!(board.track("Home", None).map(|t| t.sites.clone()), Some(vec![3, 2]));
        assert!(board.track("Private", None).is_none());
    }
}
