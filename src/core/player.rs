//! Player ids and per-player tables.
//!
//! Ids start at 1. Id 0 ([`PlayerId::NONE`]) is the neutral owner, so a
//! site's owner fits straight into a hash chunk with 0 for "nobody".

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Largest supported player count.
pub const MAX_PLAYERS: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const NONE: PlayerId = PlayerId(0);

    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// The raw id, usable as a table index. `NONE` is 0.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `1..=player_count` as ids.
    ///
    /// ```
    /// use ludeme_sim::core::PlayerId;
    ///
    /// let ids: Vec<_> = PlayerId::all(3).map(|p| p.0).collect();
    /// assert_eq!(ids, [1, 2, 3]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (1..=player_count as u8).map(PlayerId)
    }

    /// Successor in cyclic turn order.
    #[must_use]
    pub fn next_in_order(self, player_count: usize) -> PlayerId {
        match self.index() {
            i if i >= player_count => PlayerId(1),
            _ => PlayerId(self.0 + 1),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("Neutral"),
            id => write!(f, "P{id}"),
        }
    }
}

/// One value per real player, indexed by [`PlayerId`].
///
/// Indexing with `NONE` or an id past the player count panics.
///
/// ```
/// use ludeme_sim::core::{PlayerId, PlayerMap};
///
/// let mut scores = PlayerMap::with_value(2, 0i64);
/// scores[PlayerId::new(2)] += 7;
/// assert_eq!(scores[PlayerId::new(1)], 0);
/// assert_eq!(scores[PlayerId::new(2)], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    slots: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build a table by calling `init` for each player in order.
    pub fn new(player_count: usize, init: impl Fn(PlayerId) -> T) -> Self {
        assert!(
            (1..=MAX_PLAYERS).contains(&player_count),
            "player count {player_count} outside 1..={MAX_PLAYERS}"
        );
        Self {
            slots: PlayerId::all(player_count).map(init).collect(),
        }
    }

    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, player: PlayerId) -> usize {
        match player.index() {
            i if i >= 1 && i <= self.slots.len() => i - 1,
            _ => panic!(
                "{player} is not a player of a {}-player game",
                self.slots.len()
            ),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::all(self.slots.len()).zip(self.slots.iter())
    }

    /// Exchange two players' entries.
    pub fn swap(&mut self, a: PlayerId, b: PlayerId) {
        let (a, b) = (self.slot(a), self.slot(b));
        self.slots.swap(a, b);
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &T {
        &self.slots[self.slot(player)]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut T {
        let slot = self.slot(player);
        &mut self.slots[slot]
    }
}
