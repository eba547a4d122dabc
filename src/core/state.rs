//! Mutable game state with an incrementally maintained Zobrist hash.
//!
//! ## Layout
//!
//! Per-site data lives in chunk ledgers (owner, piece type, local state,
//! rotation, value), optional per-site stacks and optional per-player hidden
//! bitsets. Per-player data holds score, amount, team, phase and the
//! player-to-role order used by the swap rule.
//!
//! ## Hashing
//!
//! `state_hash` covers every ledger plus scores and amounts, and is kept up
//! to date by the setters in this module. There is no way to reach the raw
//! bits without going through a hashed setter.
//!
//! `full_hash` additionally folds in the mover, each player's phase and the
//! player order. Positional repetition uses the former, situational
//! repetition the latter.
//!
//! ```
//! use std::sync::Arc;
//! use ludeme_sim::core::{GameConfig, PlayerId, State};
//! use ludeme_sim::hash::ZobristTables;
//!
//! let config = GameConfig::new("Doc", 2);
//! let tables = Arc::new(ZobristTables::generate(&config, 9, 1));
//! let mut state = State::new(tables);
//!
//! state.set_who(4, PlayerId::new(1));
//! assert_ne!(state.state_hash(), 0);
//! assert_eq!(state.state_hash(), state.recompute_hash());
//!
//! state.clear_site(4);
//! assert_eq!(state.state_hash(), 0);
//! ```

use std::sync::Arc;

use crate::hash::{
    HashSink, HashedBitSet, HashedChunkSet, HashedStack, Level, StateHash, ZobristTables,
    SCORE_TERMS,
};

use super::player::{PlayerId, PlayerMap};

/// Complete mutable state of one game instance.
#[derive(Clone, Debug)]
pub struct State {
    tables: Arc<ZobristTables>,
    hash: StateHash,

    // === Per-site ledgers ===
    who: HashedChunkSet,
    what: HashedChunkSet,
    site_state: HashedChunkSet,
    rotation: HashedChunkSet,
    value: HashedChunkSet,
    stacks: Option<Vec<HashedStack>>,
    hidden: Option<PlayerMap<HashedBitSet>>,

    // === Per-player data ===
    scores: PlayerMap<i64>,
    amounts: PlayerMap<i64>,
    teams: PlayerMap<u8>,
    phases: PlayerMap<usize>,
    order: PlayerMap<PlayerId>,
    stalemated: PlayerMap<bool>,
    active: PlayerMap<bool>,

    // === Turn ===
    mover: PlayerId,
    next: PlayerId,
    prev: PlayerId,

    // === Auxiliary ===
    move_counter: usize,
    var: i64,
    stored_state: Option<u64>,
}

impl State {
    /// Create an empty state over the given term tables.
    ///
    /// Player 1 moves first.
    #[must_use]
    pub fn new(tables: Arc<ZobristTables>) -> Self {
        let players = tables.player_count;
        let stacks = tables.stack.as_ref().map(|terms| {
            (0..tables.num_sites)
                .map(|site| HashedStack::new(site, Arc::clone(terms)))
                .collect()
        });
        let hidden = (!tables.hidden.is_empty()).then(|| {
            PlayerMap::new(players, |p| {
                HashedBitSet::new(Arc::clone(&tables.hidden[p.index() - 1]))
            })
        });
        let first = PlayerId::new(1);

        Self {
            who: HashedChunkSet::new(tables.who.clone()),
            what: HashedChunkSet::new(tables.what.clone()),
            site_state: HashedChunkSet::new(tables.site_state.clone()),
            rotation: HashedChunkSet::new(tables.rotation.clone()),
            value: HashedChunkSet::new(tables.value.clone()),
            stacks,
            hidden,
            scores: PlayerMap::with_value(players, 0),
            amounts: PlayerMap::with_value(players, 0),
            teams: PlayerMap::new(players, |p| p.0),
            phases: PlayerMap::with_value(players, 0),
            order: PlayerMap::new(players, |p| p),
            stalemated: PlayerMap::with_value(players, false),
            active: PlayerMap::with_value(players, true),
            mover: first,
            next: first.next_in_order(players),
            prev: PlayerId::new(players as u8),
            move_counter: 0,
            var: 0,
            stored_state: None,
            hash: StateHash::default(),
            tables,
        }
    }

    // === Hashes ===

    /// Running hash of board contents, scores and amounts.
    #[inline]
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.hash.value()
    }

    /// `state_hash` plus mover, phases and player order.
    #[must_use]
    pub fn full_hash(&self) -> u64 {
        let t = &self.tables;
        let mut hash = self.state_hash() ^ t.mover.term(0, self.mover.0 as u32);
        for (player, phase) in self.phases.iter() {
            hash ^= t.phase.term(player.index(), *phase as u32);
        }
        for (player, role) in self.order.iter() {
            hash ^= t.order.term(player.index(), role.0 as u32);
        }
        hash
    }

    /// Recompute `state_hash` from scratch, ignoring every cached value.
    #[must_use]
    pub fn recompute_hash(&self) -> u64 {
        let identity: Vec<usize> = (0..self.num_sites()).collect();
        self.hash_after_remap(Some(&identity), None)
    }

    /// What `state_hash` would be with sites permuted by `site_remap` and
    /// players by `player_remap` (indexed by player id, entry 0 for the
    /// neutral player). Nothing is mutated.
    ///
    /// Hidden-information bitsets follow the site permutation only.
    #[must_use]
    pub fn hash_after_remap(
        &self,
        site_remap: Option<&[usize]>,
        player_remap: Option<&[u32]>,
    ) -> u64 {
        let mut hash = self.who.calculate_hash_after_remap(site_remap, player_remap)
            ^ self.what.calculate_hash_after_remap(site_remap, None)
            ^ self.site_state.calculate_hash_after_remap(site_remap, None)
            ^ self.rotation.calculate_hash_after_remap(site_remap, None)
            ^ self.value.calculate_hash_after_remap(site_remap, None);

        if let Some(stacks) = &self.stacks {
            for stack in stacks {
                hash ^= stack.calculate_hash_after_remap(site_remap, player_remap);
            }
        }
        if let Some(hidden) = &self.hidden {
            for (_, bits) in hidden.iter() {
                hash ^= bits.calculate_hash_after_remap(site_remap);
            }
        }

        let remap_player = |p: PlayerId| match player_remap {
            Some(remap) => remap[p.index()] as usize,
            None => p.index(),
        };
        for (player, score) in self.scores.iter() {
            hash ^= self.tables.score.term(remap_player(player), score_slot(*score));
        }
        for (player, amount) in self.amounts.iter() {
            hash ^= self.tables.amount.term(remap_player(player), score_slot(*amount));
        }
        hash
    }

    /// Smallest hash over the identity and every given site symmetry.
    #[must_use]
    pub fn canonical_hash(&self, symmetries: &[Vec<usize>]) -> u64 {
        symmetries
            .iter()
            .map(|sym| self.hash_after_remap(Some(sym), None))
            .fold(self.state_hash(), u64::min)
    }

    // === Sizes ===

    /// Number of sites.
    #[must_use]
    pub fn num_sites(&self) -> usize {
        self.tables.num_sites
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.tables.player_count
    }

    /// Shared term tables.
    #[must_use]
    pub fn tables(&self) -> &Arc<ZobristTables> {
        &self.tables
    }

    // === Sites ===

    /// Owner of the piece at `site` (`PlayerId::NONE` when empty).
    #[must_use]
    pub fn who(&self, site: usize) -> PlayerId {
        PlayerId::new(self.who.get(site) as u8)
    }

    /// Piece type at `site` (0 when empty).
    #[must_use]
    pub fn what(&self, site: usize) -> u32 {
        self.what.get(site)
    }

    /// Local state at `site`.
    #[must_use]
    pub fn site_state(&self, site: usize) -> u32 {
        self.site_state.get(site)
    }

    /// Rotation at `site`.
    #[must_use]
    pub fn rotation(&self, site: usize) -> u32 {
        self.rotation.get(site)
    }

    /// Value at `site`.
    #[must_use]
    pub fn value(&self, site: usize) -> u32 {
        self.value.get(site)
    }

    /// True when no piece occupies `site`.
    #[must_use]
    pub fn is_empty(&self, site: usize) -> bool {
        self.what.get(site) == 0 && self.stack(site).map_or(true, HashedStack::is_empty)
    }

    /// Sites with no piece, in ascending order.
    pub fn empty_sites(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_sites()).filter(|site| self.is_empty(*site))
    }

    /// True when every site is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.empty_sites().next().is_none()
    }

    pub fn set_who(&mut self, site: usize, who: PlayerId) {
        self.who.set_chunk(&mut self.hash, site, who.0 as u32);
    }

    pub fn set_what(&mut self, site: usize, what: u32) {
        self.what.set_chunk(&mut self.hash, site, what);
    }

    pub fn set_site_state(&mut self, site: usize, state: u32) {
        self.site_state.set_chunk(&mut self.hash, site, state);
    }

    pub fn set_rotation(&mut self, site: usize, rotation: u32) {
        self.rotation.set_chunk(&mut self.hash, site, rotation);
    }

    pub fn set_value(&mut self, site: usize, value: u32) {
        self.value.set_chunk(&mut self.hash, site, value);
    }

    /// Reset every per-site field of `site`, including its stack.
    pub fn clear_site(&mut self, site: usize) {
        self.who.clear_chunk(&mut self.hash, site);
        self.what.clear_chunk(&mut self.hash, site);
        self.site_state.clear_chunk(&mut self.hash, site);
        self.rotation.clear_chunk(&mut self.hash, site);
        self.value.clear_chunk(&mut self.hash, site);
        if let Some(stacks) = &mut self.stacks {
            stacks[site].clear(&mut self.hash);
        }
    }

    /// Per-site fields of `site` as a stack level.
    #[must_use]
    pub fn level_at(&self, site: usize) -> Level {
        Level {
            who: self.who.get(site),
            what: self.what.get(site),
            state: self.site_state.get(site),
            rotation: self.rotation.get(site),
            value: self.value.get(site),
        }
    }

    fn write_level(&mut self, site: usize, level: Level) {
        self.who.set_chunk(&mut self.hash, site, level.who);
        self.what.set_chunk(&mut self.hash, site, level.what);
        self.site_state.set_chunk(&mut self.hash, site, level.state);
        self.rotation.set_chunk(&mut self.hash, site, level.rotation);
        self.value.set_chunk(&mut self.hash, site, level.value);
    }

    // === Stacks ===

    /// True when sites hold stacks.
    #[must_use]
    pub fn is_stacking(&self) -> bool {
        self.stacks.is_some()
    }

    /// Stack at `site`, if stacking is enabled.
    #[must_use]
    pub fn stack(&self, site: usize) -> Option<&HashedStack> {
        self.stacks.as_ref().map(|stacks| &stacks[site])
    }

    /// Place a piece at `site`.
    ///
    /// With stacking the piece is pushed and the per-site fields mirror the
    /// new top; otherwise it overwrites the site.
    pub fn place(&mut self, site: usize, level: Level) {
        if let Some(stacks) = &mut self.stacks {
            stacks[site].push(&mut self.hash, level);
        }
        self.write_level(site, level);
    }

    /// Remove the top piece at `site` and return it.
    pub fn lift(&mut self, site: usize) -> Option<Level> {
        let Some(stacks) = &mut self.stacks else {
            let level = self.level_at(site);
            self.write_level(site, Level::default());
            return (level.what != 0).then_some(level);
        };
        let lifted = stacks[site].pop(&mut self.hash)?;
        let top = stacks[site].top().copied().unwrap_or_default();
        self.write_level(site, top);
        Some(lifted)
    }

    // === Hidden information ===

    /// True when `site` is hidden from `player`.
    #[must_use]
    pub fn is_hidden(&self, player: PlayerId, site: usize) -> bool {
        self.hidden.as_ref().is_some_and(|h| h[player].get(site))
    }

    /// Hide or reveal `site` for `player`. No-op without hidden information.
    pub fn set_hidden(&mut self, player: PlayerId, site: usize, hidden: bool) {
        if let Some(bits) = &mut self.hidden {
            bits[player].set_bit(&mut self.hash, site, hidden);
        }
    }

    // === Per-player data ===

    #[must_use]
    pub fn score(&self, player: PlayerId) -> i64 {
        self.scores[player]
    }

    pub fn set_score(&mut self, player: PlayerId, score: i64) {
        let old = std::mem::replace(&mut self.scores[player], score);
        let table = &self.tables.score;
        self.hash
            .update_hash(table.term(player.index(), score_slot(old)) ^ table.term(player.index(), score_slot(score)));
    }

    #[must_use]
    pub fn amount(&self, player: PlayerId) -> i64 {
        self.amounts[player]
    }

    pub fn set_amount(&mut self, player: PlayerId, amount: i64) {
        let old = std::mem::replace(&mut self.amounts[player], amount);
        let table = &self.tables.amount;
        self.hash
            .update_hash(table.term(player.index(), score_slot(old)) ^ table.term(player.index(), score_slot(amount)));
    }

    #[must_use]
    pub fn team(&self, player: PlayerId) -> u8 {
        self.teams[player]
    }

    pub fn set_team(&mut self, player: PlayerId, team: u8) {
        self.teams[player] = team;
    }

    /// Current phase of `player`.
    #[must_use]
    pub fn phase(&self, player: PlayerId) -> usize {
        self.phases[player]
    }

    pub fn set_phase(&mut self, player: PlayerId, phase: usize) {
        self.phases[player] = phase;
    }

    /// Role (piece colour) currently controlled by `player`.
    #[must_use]
    pub fn role_of(&self, player: PlayerId) -> PlayerId {
        self.order[player]
    }

    /// Exchange the roles of two players.
    pub fn swap_players(&mut self, a: PlayerId, b: PlayerId) {
        self.order.swap(a, b);
    }

    #[must_use]
    pub fn is_stalemated(&self, player: PlayerId) -> bool {
        self.stalemated[player]
    }

    pub fn set_stalemated(&mut self, player: PlayerId, stalemated: bool) {
        self.stalemated[player] = stalemated;
    }

    #[must_use]
    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active[player]
    }

    pub fn set_active(&mut self, player: PlayerId, active: bool) {
        self.active[player] = active;
    }

    /// Number of players still taking turns.
    #[must_use]
    pub fn num_active(&self) -> usize {
        self.active.iter().filter(|(_, a)| **a).count()
    }

    // === Turn ===

    #[must_use]
    pub fn mover(&self) -> PlayerId {
        self.mover
    }

    #[must_use]
    pub fn next(&self) -> PlayerId {
        self.next
    }

    #[must_use]
    pub fn prev(&self) -> PlayerId {
        self.prev
    }

    pub fn set_mover(&mut self, player: PlayerId) {
        self.mover = player;
    }

    pub fn set_next(&mut self, player: PlayerId) {
        self.next = player;
    }

    pub fn set_prev(&mut self, player: PlayerId) {
        self.prev = player;
    }

    /// The first active player after `player` in cyclic order.
    #[must_use]
    pub fn next_active_after(&self, player: PlayerId) -> PlayerId {
        let count = self.player_count();
        let mut candidate = player.next_in_order(count);
        for _ in 0..count {
            if self.active[candidate] {
                return candidate;
            }
            candidate = candidate.next_in_order(count);
        }
        player
    }

    // === Auxiliary ===

    #[must_use]
    pub fn move_counter(&self) -> usize {
        self.move_counter
    }

    pub fn increment_counter(&mut self) {
        self.move_counter += 1;
    }

    #[must_use]
    pub fn var(&self) -> i64 {
        self.var
    }

    pub fn set_var(&mut self, var: i64) {
        self.var = var;
    }

    /// Hash remembered by the last store-state action.
    #[must_use]
    pub fn stored_state(&self) -> Option<u64> {
        self.stored_state
    }

    /// Remember the current `state_hash`.
    pub fn store_state(&mut self) {
        self.stored_state = Some(self.state_hash());
    }
}

/// Column of the score/amount tables holding `value`.
fn score_slot(value: i64) -> u32 {
    value.rem_euclid(SCORE_TERMS as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;

    fn state(config: &GameConfig, sites: usize) -> State {
        State::new(Arc::new(ZobristTables::generate(config, sites, 2)))
    }

    #[test]
    fn test_new_state_is_empty() {
        let s = state(&GameConfig::new("T", 2), 9);

        assert_eq!(s.state_hash(), 0);
        assert_eq!(s.empty_sites().count(), 9);
        assert_eq!(s.mover(), PlayerId::new(1));
        assert_eq!(s.next(), PlayerId::new(2));
        assert_eq!(s.prev(), PlayerId::new(2));
    }

    #[test]
    fn test_place_and_lift() {
        let mut s = state(&GameConfig::new("T", 2), 9);
        s.place(3, Level::piece(2, 1));

        assert_eq!(s.who(3), PlayerId::new(2));
        assert!(!s.is_empty(3));
        assert_eq!(s.state_hash(), s.recompute_hash());

        assert_eq!(s.lift(3), Some(Level::piece(2, 1)));
        assert_eq!(s.lift(3), None);
        assert_eq!(s.state_hash(), 0);
    }

    #[test]
    fn test_stacking_place_mirrors_top() {
        let config = GameConfig::new("T", 2).with_stacking(4);
        let mut s = state(&config, 4);

        s.place(0, Level::piece(1, 1));
        s.place(0, Level::piece(2, 1));
        assert_eq!(s.who(0), PlayerId::new(2));
        assert_eq!(s.stack(0).map(HashedStack::size), Some(2));

        s.lift(0);
        assert_eq!(s.who(0), PlayerId::new(1));
        assert_eq!(s.state_hash(), s.recompute_hash());

        s.clear_site(0);
        assert!(s.is_empty(0));
        assert_eq!(s.state_hash(), 0);
    }

    #[test]
    fn test_scores_are_hashed() {
        let mut s = state(&GameConfig::new("T", 2), 4);
        s.set_score(PlayerId::new(1), 5);
        assert_ne!(s.state_hash(), 0);
        s.set_amount(PlayerId::new(2), -3);
        assert_eq!(s.state_hash(), s.recompute_hash());

        s.set_score(PlayerId::new(1), 0);
        s.set_amount(PlayerId::new(2), 0);
        assert_eq!(s.state_hash(), 0);
    }

    #[test]
    fn test_hidden_bits_are_hashed() {
        let config = GameConfig::new("T", 2).with_hidden_info();
        let mut s = state(&config, 4);
        s.set_hidden(PlayerId::new(2), 1, true);

        assert!(s.is_hidden(PlayerId::new(2), 1));
        assert!(!s.is_hidden(PlayerId::new(1), 1));
        assert_eq!(s.state_hash(), s.recompute_hash());
    }

    #[test]
    fn test_full_hash_tracks_mover_and_phase() {
        let mut s = state(&GameConfig::new("T", 2), 4);
        let base = s.full_hash();

        s.set_mover(PlayerId::new(2));
        assert_ne!(s.full_hash(), base);
        assert_eq!(s.state_hash(), 0);

        s.set_mover(PlayerId::new(1));
        s.set_phase(PlayerId::new(1), 1);
        assert_ne!(s.full_hash(), base);
    }

    #[test]
    fn test_swap_players_changes_roles() {
        let mut s = state(&GameConfig::new("T", 2), 4);
        let before = s.full_hash();
        s.swap_players(PlayerId::new(1), PlayerId::new(2));

        assert_eq!(s.role_of(PlayerId::new(1)), PlayerId::new(2));
        assert_ne!(s.full_hash(), before);
    }

    #[test]
    fn test_canonical_hash_is_symmetric() {
        let mut a = state(&GameConfig::new("T", 2), 4);
        let mut b = state(&GameConfig::new("T", 2), 4);
        a.place(0, Level::piece(1, 1));
        b.place(3, Level::piece(1, 1));

        let mirror = vec![vec![3, 2, 1, 0]];
        assert_ne!(a.state_hash(), b.state_hash());
        assert_eq!(a.canonical_hash(&mirror), b.canonical_hash(&mirror));
    }

    #[test]
    fn test_next_active_skips_inactive() {
        let mut s = state(&GameConfig::new("T", 3), 4);
        s.set_active(PlayerId::new(2), false);

        assert_eq!(s.next_active_after(PlayerId::new(1)), PlayerId::new(3));
        assert_eq!(s.num_active(), 2);
    }

    #[test]
    fn test_store_state() {
        let mut s = state(&GameConfig::new("T", 2), 4);
        assert_eq!(s.stored_state(), None);
        s.place(1, Level::piece(1, 1));
        s.store_state();
        assert_eq!(s.stored_state(), Some(s.state_hash()));
    }
}
