//! Stack ledger: per-level terms plus a size term for one site.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::GameConfig;

use super::{remap_site, remap_value, HashSink, TermTable, ZobristGenerator};

/// One piece in a stack.
///
/// All-zero is the empty level and contributes nothing to the hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    pub who: u32,
    pub what: u32,
    pub state: u32,
    pub rotation: u32,
    pub value: u32,
}

impl Level {
    /// A piece with an owner and a type, no local data.
    #[must_use]
    pub const fn piece(who: u32, what: u32) -> Self {
        Self {
            who,
            what,
            state: 0,
            rotation: 0,
            value: 0,
        }
    }
}

/// Term tables shared by every stack of a game.
///
/// Level terms are indexed by `site * height + level`, where levels above
/// `height` wrap around.
#[derive(Debug)]
pub struct StackTerms {
    pub height: usize,
    pub who: TermTable,
    pub what: TermTable,
    pub state: TermTable,
    pub rotation: TermTable,
    pub value: TermTable,
    pub size: TermTable,
}

impl StackTerms {
    pub(crate) fn generate(gen: &mut ZobristGenerator, config: &GameConfig, num_sites: usize) -> Self {
        let height = config.max_stack_height;
        let slots = num_sites * height;
        Self {
            height,
            who: gen.table(slots, config.player_count + 1),
            what: gen.table(slots, config.piece_types as usize + 1),
            state: gen.table(slots, config.max_site_state as usize + 1),
            rotation: gen.table(slots, config.rotations as usize),
            value: gen.table(slots, config.max_site_value as usize + 1),
            size: gen.table(num_sites, height + 1),
        }
    }

    fn level_term(&self, site: usize, index: usize, level: &Level, who_remap: Option<&[u32]>) -> u64 {
        let slot = site * self.height + index % self.height;
        self.who.term(slot, remap_value(who_remap, level.who))
            ^ self.what.term(slot, level.what)
            ^ self.state.term(slot, level.state)
            ^ self.rotation.term(slot, level.rotation)
            ^ self.value.term(slot, level.value)
    }

    fn size_term(&self, site: usize, size: usize) -> u64 {
        self.size.term(site, (size % (self.height + 1)) as u32)
    }
}

/// Ordered stack of pieces at one site.
///
/// Keeps a local shadow hash XORed by the same deltas it sends to the
/// owning state, so its contribution is available without a rescan.
#[derive(Clone, Debug)]
pub struct HashedStack {
    site: usize,
    levels: Vec<Level>,
    terms: Arc<StackTerms>,
    local: u64,
}

impl HashedStack {
    /// Create an empty stack for `site`.
    #[must_use]
    pub fn new(site: usize, terms: Arc<StackTerms>) -> Self {
        Self {
            site,
            levels: Vec::new(),
            terms,
            local: 0,
        }
    }

    fn update(&mut self, sink: &mut impl HashSink, delta: u64) {
        self.local ^= delta;
        sink.update_hash(delta);
    }

    /// Site this stack belongs to.
    #[must_use]
    pub fn site(&self) -> usize {
        self.site
    }

    /// Number of levels.
    #[must_use]
    pub fn size(&self) -> usize {
        self.levels.len()
    }

    /// True when the stack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Topmost level.
    #[must_use]
    pub fn top(&self) -> Option<&Level> {
        self.levels.last()
    }

    /// Level at `index` (0 is the bottom).
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Local shadow hash.
    #[must_use]
    pub fn local_hash(&self) -> u64 {
        self.local
    }

    /// Push a level on top.
    pub fn push(&mut self, sink: &mut impl HashSink, level: Level) {
        let size = self.levels.len();
        let delta = self.terms.level_term(self.site, size, &level, None)
            ^ self.terms.size_term(self.site, size)
            ^ self.terms.size_term(self.site, size + 1);
        self.update(sink, delta);
        self.levels.push(level);
    }

    /// Remove and return the top level.
    pub fn pop(&mut self, sink: &mut impl HashSink) -> Option<Level> {
        let level = self.levels.pop()?;
        let size = self.levels.len();
        let delta = self.terms.level_term(self.site, size, &level, None)
            ^ self.terms.size_term(self.site, size + 1)
            ^ self.terms.size_term(self.site, size);
        self.update(sink, delta);
        Some(level)
    }

    /// Replace the level at `index`.
    pub fn update_level(&mut self, sink: &mut impl HashSink, index: usize, level: Level) {
        assert!(
            index < self.levels.len(),
            "level {index} out of range for a stack of {}",
            self.levels.len()
        );
        let old = self.levels[index];
        let delta = self.terms.level_term(self.site, index, &old, None)
            ^ self.terms.level_term(self.site, index, &level, None);
        self.update(sink, delta);
        self.levels[index] = level;
    }

    /// Empty the stack. O(1) in hash work thanks to the shadow hash.
    pub fn clear(&mut self, sink: &mut impl HashSink) {
        let local = self.local;
        self.update(sink, local);
        self.levels.clear();
    }

    /// Copy `source` into this stack. O(n) in its levels.
    pub fn set_to(&mut self, sink: &mut impl HashSink, source: &HashedStack) {
        assert_eq!(self.site, source.site, "stacks belong to different sites");
        let delta = self.local ^ source.local;
        self.update(sink, delta);
        self.levels.clone_from(&source.levels);
    }

    /// Contribution under a site permutation and an owner permutation.
    ///
    /// With no remaps this is the shadow hash.
    #[must_use]
    pub fn calculate_hash_after_remap(
        &self,
        site_remap: Option<&[usize]>,
        value_remap: Option<&[u32]>,
    ) -> u64 {
        if site_remap.is_none() && value_remap.is_none() {
            return self.local;
        }
        let site = remap_site(site_remap, self.site);
        self.levels
            .iter()
            .enumerate()
            .fold(self.terms.size_term(site, self.levels.len()), |hash, (i, level)| {
                hash ^ self.terms.level_term(site, i, level, value_remap)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::StateHash;

    fn terms(sites: usize) -> Arc<StackTerms> {
        let config = GameConfig::new("Stacks", 2)
            .with_piece_types(3)
            .with_stacking(4);
        let mut gen = ZobristGenerator::new(21);
        Arc::new(StackTerms::generate(&mut gen, &config, sites))
    }

    fn from_scratch(stack: &HashedStack) -> u64 {
        let terms = &stack.terms;
        stack
            .levels
            .iter()
            .enumerate()
            .fold(terms.size_term(stack.site, stack.size()), |h, (i, l)| {
                h ^ terms.level_term(stack.site, i, l, None)
            })
    }

    #[test]
    fn test_push_pop_restores_hash() {
        let mut hash = StateHash::default();
        let mut stack = HashedStack::new(1, terms(4));

        stack.push(&mut hash, Level::piece(1, 2));
        stack.push(&mut hash, Level::piece(2, 3));
        assert_eq!(stack.size(), 2);
        assert_eq!(stack.top(), Some(&Level::piece(2, 3)));
        assert_eq!(hash.value(), stack.local_hash());
        assert_eq!(hash.value(), from_scratch(&stack));

        assert_eq!(stack.pop(&mut hash), Some(Level::piece(2, 3)));
        assert_eq!(stack.pop(&mut hash), Some(Level::piece(1, 2)));
        assert_eq!(stack.pop(&mut hash), None);
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_order_matters() {
        let t = terms(4);
        let (mut ha, mut hb) = (StateHash::default(), StateHash::default());
        let mut a = HashedStack::new(0, t.clone());
        let mut b = HashedStack::new(0, t);

        a.push(&mut ha, Level::piece(1, 1));
        a.push(&mut ha, Level::piece(2, 2));
        b.push(&mut hb, Level::piece(2, 2));
        b.push(&mut hb, Level::piece(1, 1));

        assert_ne!(ha.value(), hb.value());
    }

    #[test]
    fn test_update_level_and_clear() {
        let mut hash = StateHash::default();
        let mut stack = HashedStack::new(2, terms(4));
        stack.push(&mut hash, Level::piece(1, 1));
        stack.push(&mut hash, Level::piece(1, 2));

        stack.update_level(&mut hash, 0, Level { value: 1, ..Level::piece(2, 1) });
        assert_eq!(hash.value(), from_scratch(&stack));

        stack.clear(&mut hash);
        assert!(stack.is_empty());
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_deep_stack_wraps_terms() {
        let mut hash = StateHash::default();
        let mut stack = HashedStack::new(0, terms(2));
        for _ in 0..9 {
            stack.push(&mut hash, Level::piece(1, 1));
        }
        assert_eq!(hash.value(), from_scratch(&stack));
    }

    #[test]
    fn test_set_to_copies_contribution() {
        let t = terms(3);
        let (mut ha, mut hb) = (StateHash::default(), StateHash::default());
        let mut a = HashedStack::new(1, t.clone());
        let mut b = HashedStack::new(1, t);
        a.push(&mut ha, Level::piece(1, 3));
        b.push(&mut hb, Level::piece(2, 1));
        b.push(&mut hb, Level::piece(2, 2));

        a.set_to(&mut ha, &b);
        assert_eq!(ha.value(), hb.value());
        assert_eq!(a.size(), 2);
    }

    #[test]
    fn test_remap_identity_and_owner_swap() {
        let t = terms(3);
        let mut hash = StateHash::default();
        let mut stack = HashedStack::new(0, t.clone());
        stack.push(&mut hash, Level::piece(1, 2));

        let sites = [0, 1, 2];
        let owners = [0, 1, 2];
        assert_eq!(
            stack.calculate_hash_after_remap(Some(&sites), Some(&owners)),
            hash.value()
        );

        let mut moved_hash = StateHash::default();
        let mut moved = HashedStack::new(2, t);
        moved.push(&mut moved_hash, Level::piece(2, 2));
        assert_eq!(
            stack.calculate_hash_after_remap(Some(&[2, 1, 0]), Some(&[0, 2, 1])),
            moved_hash.value()
        );
    }
}
