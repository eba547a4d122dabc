//! Bit ledger: one term per boolean flag.

use std::sync::Arc;

use super::{remap_site, HashSink};

/// Hashed bitset, used for per-player hidden-information flags.
#[derive(Clone, Debug)]
pub struct HashedBitSet {
    words: Vec<u64>,
    len: usize,
    terms: Arc<[u64]>,
}

impl HashedBitSet {
    /// Create an all-clear bitset with one flag per term.
    #[must_use]
    pub fn new(terms: Arc<[u64]>) -> Self {
        let len = terms.len();
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
            terms,
        }
    }

    /// Number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value of flag `pos`.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> bool {
        assert!(pos < self.len, "bit {pos} out of range ({} bits)", self.len);
        self.words[pos / 64] & (1 << (pos % 64)) != 0
    }

    /// Set flag `pos`, folding the term delta into `sink`. O(1).
    #[inline]
    pub fn set_bit(&mut self, sink: &mut impl HashSink, pos: usize, on: bool) {
        if self.get(pos) == on {
            return;
        }
        sink.update_hash(self.terms[pos]);
        self.words[pos / 64] ^= 1 << (pos % 64);
    }

    /// Clear every flag. O(n); keep out of hot loops.
    pub fn clear(&mut self, sink: &mut impl HashSink) {
        sink.update_hash(self.contribution());
        self.words.fill(0);
    }

    /// Copy `source` into this bitset. O(n); keep out of hot loops.
    pub fn set_to(&mut self, sink: &mut impl HashSink, source: &HashedBitSet) {
        assert_eq!(self.len, source.len, "bit ledgers differ in size");
        sink.update_hash(self.contribution() ^ source.contribution());
        self.words.clone_from(&source.words);
    }

    /// Positions of set flags.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|pos| self.get(*pos))
    }

    /// Number of set flags.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// XOR of the terms of every set flag.
    #[must_use]
    pub fn contribution(&self) -> u64 {
        self.calculate_hash_after_remap(None)
    }

    /// Contribution if the flag at `p` moved to `site_remap[p]`. Flags carry
    /// no value, so there is no value remap.
    #[must_use]
    pub fn calculate_hash_after_remap(&self, site_remap: Option<&[usize]>) -> u64 {
        self.iter_ones()
            .fold(0, |hash, pos| hash ^ self.terms[remap_site(site_remap, pos)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{StateHash, ZobristGenerator};

    fn bits(len: usize) -> HashedBitSet {
        HashedBitSet::new(ZobristGenerator::new(8).flags(len))
    }

    #[test]
    fn test_set_bit_is_idempotent() {
        let mut hash = StateHash::default();
        let mut set = bits(100);

        set.set_bit(&mut hash, 70, true);
        let once = hash.value();
        set.set_bit(&mut hash, 70, true);

        assert_eq!(hash.value(), once);
        assert!(set.get(70));
        assert_eq!(set.count_ones(), 1);

        set.set_bit(&mut hash, 70, false);
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_contribution_matches_hash() {
        let mut hash = StateHash::default();
        let mut set = bits(10);
        for pos in [1, 3, 9] {
            set.set_bit(&mut hash, pos, true);
        }
        assert_eq!(set.contribution(), hash.value());
        assert_eq!(set.iter_ones().collect::<Vec<_>>(), vec![1, 3, 9]);

        set.clear(&mut hash);
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_remap_moves_flags() {
        let mut hash = StateHash::default();
        let mut set = bits(3);
        set.set_bit(&mut hash, 0, true);

        let mut moved_hash = StateHash::default();
        let mut moved = bits(3);
        moved.set_bit(&mut moved_hash, 2, true);

        assert_eq!(set.calculate_hash_after_remap(Some(&[2, 1, 0])), moved_hash.value());
        assert_eq!(set.calculate_hash_after_remap(Some(&[0, 1, 2])), hash.value());
    }
}
