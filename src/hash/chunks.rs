//! Packed fixed-width chunks and their hashed ledger.

use super::{remap_site, remap_value, HashSink, TermTable};

/// Small unsigned values packed into `u64` words.
///
/// Chunk width is the smallest power of two (1 to 32 bits) that holds the
/// largest value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkSet {
    chunk_bits: u32,
    len: usize,
    words: Vec<u64>,
}

impl ChunkSet {
    /// Create `len` zeroed chunks able to hold `max_value`.
    #[must_use]
    pub fn new(len: usize, max_value: u32) -> Self {
        let needed = (u32::BITS - max_value.leading_zeros()).max(1);
        let chunk_bits = needed.next_power_of_two().min(32);
        let per_word = (64 / chunk_bits) as usize;
        Self {
            chunk_bits,
            len,
            words: vec![0; len.div_ceil(per_word)],
        }
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Width of one chunk in bits.
    #[must_use]
    pub fn chunk_bits(&self) -> u32 {
        self.chunk_bits
    }

    #[inline]
    fn locate(&self, pos: usize) -> (usize, u32) {
        assert!(pos < self.len, "chunk {pos} out of range ({} chunks)", self.len);
        let per_word = (64 / self.chunk_bits) as usize;
        (pos / per_word, (pos % per_word) as u32 * self.chunk_bits)
    }

    #[inline]
    fn mask(&self) -> u64 {
        (1u64 << self.chunk_bits) - 1
    }

    /// Value of the chunk at `pos`.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> u32 {
        let (word, shift) = self.locate(pos);
        ((self.words[word] >> shift) & self.mask()) as u32
    }

    /// Overwrite the chunk at `pos`.
    #[inline]
    pub fn set(&mut self, pos: usize, value: u32) {
        let mask = self.mask();
        assert!(
            u64::from(value) <= mask,
            "value {value} does not fit a {}-bit chunk",
            self.chunk_bits
        );
        let (word, shift) = self.locate(pos);
        self.words[word] = (self.words[word] & !(mask << shift)) | (u64::from(value) << shift);
    }

    /// Zero every chunk.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Iterate over non-zero chunks as `(pos, value)`.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        (0..self.len)
            .map(|pos| (pos, self.get(pos)))
            .filter(|(_, v)| *v != 0)
    }
}

/// Chunk ledger: one term per (position, value).
#[derive(Clone, Debug)]
pub struct HashedChunkSet {
    chunks: ChunkSet,
    terms: TermTable,
}

impl HashedChunkSet {
    /// Create an all-zero ledger over the table's positions.
    #[must_use]
    pub fn new(terms: TermTable) -> Self {
        let max_value = (terms.values() - 1) as u32;
        Self {
            chunks: ChunkSet::new(terms.positions(), max_value),
            terms,
        }
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the ledger has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Value at `pos`.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> u32 {
        self.chunks.get(pos)
    }

    /// Underlying packed chunks.
    #[must_use]
    pub fn chunks(&self) -> &ChunkSet {
        &self.chunks
    }

    /// Set the value at `pos`, folding the term delta into `sink`. O(1).
    #[inline]
    pub fn set_chunk(&mut self, sink: &mut impl HashSink, pos: usize, value: u32) {
        let old = self.chunks.get(pos);
        if old == value {
            return;
        }
        sink.update_hash(self.terms.term(pos, old) ^ self.terms.term(pos, value));
        self.chunks.set(pos, value);
    }

    /// Reset the value at `pos` to 0. O(1).
    #[inline]
    pub fn clear_chunk(&mut self, sink: &mut impl HashSink, pos: usize) {
        self.set_chunk(sink, pos, 0);
    }

    /// Reset every position. O(n); keep out of hot loops.
    pub fn clear(&mut self, sink: &mut impl HashSink) {
        sink.update_hash(self.contribution());
        self.chunks.clear();
    }

    /// Copy `source` into this ledger. O(n); keep out of hot loops.
    pub fn set_to(&mut self, sink: &mut impl HashSink, source: &HashedChunkSet) {
        assert_eq!(self.len(), source.len(), "chunk ledgers differ in size");
        sink.update_hash(self.contribution() ^ source.contribution());
        self.chunks = source.chunks.clone();
    }

    /// XOR of every term currently on, recomputed from scratch.
    #[must_use]
    pub fn contribution(&self) -> u64 {
        self.calculate_hash_after_remap(None, None)
    }

    /// Contribution this ledger would have if content at position `p` moved
    /// to `site_remap[p]` and value `v` became `value_remap[v]`.
    ///
    /// Either remap may be absent. Nothing is mutated.
    #[must_use]
    pub fn calculate_hash_after_remap(
        &self,
        site_remap: Option<&[usize]>,
        value_remap: Option<&[u32]>,
    ) -> u64 {
        self.chunks.iter_nonzero().fold(0, |hash, (pos, value)| {
            let pos = remap_site(site_remap, pos);
            let value = remap_value(value_remap, value);
            hash ^ self.terms.term(pos, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{StateHash, ZobristGenerator};

    fn ledger(positions: usize, values: usize) -> HashedChunkSet {
        HashedChunkSet::new(ZobristGenerator::new(3).table(positions, values))
    }

    #[test]
    fn test_chunk_width_rounds_to_power_of_two() {
        assert_eq!(ChunkSet::new(10, 0).chunk_bits(), 1);
        assert_eq!(ChunkSet::new(10, 1).chunk_bits(), 1);
        assert_eq!(ChunkSet::new(10, 2).chunk_bits(), 2);
        assert_eq!(ChunkSet::new(10, 5).chunk_bits(), 4);
        assert_eq!(ChunkSet::new(10, 200).chunk_bits(), 8);
        assert_eq!(ChunkSet::new(10, 70_000).chunk_bits(), 32);
    }

    #[test]
    fn test_chunks_do_not_bleed() {
        let mut chunks = ChunkSet::new(40, 3);
        chunks.set(15, 3);
        chunks.set(16, 1);
        chunks.set(15, 2);

        assert_eq!(chunks.get(14), 0);
        assert_eq!(chunks.get(15), 2);
        assert_eq!(chunks.get(16), 1);
        assert_eq!(chunks.iter_nonzero().count(), 2);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_oversized_value_panics() {
        ChunkSet::new(4, 3).set(0, 4);
    }

    #[test]
    fn test_set_chunk_tracks_hash() {
        let mut hash = StateHash::default();
        let mut set = ledger(9, 3);

        set.set_chunk(&mut hash, 4, 1);
        assert_ne!(hash.value(), 0);
        assert_eq!(hash.value(), set.contribution());

        set.set_chunk(&mut hash, 4, 2);
        set.set_chunk(&mut hash, 0, 1);
        assert_eq!(hash.value(), set.contribution());

        set.clear_chunk(&mut hash, 4);
        set.clear_chunk(&mut hash, 0);
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_bulk_clear_and_set_to() {
        let mut hash = StateHash::default();
        let mut a = ledger(9, 3);
        let mut b = ledger(9, 3);
        let mut other = StateHash::default();

        a.set_chunk(&mut hash, 1, 2);
        b.set_chunk(&mut other, 7, 1);

        a.set_to(&mut hash, &b);
        assert_eq!(a.get(1), 0);
        assert_eq!(a.get(7), 1);
        assert_eq!(hash.value(), other.value());

        a.clear(&mut hash);
        assert_eq!(hash.value(), 0);
    }

    #[test]
    fn test_identity_remap_matches_contribution() {
        let mut hash = StateHash::default();
        let mut set = ledger(4, 3);
        set.set_chunk(&mut hash, 0, 1);
        set.set_chunk(&mut hash, 3, 2);

        let identity_sites = [0, 1, 2, 3];
        let identity_values = [0, 1, 2];
        assert_eq!(
            set.calculate_hash_after_remap(Some(&identity_sites), Some(&identity_values)),
            hash.value()
        );
    }

    #[test]
    fn test_remap_equals_permuted_ledger() {
        let mut hash = StateHash::default();
        let mut set = ledger(4, 3);
        set.set_chunk(&mut hash, 0, 1);
        set.set_chunk(&mut hash, 1, 2);

        // Content moves 0 -> 3, 1 -> 2 and values swap 1 <-> 2.
        let mut expected_hash = StateHash::default();
        let mut expected = ledger(4, 3);
        expected.set_chunk(&mut expected_hash, 3, 2);
        expected.set_chunk(&mut expected_hash, 2, 1);

        let sites = [3, 2, 1, 0];
        let values = [0, 2, 1];
        assert_eq!(
            set.calculate_hash_after_remap(Some(&sites), Some(&values)),
            expected_hash.value()
        );
        // Nothing moved in the original.
        assert_eq!(set.get(0), 1);
    }
}
