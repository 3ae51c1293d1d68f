//! Bit-indexed sets.
//!
//! [`BitIndexed`] is the interface the codecs read through. [`BitSet`] is the
//! word-packed implementation the decoders produce.

use std::fmt;

use crate::error::BitSetError;

/// Number of bits held by one storage block.
pub const BLOCK_BITS: usize = u64::BITS as usize;

/// A fixed-capacity collection of flags addressed by index in `[0, size)`.
///
/// Implementors only need the two find primitives to be efficient; every
/// traversal in this crate goes through [`find_first`](Self::find_first) and
/// [`find_next`](Self::find_next), so the cost of walking a set is bounded by
/// its set bits rather than its capacity.
pub trait BitIndexed {
    /// Total number of addressable indices.
    fn size(&self) -> usize;

    /// Returns true iff `index` is set. Out-of-range indices are never set.
    fn test(&self, index: usize) -> bool;

    /// Returns the lowest set index.
    fn find_first(&self) -> Option<usize>;

    /// Returns the lowest set index strictly greater than `after`.
    fn find_next(&self, after: usize) -> Option<usize>;

    /// Number of set indices.
    fn count_ones(&self) -> usize {
        self.ones().count()
    }

    /// Iterates the set indices in ascending order.
    fn ones(&self) -> Ones<'_, Self> {
        Ones {
            set: self,
            next: self.find_first(),
        }
    }
}

/// Ascending iterator over the set indices of a [`BitIndexed`].
pub struct Ones<'a, S: ?Sized> {
    set: &'a S,
    next: Option<usize>,
}

impl<S: BitIndexed + ?Sized> Iterator for Ones<'_, S> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.set.find_next(current);
        Some(current)
    }
}

/// Word-packed bit set with a capacity fixed at construction.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitSet {
    blocks: Box<[u64]>,
    size: usize,
    count: usize,
}

fn num_blocks(size: usize) -> usize {
    size.div_ceil(BLOCK_BITS)
}

impl BitSet {
    /// Creates an empty set addressing `[0, size)`.
    pub fn with_capacity(size: usize) -> BitSet {
        BitSet {
            blocks: vec![0u64; num_blocks(size)].into_boxed_slice(),
            size,
            count: 0,
        }
    }

    /// Creates a set of the given capacity with exactly `indices` set.
    ///
    /// Repeated indices are set once.
    pub fn from_indices<I>(size: usize, indices: I) -> Result<BitSet, BitSetError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = BitSet::with_capacity(size);
        for index in indices {
            if index >= size {
                return Err(BitSetError::IndexOutOfRange {
                    index,
                    capacity: size,
                });
            }
            set.insert(index);
        }
        Ok(set)
    }

    /// Number of addressable indices.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of set indices.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns true iff no index is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sets `index`, returning true if the set changed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.size, "index {index} out of range (capacity: {})", self.size);
        let block = &mut self.blocks[index / BLOCK_BITS];
        let mask = 1u64 << (index % BLOCK_BITS);
        let changed = *block & mask == 0;
        *block |= mask;
        self.count += usize::from(changed);
        changed
    }

    /// Clears `index`, returning true if the set changed.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        assert!(index < self.size, "index {index} out of range (capacity: {})", self.size);
        let block = &mut self.blocks[index / BLOCK_BITS];
        let mask = 1u64 << (index % BLOCK_BITS);
        let changed = *block & mask != 0;
        *block &= !mask;
        self.count -= usize::from(changed);
        changed
    }

    /// Clears every index, keeping the capacity.
    pub fn clear(&mut self) {
        self.blocks.iter_mut().for_each(|block| *block = 0);
        self.count = 0;
    }

    /// Iterates the set indices in ascending order.
    pub fn iter(&self) -> Ones<'_, BitSet> {
        self.ones()
    }

    /// First set index at or after `start`.
    fn find_from(&self, start: usize) -> Option<usize> {
        if start >= self.size {
            return None;
        }
        let mut block = start / BLOCK_BITS;
        // Bits past `size` in the last block are never set, so no upper mask is needed.
        let mut word = self.blocks[block] & (u64::MAX << (start % BLOCK_BITS));
        loop {
            if word != 0 {
                return Some(block * BLOCK_BITS + word.trailing_zeros() as usize);
            }
            block += 1;
            word = *self.blocks.get(block)?;
        }
    }
}

impl BitIndexed for BitSet {
    #[inline]
    fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn test(&self, index: usize) -> bool {
        index < self.size && self.blocks[index / BLOCK_BITS] & (1u64 << (index % BLOCK_BITS)) != 0
    }

    fn find_first(&self) -> Option<usize> {
        self.find_from(0)
    }

    fn find_next(&self, after: usize) -> Option<usize> {
        self.find_from(after.checked_add(1)?)
    }

    #[inline]
    fn count_ones(&self) -> usize {
        self.count
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSet")
            .field("size", &self.size)
            .field("ones", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Ones<'a, BitSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: BitIndexed + ?Sized> BitIndexed for &T {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn test(&self, index: usize) -> bool {
        (**self).test(index)
    }

    fn find_first(&self) -> Option<usize> {
        (**self).find_first()
    }

    fn find_next(&self, after: usize) -> Option<usize> {
        (**self).find_next(after)
    }

    fn count_ones(&self) -> usize {
        (**self).count_ones()
    }
}

/// Dense one-flag-per-index sets. Traversal is linear in the slice length.
impl BitIndexed for [bool] {
    fn size(&self) -> usize {
        self.len()
    }

    fn test(&self, index: usize) -> bool {
        self.get(index).copied().unwrap_or(false)
    }

    fn find_first(&self) -> Option<usize> {
        self.iter().position(|&bit| bit)
    }

    fn find_next(&self, after: usize) -> Option<usize> {
        let start = after.checked_add(1)?;
        self.get(start..)?
            .iter()
            .position(|&bit| bit)
            .map(|offset| start + offset)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_set() {
        let set = BitSet::with_capacity(200);
        assert_eq!(set.size(), 200);
        assert!(set.is_empty());
        assert_eq!(set.find_first(), None);
        assert_eq!(set.find_next(0), None);
    }

    #[test]
    fn test_zero_capacity() {
        let set = BitSet::with_capacity(0);
        assert_eq!(set.size(), 0);
        assert_eq!(set.find_first(), None);
        assert!(!set.test(0));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = BitSet::with_capacity(130);
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(129));
        assert_eq!(set.count(), 2);
        assert!(set.test(3));
        assert!(set.test(129));
        assert!(!set.test(4));
        assert!(!set.test(1000));

        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert_eq!(set.count(), 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![129]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_out_of_range_panics() {
        let mut set = BitSet::with_capacity(10);
        set.insert(10);
    }

    #[test]
    fn test_find_across_block_boundaries() {
        let set = BitSet::from_indices(300, [0, 63, 64, 127, 256, 299]).unwrap();
        assert_eq!(set.find_first(), Some(0));
        assert_eq!(set.find_next(0), Some(63));
        assert_eq!(set.find_next(63), Some(64));
        assert_eq!(set.find_next(64), Some(127));
        assert_eq!(set.find_next(127), Some(256));
        assert_eq!(set.find_next(256), Some(299));
        assert_eq!(set.find_next(299), None);
        assert_eq!(set.find_next(usize::MAX), None);
    }

    #[test]
    fn test_from_indices_out_of_range() {
        let result = BitSet::from_indices(8, [1, 8]);
        assert_eq!(
            result,
            Err(BitSetError::IndexOutOfRange { index: 8, capacity: 8 })
        );
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut set = BitSet::from_indices(70, [1, 69]).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.size(), 70);
        assert_eq!(set.find_first(), None);
    }

    #[test]
    fn test_equality_includes_capacity() {
        let a = BitSet::from_indices(10, [1]).unwrap();
        let b = BitSet::from_indices(11, [1]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, BitSet::from_indices(10, [1]).unwrap());
    }

    #[test]
    fn test_debug_lists_indices() {
        let set = BitSet::from_indices(16, [2, 9]).unwrap();
        assert_eq!(format!("{set:?}"), "BitSet { size: 16, ones: [2, 9] }");
    }

    #[test]
    fn test_block_layout() {
        assert_eq!(BLOCK_BITS, 64);
        assert_eq!(num_blocks(0), 0);
        assert_eq!(num_blocks(64), 1);
        assert_eq!(num_blocks(65), 2);
    }

    #[test]
    fn test_dense_slice() {
        let dense = [false, true, false, false, true];
        let dense: &[bool] = &dense;
        assert_eq!(dense.size(), 5);
        assert_eq!(dense.ones().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(dense.count_ones(), 2);
        assert_eq!(dense.find_next(4), None);
        assert!(!dense.test(17));
    }

    proptest! {
        #[test]
        fn prop_ones_match_inserted(
            (size, indices) in (1usize..2000).prop_flat_map(|size| {
                (Just(size), proptest::collection::btree_set(0..size, 0..size.min(64)))
            })
        ) {
            let set = BitSet::from_indices(size, indices.iter().copied()).unwrap();
            let ones: BTreeSet<usize> = set.iter().collect();
            prop_assert_eq!(&ones, &indices);
            prop_assert_eq!(set.count(), indices.len());
            for &i in &indices {
                prop_assert!(set.test(i));
            }
        }
    }
}
