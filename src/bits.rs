/// Fixed-capacity set of board positions packed into 64-bit words.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bitset {
    words: Vec<u64>,
    len: usize,
}

impl Bitset {
    /// Creates an empty set able to hold indexes in `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.words.len() * 64
    }

    pub fn contains(&self, index: usize) -> bool {
        match self.words.get(index / 64) {
            Some(word) => (word & (1u64 << (index % 64))) != 0,
            None => false,
        }
    }

    /// Adds `index`, returning true if it wasn't already present.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.capacity(), "index out of bounds");
        let word = &mut self.words[index / 64];
        let mask = 1u64 << (index % 64);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.len += 1;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn iter(&self) -> BitsetIter<'_> {
        BitsetIter {
            words: &self.words,
            word_idx: 0,
            bits: self.words.first().copied().unwrap_or(0),
        }
    }
}

pub struct BitsetIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    bits: u64,
}

impl Iterator for BitsetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.bits != 0 {
                let bit = self.bits.trailing_zeros() as usize;
                self.bits &= self.bits - 1; // Clear the lowest set bit
                return Some(self.word_idx * 64 + bit);
            }
            self.word_idx += 1;
            self.bits = *self.words.get(self.word_idx)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_insert_contains() {
        let mut bs = Bitset::with_capacity(130);
        assert!(!bs.contains(0));
        assert!(!bs.contains(129));
        assert!(!bs.contains(10_000));

        assert!(bs.insert(5));
        assert!(bs.insert(64));
        assert!(bs.insert(129));
        assert!(bs.contains(5));
        assert!(bs.contains(64));
        assert!(bs.contains(129));
        assert!(!bs.contains(63));
    }

    #[test]
    fn test_bitset_len() {
        let mut bs = Bitset::with_capacity(64);
        assert!(bs.is_empty());
        bs.insert(0);
        bs.insert(5);
        assert_eq!(bs.len(), 2);

        // Inserting the same bit again should not change length
        assert!(!bs.insert(5));
        assert_eq!(bs.len(), 2);
    }

    #[test]
    fn test_bitset_iter() {
        let mut bs = Bitset::with_capacity(200);
        for i in [0, 5, 63, 64, 150, 199] {
            bs.insert(i);
        }
        let indexes: Vec<usize> = bs.iter().collect();
        assert_eq!(indexes, vec![0, 5, 63, 64, 150, 199]);
    }

    #[test]
    fn test_bitset_iter_empty() {
        assert_eq!(Bitset::with_capacity(0).iter().count(), 0);
        assert_eq!(Bitset::with_capacity(100).iter().count(), 0);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_bitset_insert_out_of_bounds() {
        let mut bs = Bitset::with_capacity(64);
        bs.insert(64);
    }
}
