//! Bucket: second-level sub-table with a private, collision-free hash.
//!
//! A bucket receiving `k` keys gets `2^ceil(log2(k^2))` slots. With a
//! 2-universal family the expected number of colliding pairs among `k` keys
//! is below 1/2, so each trial succeeds with probability above 1/2 and the
//! search below needs O(1) rounds in expectation.

use crate::error::BuildError;
use crate::universal_hash::{ceil_log2, UniversalHash};
use rand::Rng;

/// Rounds after which a single bucket is considered unusually unlucky.
const WARN_REHASHES: u32 = 32;

#[derive(Clone, Debug)]
pub struct Bucket<K, V, H> {
    hash: H,
    slots: Box<[Option<(K, V)>]>,
    len: usize,
    rehashes: u32,
}

impl<K, V, H> Bucket<K, V, H>
where
    K: Copy + Eq,
    H: UniversalHash<K>,
{
    /// Find a collision-free hash for `pairs` and commit them.
    ///
    /// Repeated keys are not collisions: they share a slot and the last
    /// pair wins. Fails only when `max_rehashes` is set and exhausted.
    pub fn build<R: Rng + ?Sized>(
        bucket: usize,
        pairs: Vec<(K, V)>,
        max_rehashes: Option<u32>,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let k = pairs.len();
        let mut hash = H::seeded(ceil_log2(k.saturating_mul(k)), rng);
        let bits = hash.bits();
        debug_assert!(bits < usize::BITS, "bucket capacity overflow: {k} keys");
        // Unreachable in practice (needs ~2^32 keys in one bucket); the
        // saturated size then fails allocation like any oversized Vec.
        let capacity = 1usize.checked_shl(bits).unwrap_or(usize::MAX);

        // claimed[slot] = position in `pairs` of the key occupying the slot.
        let mut claimed: Vec<Option<usize>> = vec![None; capacity];
        let mut rehashes = 0u32;
        'search: loop {
            for (i, (key, _)) in pairs.iter().enumerate() {
                let slot = hash.index(*key);
                let owner = claimed[slot];
                match owner {
                    Some(j) if pairs[j].0 != *key => {
                        if max_rehashes.is_some_and(|cap| rehashes >= cap) {
                            log::error!(
                                "bucket {bucket}: no collision-free hash for {k} keys after {rehashes} rehashes"
                            );
                            return Err(BuildError::ConstructionNonTermination {
                                bucket,
                                keys: k,
                                rehashes,
                            });
                        }
                        rehashes += 1;
                        log::trace!("bucket {bucket}: collision at slot {slot}, rehash #{rehashes}");
                        claimed.fill(None);
                        hash.rehash(rng);
                        continue 'search;
                    }
                    _ => claimed[slot] = Some(i),
                }
            }
            break;
        }
        if rehashes > WARN_REHASHES {
            log::warn!("bucket {bucket}: {k} keys needed {rehashes} rehashes");
        }

        let mut slots: Box<[Option<(K, V)>]> = (0..capacity).map(|_| None).collect();
        for (key, value) in pairs {
            let slot = hash.index(key);
            slots[slot] = Some((key, value));
        }
        let len = slots.iter().filter(|s| s.is_some()).count();

        Ok(Self {
            hash,
            slots,
            len,
            rehashes,
        })
    }

    /// Slot index `key` resolves to under this bucket's hash.
    #[inline]
    pub fn slot_of(&self, key: K) -> usize {
        self.hash.index(key)
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        match self.slots.get(self.slot_of(key)) {
            Some(Some((k, v))) if *k == key => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let slot = self.slot_of(key);
        match self.slots.get_mut(slot) {
            Some(Some((k, v))) if *k == key => Some(v),
            _ => None,
        }
    }

    /// Number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub(crate) fn hash(&self) -> &H {
        &self.hash
    }

    /// Rehash rounds spent finding this bucket's hash.
    pub fn rehashes(&self) -> u32 {
        self.rehashes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().flatten().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.slots.iter_mut().flatten().map(|(k, v)| (&*k, v))
    }
}
