//! Builder: top-level partition and per-bucket perfect-hash search.

use crate::bucket::Bucket;
use crate::error::BuildError;
use crate::perfect_hash_map::PerfectHashMap;
use crate::universal_hash::{ceil_log2, AffineHash, UniversalHash};
use core::marker::PhantomData;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Default per-bucket cap on rehash rounds. Each round succeeds with
/// probability above 1/2, so hitting it means the keys cannot be separated
/// (a non-injective `UniversalKey` mapping), not bad luck.
pub const DEFAULT_MAX_REHASHES: u32 = 4096;

/// Construction statistics, kept on the built map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Top-level buckets, `2^ceil(log2(n))` (zero for an empty input).
    pub buckets: usize,
    /// Buckets that received at least one key.
    pub occupied_buckets: usize,
    /// Slots across all buckets.
    pub slots: usize,
    /// Rehash rounds across all buckets.
    pub rehashes: u64,
    /// Largest number of rehash rounds any single bucket needed.
    pub max_bucket_rehashes: u32,
}

impl BuildStats {
    /// Mean rehash rounds per occupied bucket.
    pub fn mean_rehashes(&self) -> f64 {
        if self.occupied_buckets == 0 {
            0.0
        } else {
            self.rehashes as f64 / self.occupied_buckets as f64
        }
    }
}

/// Configures and runs construction of a [`PerfectHashMap`].
///
/// ```
/// use fks_hashmap::Builder;
/// use rand::SeedableRng;
///
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
/// let map = Builder::new()
///     .max_rehashes(Some(64))
///     .build_with_rng([(1u32, "a"), (3, "b"), (9, "c")], &mut rng)
///     .unwrap();
/// assert_eq!(map.at(9), Ok(&"c"));
/// ```
pub struct Builder<H = AffineHash> {
    max_rehashes: Option<u32>,
    _hash: PhantomData<fn() -> H>,
}

impl Builder {
    pub fn new() -> Self {
        Self::with_hash_family()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for Builder<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Builder<H> {}

impl<H> core::fmt::Debug for Builder<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Builder")
            .field("max_rehashes", &self.max_rehashes)
            .finish()
    }
}

impl<H> Builder<H> {
    /// Builder using a custom hash family `H` at both levels.
    pub fn with_hash_family() -> Self {
        Self {
            max_rehashes: Some(DEFAULT_MAX_REHASHES),
            _hash: PhantomData,
        }
    }

    /// Per-bucket cap on rehash rounds; `None` retries without bound.
    pub fn max_rehashes(mut self, cap: Option<u32>) -> Self {
        self.max_rehashes = cap;
        self
    }

    /// Build from `pairs` using the thread-local generator.
    pub fn build<K, V, I>(&self, pairs: I) -> Result<PerfectHashMap<K, V, H>, BuildError>
    where
        K: Copy + Eq,
        H: UniversalHash<K>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.build_with_rng(pairs, &mut rand::rng())
    }

    /// Build from `pairs` drawing all randomness from `rng`. A fixed seed
    /// yields the same layout on every run.
    pub fn build_with_rng<K, V, I, R>(
        &self,
        pairs: I,
        rng: &mut R,
    ) -> Result<PerfectHashMap<K, V, H>, BuildError>
    where
        K: Copy + Eq,
        H: UniversalHash<K>,
        I: IntoIterator<Item = (K, V)>,
        R: Rng + ?Sized,
    {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        let n = pairs.len();
        if n == 0 {
            log::debug!("built empty perfect hash map");
            return Ok(PerfectHashMap::from_parts(None, Vec::new(), BuildStats::default()));
        }

        let top = H::seeded(ceil_log2(n), rng);
        let count = 1usize << top.bits();
        let mut pending: Vec<Vec<(K, V)>> = (0..count).map(|_| Vec::new()).collect();
        for (key, value) in pairs {
            pending[top.index(key)].push((key, value));
        }

        let mut stats = BuildStats {
            buckets: count,
            ..BuildStats::default()
        };
        let mut buckets = Vec::with_capacity(count);
        for (i, group) in pending.into_iter().enumerate() {
            if group.is_empty() {
                buckets.push(None);
                continue;
            }
            // Each bucket samples from its own generator.
            let mut bucket_rng = ChaCha8Rng::seed_from_u64(rng.random());
            let bucket = Bucket::build(i, group, self.max_rehashes, &mut bucket_rng)?;
            debug_assert!(!bucket.is_empty());
            stats.occupied_buckets += 1;
            stats.slots += bucket.capacity();
            stats.rehashes += u64::from(bucket.rehashes());
            stats.max_bucket_rehashes = stats.max_bucket_rehashes.max(bucket.rehashes());
            buckets.push(Some(bucket));
        }

        log::debug!(
            "built perfect hash map: {n} pairs, {} buckets ({} occupied), {} slots, {} rehashes",
            stats.buckets,
            stats.occupied_buckets,
            stats.slots,
            stats.rehashes
        );
        Ok(PerfectHashMap::from_parts(Some(top), buckets, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UniversalKey;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn top_level_has_power_of_two_buckets() {
        for (n, expected) in [(1usize, 1usize), (2, 2), (3, 4), (4, 4), (5, 8), (100, 128)] {
            let m = Builder::new()
                .build_with_rng((0..n as u64).map(|k| (k, k)), &mut rng(n as u64))
                .unwrap();
            assert_eq!(m.stats().buckets, expected, "n = {n}");
            assert_eq!(m.bucket_count(), expected);
        }
    }

    #[test]
    fn empty_input_has_no_buckets() {
        let m = Builder::new()
            .build_with_rng(Vec::<(u32, u32)>::new(), &mut rng(0))
            .unwrap();
        assert_eq!(m.stats(), &BuildStats::default());
        assert_eq!(m.bucket_count(), 0);
        assert_eq!(m.stats().mean_rehashes(), 0.0);
    }

    /// Same seed, same layout.
    #[test]
    fn construction_is_deterministic_per_seed() {
        let pairs: Vec<(u32, u32)> = (0..500).map(|i| (i * 7919, i)).collect();
        let a = Builder::new()
            .build_with_rng(pairs.clone(), &mut rng(42))
            .unwrap();
        let b = Builder::new().build_with_rng(pairs, &mut rng(42)).unwrap();
        assert_eq!(a.stats(), b.stats());
        let sa: Vec<_> = a.iter().map(|(k, v)| (*k, *v)).collect();
        let sb: Vec<_> = b.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(sa, sb);
    }

    /// Expected total slot count is linear in n (sum of squared bucket
    /// loads under a 2-universal top level, rounded up to powers of two).
    #[test]
    fn total_slots_stay_linear() {
        let n = 4096u64;
        let m = Builder::new()
            .build_with_rng((0..n).map(|k| (k * 2654435761, ())), &mut rng(3))
            .unwrap();
        assert!(m.stats().slots < 8 * n as usize, "slots = {}", m.stats().slots);
        assert_eq!(m.stats().slots, m.capacity());
    }

    /// Inseparable keys with a cap fail atomically instead of spinning.
    #[test]
    fn cap_bounds_construction() {
        #[derive(Copy, Clone, PartialEq, Eq, Debug)]
        struct Parity(u8);
        impl UniversalKey for Parity {
            fn to_word(self) -> u64 {
                (self.0 & 1) as u64
            }
        }

        let res = Builder::new()
            .max_rehashes(Some(10))
            .build_with_rng([(Parity(0), 0), (Parity(2), 1)], &mut rng(1));
        assert!(matches!(
            res,
            Err(BuildError::ConstructionNonTermination { keys: 2, rehashes: 10, .. })
        ));
    }

    #[test]
    fn build_uses_thread_rng() {
        let m = Builder::new().build([('x', 1), ('y', 2)]).unwrap();
        assert_eq!(m.at('y'), Ok(&2));
    }

    /// Dietzfelbinger multiply-shift over 64-bit words with an odd
    /// multiplier; counts resamples so the test can see it was driven.
    #[derive(Clone, Debug)]
    struct MultiplyShift {
        a: u64,
        bits: u32,
        resamples: u32,
    }

    impl<K: UniversalKey> UniversalHash<K> for MultiplyShift {
        fn seeded<R: Rng + ?Sized>(bits: u32, rng: &mut R) -> Self {
            MultiplyShift {
                a: rng.random::<u64>() | 1,
                bits: bits.min(crate::universal_hash::MAX_BITS),
                resamples: 0,
            }
        }

        fn rehash<R: Rng + ?Sized>(&mut self, rng: &mut R) {
            self.a = rng.random::<u64>() | 1;
            self.resamples += 1;
        }

        fn bits(&self) -> u32 {
            self.bits
        }

        fn index(&self, key: K) -> usize {
            if self.bits == 0 {
                return 0;
            }
            (self.a.wrapping_mul(key.to_word()) >> (64 - self.bits)) as usize
        }
    }

    #[test]
    fn custom_hash_family_builds_working_map() {
        let pairs: Vec<(u32, u32)> = (0..300).map(|k| (k * 17, k)).collect();
        let m = Builder::<MultiplyShift>::with_hash_family()
            .max_rehashes(None)
            .build_with_rng(pairs.clone(), &mut rng(12))
            .unwrap();
        assert_eq!(m.len(), pairs.len());
        for (k, v) in &pairs {
            assert_eq!(m.at(*k), Ok(v));
        }
        assert_eq!(m.at(1), Err(crate::LookupError::KeyNotFound));
        assert_eq!(m.bucket_count(), 512);
        assert_eq!(m.stats().slots, m.capacity());
        let resamples: u64 = m
            .occupied_buckets()
            .map(|b| u64::from(b.hash().resamples))
            .sum();
        assert_eq!(resamples, m.stats().rehashes);
    }

    #[test]
    fn builder_debug_shows_cap() {
        let b = Builder::new().max_rehashes(None);
        assert_eq!(format!("{b:?}"), "Builder { max_rehashes: None }");
    }
}
