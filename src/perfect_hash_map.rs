//! PerfectHashMap: public facade over the two-level table.

use crate::bucket::Bucket;
use crate::builder::{BuildStats, Builder};
use crate::error::{BuildError, LookupError};
use crate::universal_hash::{AffineHash, UniversalHash, UniversalKey};
use core::fmt;
use core::ops::{Index, IndexMut};
use rand::Rng;

/// Static map with worst-case O(1) lookup: two hash evaluations and one
/// key comparison, no probing.
///
/// The key set is fixed at construction. Values of present keys may be
/// updated in place; keys can never be added or removed.
///
/// ```
/// use fks_hashmap::{LookupError, PerfectHashMap};
///
/// let mut map = PerfectHashMap::new([(1, "a"), (3, "b"), (9, "c")]).unwrap();
/// assert_eq!(map.at(3), Ok(&"b"));
/// map[3] = "teste";
/// assert_eq!(map.at(3), Ok(&"teste"));
/// assert_eq!(map.at(5), Err(LookupError::KeyNotFound));
/// ```
#[derive(Clone)]
pub struct PerfectHashMap<K, V, H = AffineHash> {
    // None only for the empty map.
    top: Option<H>,
    buckets: Vec<Option<Bucket<K, V, H>>>,
    len: usize,
    stats: BuildStats,
}

impl<K, V> PerfectHashMap<K, V>
where
    K: UniversalKey,
{
    /// Build from `pairs` with the default rehash cap and the thread-local
    /// generator. Later duplicates of a key overwrite earlier ones.
    pub fn new<I>(pairs: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Builder::new().build(pairs)
    }

    /// Build from `pairs` drawing all randomness from `rng`.
    pub fn with_rng<I, R>(pairs: I, rng: &mut R) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        R: Rng + ?Sized,
    {
        Builder::new().build_with_rng(pairs, rng)
    }

    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<K, V, H> PerfectHashMap<K, V, H>
where
    K: Copy + Eq,
    H: UniversalHash<K>,
{
    pub(crate) fn from_parts(
        top: Option<H>,
        buckets: Vec<Option<Bucket<K, V, H>>>,
        stats: BuildStats,
    ) -> Self {
        let len = buckets.iter().flatten().map(Bucket::len).sum();
        Self {
            top,
            buckets,
            len,
            stats,
        }
    }

    #[inline]
    fn bucket_index(&self, key: K) -> Option<usize> {
        let i = self.top.as_ref()?.index(key);
        debug_assert!(i < self.buckets.len(), "top-level index {i} out of range");
        Some(i)
    }

    /// Checked read; fails if `key` was not in the construction set.
    #[inline]
    pub fn at(&self, key: K) -> Result<&V, LookupError> {
        self.get(key).ok_or(LookupError::KeyNotFound)
    }

    /// Checked write handle; fails if `key` was not in the construction set.
    #[inline]
    pub fn at_mut(&mut self, key: K) -> Result<&mut V, LookupError> {
        self.get_mut(key).ok_or(LookupError::KeyNotFound)
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        let i = self.bucket_index(key)?;
        self.buckets.get(i)?.as_ref()?.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let i = self.bucket_index(key)?;
        self.buckets.get_mut(i)?.as_mut()?.get_mut(key)
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slots across all buckets.
    pub fn capacity(&self) -> usize {
        self.occupied_buckets().map(Bucket::capacity).sum()
    }

    /// Number of top-level buckets, empty ones included.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub(crate) fn occupied_buckets(&self) -> impl Iterator<Item = &Bucket<K, V, H>> {
        self.buckets.iter().flatten()
    }

    /// Entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.occupied_buckets().flat_map(|b| b.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.buckets.iter_mut().flatten().flat_map(|b| b.iter_mut())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, v)| v)
    }
}

/// Panics if `key` was not in the construction set.
impl<K, V, H> Index<K> for PerfectHashMap<K, V, H>
where
    K: Copy + Eq,
    H: UniversalHash<K>,
{
    type Output = V;

    fn index(&self, key: K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("PerfectHashMap: key not found"),
        }
    }
}

/// Updates the value of an existing key. Panics if `key` was not in the
/// construction set; there is no insertion through indexing.
impl<K, V, H> IndexMut<K> for PerfectHashMap<K, V, H>
where
    K: Copy + Eq,
    H: UniversalHash<K>,
{
    fn index_mut(&mut self, key: K) -> &mut V {
        match self.get_mut(key) {
            Some(v) => v,
            None => panic!("PerfectHashMap: key not found"),
        }
    }
}

impl<K, V, H> fmt::Debug for PerfectHashMap<K, V, H>
where
    K: Copy + Eq + fmt::Debug,
    V: fmt::Debug,
    H: UniversalHash<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
