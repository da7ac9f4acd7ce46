//! fks-hashmap: a static, collision-free map built once from a fixed set
//! of key/value pairs, with worst-case O(1) lookup.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: FKS (Fredman, Komlós, Szemerédi) two-level perfect hashing.
//!   A randomized construction phase buys deterministic lookups: two hash
//!   evaluations and one key comparison, no probing, no allocation.
//! - Layers:
//!   - `UniversalHash<K>`: randomized hash family; `AffineHash` is the
//!     default multiply-add-shift family with a 1/2^M pair-collision bound.
//!   - `Bucket<K, V, H>`: second-level sub-table of `>= k^2` slots with its
//!     own hash, resampled until the `k` keys routed to it do not collide.
//!   - `Builder`: top-level partition of `n` keys into `2^ceil(log2 n)`
//!     buckets, then the per-bucket search. Owns configuration.
//!   - `PerfectHashMap<K, V, H>`: public facade with checked access.
//!
//! Constraints
//! - Key set is fixed at construction. Only values of present keys may be
//!   updated; there is no insertion, removal or resize.
//! - Keys are `Copy + Eq` and map injectively to a 64-bit word
//!   (`UniversalKey`); other key types need an application-defined mapping.
//! - Values carry no bounds: empty slots are `None`, not default values.
//! - Single-threaded construction. A built map is `Sync` when its parts
//!   are; concurrent writers need external locking.
//!
//! Randomness
//! - All randomness flows from a generator passed to the builder
//!   (`build_with_rng`); a fixed seed reproduces the same layout. Each
//!   occupied bucket samples from its own `ChaCha8Rng` seeded from it.
//! - `build`/`new` use the thread-local generator.
//!
//! Termination
//! - Each per-bucket trial succeeds with probability above 1/2, so the
//!   expected number of rounds is O(1). The default builder still caps
//!   rounds per bucket (`DEFAULT_MAX_REHASHES`) so that inseparable keys,
//!   i.e. a non-injective `UniversalKey`, fail with
//!   `BuildError::ConstructionNonTermination` instead of spinning. The cap
//!   can be lifted with `max_rehashes(None)`.
//!
//! Missing keys
//! - `at`/`at_mut`/`get`/`get_mut` verify the stored key. `Index` and
//!   `IndexMut` verify it too and panic on a missing key, so a write
//!   through an absent key can never land in an unrelated slot.
//!
//! Duplicates
//! - Repeated keys in the input are not collisions: they share one slot
//!   and the last value wins.

#[cfg(feature = "bench_internal")]
pub mod bucket;
#[cfg(not(feature = "bench_internal"))]
mod bucket;
mod builder;
pub mod error;
mod perfect_hash_map;
mod perfect_hash_map_proptest;
pub mod universal_hash;

// Public surface
pub use builder::{BuildStats, Builder, DEFAULT_MAX_REHASHES};
pub use error::{BuildError, LookupError};
pub use perfect_hash_map::PerfectHashMap;
pub use universal_hash::{AffineHash, UniversalHash, UniversalKey};
