#![cfg(test)]

// Property tests kept inside the crate so they can inspect buckets and
// slot assignments without feature gates.

use crate::bucket::Bucket;
use crate::universal_hash::AffineHash;
use crate::{Builder, LookupError, PerfectHashMap};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};

fn build(pairs: &[(u32, i32)], seed: u64) -> PerfectHashMap<u32, i32> {
    Builder::new()
        .max_rehashes(None)
        .build_with_rng(pairs.iter().copied(), &mut ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
}

proptest! {
    // Every input key resolves to the value it was last paired with;
    // len counts distinct keys.
    #[test]
    fn prop_lookup_matches_last_write(
        pairs in proptest::collection::vec((0u32..500, any::<i32>()), 0..200),
        seed in any::<u64>(),
    ) {
        let m = build(&pairs, seed);
        let model: BTreeMap<u32, i32> = pairs.iter().copied().collect();
        prop_assert_eq!(m.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(m.at(*k), Ok(v));
        }
        let seen: BTreeMap<u32, i32> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(seen, model);
    }

    // Keys outside the construction set are never found.
    #[test]
    fn prop_absent_keys_not_found(
        pairs in proptest::collection::vec((any::<u32>(), any::<i32>()), 0..100),
        probes in proptest::collection::vec(any::<u32>(), 1..100),
        seed in any::<u64>(),
    ) {
        let m = build(&pairs, seed);
        let present: BTreeSet<u32> = pairs.iter().map(|(k, _)| *k).collect();
        for p in probes {
            if !present.contains(&p) {
                prop_assert_eq!(m.at(p), Err(LookupError::KeyNotFound));
                prop_assert!(!m.contains_key(p));
            }
        }
    }

    // Within each bucket, distinct keys occupy distinct slots, and the
    // slots stay inside the bucket.
    #[test]
    fn prop_buckets_are_collision_free(
        keys in proptest::collection::btree_set(any::<u64>(), 0..300),
        seed in any::<u64>(),
    ) {
        let m: PerfectHashMap<u64, ()> = Builder::new()
            .build_with_rng(keys.iter().map(|&k| (k, ())), &mut ChaCha8Rng::seed_from_u64(seed))
            .unwrap();
        let mut total = 0;
        for bucket in m.occupied_buckets() {
            let mut slots = BTreeSet::new();
            for (k, _) in bucket.iter() {
                let s = bucket.slot_of(*k);
                prop_assert!(s < bucket.capacity());
                prop_assert!(slots.insert(s), "slot {} reused", s);
            }
            prop_assert!(bucket.capacity() >= bucket.len() * bucket.len());
            total += bucket.len();
        }
        prop_assert_eq!(total, keys.len());
    }

    // Updating a present key is visible through `at` and touches nothing else.
    #[test]
    fn prop_update_is_local(
        keys in proptest::collection::btree_set(any::<i16>(), 1..100),
        pick in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        let keys: Vec<i16> = keys.into_iter().collect();
        let mut m = PerfectHashMap::with_rng(
            keys.iter().map(|&k| (k, k as i32)),
            &mut ChaCha8Rng::seed_from_u64(seed),
        ).unwrap();
        let target = keys[pick.index(keys.len())];
        m[target] = -1;
        for &k in &keys {
            let expected = if k == target { -1 } else { k as i32 };
            prop_assert_eq!(m.at(k), Ok(&expected));
        }
    }
}

/// Mean rehash rounds per bucket stays below a small constant for every
/// bucket size: each round succeeds with probability above 1/2.
#[test]
fn mean_rehashes_bounded_independent_of_k() {
    for k in [2u64, 8, 32, 128] {
        let mut total = 0u64;
        let runs = 100;
        for seed in 0..runs {
            let mut rng = ChaCha8Rng::seed_from_u64(seed * 1000 + k);
            let pairs: Vec<(u64, ())> = (0..k).map(|i| (i * 0x9e37_79b9 + seed, ())).collect();
            let b = Bucket::<u64, (), AffineHash>::build(0, pairs, None, &mut rng).unwrap();
            total += u64::from(b.rehashes());
        }
        let mean = total as f64 / runs as f64;
        assert!(mean < 1.5, "k = {k}: mean rehashes {mean}");
    }
}

/// Same property at table level across seeds.
#[test]
fn table_mean_rehashes_bounded() {
    let keys: Vec<(u32, u32)> = (0..2000u32).map(|i| (i.wrapping_mul(2_654_435_761), i)).collect();
    let mut worst = 0.0f64;
    for seed in 0..20 {
        let m = build_u32(&keys, seed);
        worst = worst.max(m.stats().mean_rehashes());
    }
    assert!(worst < 1.5, "worst mean rehashes {worst}");
}

fn build_u32(pairs: &[(u32, u32)], seed: u64) -> PerfectHashMap<u32, u32> {
    PerfectHashMap::with_rng(pairs.iter().copied(), &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
}
