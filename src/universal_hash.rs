//! Randomized universal hash families.
//!
//! `AffineHash` is the multiply-add-shift family
//! `h(x) = ((a*x + b) mod 2^W) >> (W - M)` over a `W = 128` bit word.
//! Keys are at most 64 bits wide and `M <= 64`, so `W >= key_bits + M - 1`
//! holds and any two distinct keys collide with probability at most
//! `1 / 2^M` over the choice of `(a, b)`.

use rand::Rng;

/// Largest index width any family is asked for.
pub const MAX_BITS: u32 = 64;

const WORD_BITS: u32 = u128::BITS;

/// A key with an injective mapping into a 64-bit integer domain.
///
/// Implemented for the primitive integers, `char` and `bool`. Application
/// keys (interned ids, newtypes) implement it themselves; two distinct keys
/// that map to the same word can never be separated by any hash function,
/// so the mapping must be injective over the keys stored in one table.
pub trait UniversalKey: Copy + Eq {
    /// Width of the key's integer representation; `to_word` never sets a
    /// bit at or above it. Application keys default to a full word.
    const BITS: u32 = 64;

    fn to_word(self) -> u64;
}

macro_rules! impl_universal_key {
    ($($t:ty => $u:ty),* $(,)?) => {
        $(
            impl UniversalKey for $t {
                const BITS: u32 = <$t>::BITS;

                #[inline]
                fn to_word(self) -> u64 {
                    self as $u as u64
                }
            }
        )*
    };
}

impl_universal_key!(
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    usize => usize,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    isize => usize,
);

impl UniversalKey for char {
    const BITS: u32 = 32;

    #[inline]
    fn to_word(self) -> u64 {
        self as u32 as u64
    }
}

impl UniversalKey for bool {
    const BITS: u32 = 1;

    #[inline]
    fn to_word(self) -> u64 {
        self as u64
    }
}

/// A randomly parameterized hash function drawn from a universal family.
///
/// `index` must be pure given the current parameters and always land in
/// `[0, 2^bits())`.
pub trait UniversalHash<K>: Clone {
    /// Draw a fresh member of the family mapping into `[0, 2^bits)`.
    /// `bits` is clamped to [`MAX_BITS`].
    fn seeded<R: Rng + ?Sized>(bits: u32, rng: &mut R) -> Self;

    /// Resample the random parameters, keeping the output width.
    fn rehash<R: Rng + ?Sized>(&mut self, rng: &mut R);

    fn bits(&self) -> u32;

    fn index(&self, key: K) -> usize;
}

/// Multiply-add-shift hashing over 128-bit words.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AffineHash {
    a: u128,
    b: u128,
    bits: u32,
}

impl AffineHash {
    fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.a = rng.random::<u128>();
        self.b = rng.random::<u128>() >> self.bits;
    }
}

impl<K: UniversalKey> UniversalHash<K> for AffineHash {
    fn seeded<R: Rng + ?Sized>(bits: u32, rng: &mut R) -> Self {
        let mut h = AffineHash {
            a: 0,
            b: 0,
            bits: bits.min(MAX_BITS),
        };
        h.sample(rng);
        h
    }

    #[inline]
    fn rehash<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.sample(rng);
    }

    #[inline]
    fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    fn index(&self, key: K) -> usize {
        // A shift by the full word width would overflow; a single slot is index 0.
        if self.bits == 0 {
            return 0;
        }
        let x = key.to_word();
        debug_assert!(K::BITS >= 64 || x >> K::BITS == 0, "key word wider than K::BITS");
        let x = x as u128;
        let y = self.a.wrapping_mul(x).wrapping_add(self.b);
        (y >> (WORD_BITS - self.bits)) as usize
    }
}

/// `ceil(log2(n))`, with `0` for `n <= 1`.
#[inline]
pub(crate) fn ceil_log2(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}
