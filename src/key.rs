//! Per-type operations the table needs from its keys.
//!
//! A key type supplies three things: the bit pattern reserved for empty slots
//! (the *sentinel*), a 64-bit hash code, and an equality test. Everything else
//! about the table is shared between key types.

/// 64-bit golden ratio, `2^64 / phi`.
const LONG_PHI: u64 = 0x9E37_79B9_7F4A_7C15;

/// Scrambles a hash code so that low bits depend on every input bit.
///
/// Masking an unmixed integer key would put sequential or power-of-two keys
/// into a handful of clustered slots.
#[inline(always)]
pub fn mix(x: u64) -> u64 {
    let h = x.wrapping_mul(LONG_PHI);
    let h = h ^ (h >> 32);
    h ^ (h >> 16)
}

/// A key that can live in a primitive hash table.
///
/// # Contract
///
/// - [`sentinel`](Key::sentinel) must satisfy
///   [`is_sentinel`](Key::is_sentinel), and no other value may.
/// - Keys that are [`key_eq`](Key::key_eq) must have identical
///   [`hash_bits`](Key::hash_bits).
///
/// The sentinel is still a valid key: the table stores it in a dedicated slot.
pub trait Key: Clone {
    /// The value that marks an empty slot.
    fn sentinel() -> Self;

    /// Returns `true` if `self` is the sentinel.
    fn is_sentinel(&self) -> bool;

    /// A hash code for the key, before mixing.
    fn hash_bits(&self) -> u64;

    /// Key equality as the table sees it.
    fn key_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_integer_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl Key for $t {
                #[inline(always)]
                fn sentinel() -> Self {
                    0
                }

                #[inline(always)]
                fn is_sentinel(&self) -> bool {
                    *self == 0
                }

                #[inline(always)]
                fn hash_bits(&self) -> u64 {
                    *self as u64
                }

                #[inline(always)]
                fn key_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_integer_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! impl_wide_integer_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl Key for $t {
                #[inline(always)]
                fn sentinel() -> Self {
                    0
                }

                #[inline(always)]
                fn is_sentinel(&self) -> bool {
                    *self == 0
                }

                #[inline(always)]
                fn hash_bits(&self) -> u64 {
                    let bits = *self as u128;
                    (bits as u64) ^ ((bits >> 64) as u64)
                }

                #[inline(always)]
                fn key_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_wide_integer_key!(u128, i128);

impl Key for char {
    #[inline(always)]
    fn sentinel() -> Self {
        '\0'
    }

    #[inline(always)]
    fn is_sentinel(&self) -> bool {
        *self == '\0'
    }

    #[inline(always)]
    fn hash_bits(&self) -> u64 {
        u64::from(*self)
    }

    #[inline(always)]
    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }
}

// Float keys compare by bit pattern with NaN canonicalised, so every NaN is
// one key and `0.0` and `-0.0` are two. Only `+0.0` is the sentinel.
macro_rules! impl_float_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl Key for $t {
                #[inline(always)]
                fn sentinel() -> Self {
                    0.0
                }

                #[inline(always)]
                fn is_sentinel(&self) -> bool {
                    self.to_bits() == 0
                }

                #[inline(always)]
                fn hash_bits(&self) -> u64 {
                    if self.is_nan() {
                        u64::from(<$t>::NAN.to_bits())
                    } else {
                        u64::from(self.to_bits())
                    }
                }

                #[inline(always)]
                fn key_eq(&self, other: &Self) -> bool {
                    if self.is_nan() {
                        other.is_nan()
                    } else {
                        self.to_bits() == other.to_bits()
                    }
                }
            }
        )*
    };
}

impl_float_key!(f32, f64);

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        // Arbitrary, but fixed: every table must agree on an object's hash.
        const OBJECT_SEED: u64 = 0x243F_6A88_85A3_08D3;

        #[inline]
        fn object_hash<T: core::hash::Hash>(value: &T) -> u64 {
            use core::hash::BuildHasher;

            foldhash::fast::FixedState::with_seed(OBJECT_SEED).hash_one(value)
        }
    } else if #[cfg(feature = "std")] {
        #[inline]
        fn object_hash<T: core::hash::Hash>(value: &T) -> u64 {
            use core::hash::BuildHasher;

            core::hash::BuildHasherDefault::<std::collections::hash_map::DefaultHasher>::default()
                .hash_one(value)
        }
    }
}

/// Object keys. `None` plays the role of the null key.
#[cfg(any(feature = "foldhash", feature = "std"))]
impl<T> Key for Option<T>
where
    T: core::hash::Hash + Eq + Clone,
{
    #[inline(always)]
    fn sentinel() -> Self {
        None
    }

    #[inline(always)]
    fn is_sentinel(&self) -> bool {
        self.is_none()
    }

    #[inline]
    fn hash_bits(&self) -> u64 {
        match self {
            Some(value) => object_hash(value),
            None => 0,
        }
    }

    #[inline(always)]
    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }
}
