//! Hash finalization and the default hasher.
//!
//! The indexing engine derives both the home bucket (top bits) and an
//! 8-bit fingerprint (low bits) from a single 64-bit hash, so it needs
//! every bit of that hash to be well spread. Hashes from arbitrary
//! [`BuildHasher`]s are therefore folded through [`mix`] before use.
//! Hashers that already avalanche declare so through the [`MixHash`]
//! capability trait and skip the fold.
//!
//! The bundled [`WyHash`] is a stripped-down wyhash: fixed secret,
//! little-endian reads, and no big-endian reproducibility guarantee.

use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;

/// 2^64 / phi, the usual odd fixup constant for multiplicative mixing.
pub(crate) const GOLDEN_RATIO: u64 = 0x9E37_79B9_7F4A_7C15;

const SECRET: [u64; 4] = [
    0xa076_1d64_78bd_642f,
    0xe703_7ed1_a0b4_28db,
    0x8ebc_6af0_9c88_c6e3,
    0x5899_65cc_7537_4cc3,
];

/// Multiplies the two inputs into a 128-bit product and folds the halves
/// with xor.
///
/// Every output bit depends on every input bit of both operands, which
/// makes this a cheap one-instruction-pair avalanche step on 64-bit
/// targets.
#[inline]
#[must_use]
pub fn mix(a: u64, b: u64) -> u64 {
    let product = u128::from(a) * u128::from(b);
    (product as u64) ^ ((product >> 64) as u64)
}

#[inline]
fn r8(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

#[inline]
fn r4(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u64::from(u32::from_le_bytes(buf))
}

// Reads 1, 2, or 3 bytes.
#[inline]
fn r3(bytes: &[u8], len: usize) -> u64 {
    (u64::from(bytes[0]) << 16) | (u64::from(bytes[len >> 1]) << 8) | u64::from(bytes[len - 1])
}

/// Hashes a byte slice with the given seed.
fn hash_bytes(bytes: &[u8], mut seed: u64) -> u64 {
    let len = bytes.len();
    let a;
    let b;
    if len <= 16 {
        if len >= 4 {
            let delta = (len >> 3) << 2;
            a = (r4(bytes) << 32) | r4(&bytes[delta..]);
            b = (r4(&bytes[len - 4..]) << 32) | r4(&bytes[len - 4 - delta..]);
        } else if len > 0 {
            a = r3(bytes, len);
            b = 0;
        } else {
            a = 0;
            b = 0;
        }
    } else {
        let mut tail = bytes;
        let mut remaining = len;
        if remaining > 48 {
            let mut see1 = seed;
            let mut see2 = seed;
            while remaining > 48 {
                seed = mix(r8(tail) ^ SECRET[1], r8(&tail[8..]) ^ seed);
                see1 = mix(r8(&tail[16..]) ^ SECRET[2], r8(&tail[24..]) ^ see1);
                see2 = mix(r8(&tail[32..]) ^ SECRET[3], r8(&tail[40..]) ^ see2);
                tail = &tail[48..];
                remaining -= 48;
            }
            seed ^= see1 ^ see2;
        }
        while remaining > 16 {
            seed = mix(r8(tail) ^ SECRET[1], r8(&tail[8..]) ^ seed);
            tail = &tail[16..];
            remaining -= 16;
        }
        // The final reads take the last 16 bytes of the whole input,
        // overlapping the strided part when the length is not a multiple
        // of 16.
        a = r8(&bytes[len - 16..]);
        b = r8(&bytes[len - 8..]);
    }

    mix(SECRET[1] ^ len as u64, mix(a ^ SECRET[1], b ^ seed))
}

/// Capability surface over [`BuildHasher`] consulted by the containers.
///
/// [`AVALANCHING`] declares whether finished hashes are already well
/// spread. When it is `false` (the default), [`mixed_hash`] folds the
/// hash through [`mix`] with [a golden-ratio constant] so the home-bucket
/// bits and the fingerprint bits are usable even for weak hashes; when it
/// is `true` the finished hash is used verbatim.
///
/// Implement this for a hasher builder to use it with [`DenseMap`] and
/// [`DenseSet`]:
///
/// ```rust
/// use core::hash::BuildHasher;
/// use core::hash::BuildHasherDefault;
/// use std::collections::hash_map::DefaultHasher;
///
/// use dense_hash::DenseMap;
/// use dense_hash::MixHash;
///
/// #[derive(Default, Clone)]
/// struct MyState(BuildHasherDefault<DefaultHasher>);
///
/// impl core::hash::BuildHasher for MyState {
///     type Hasher = DefaultHasher;
///
///     fn build_hasher(&self) -> DefaultHasher {
///         self.0.build_hasher()
///     }
/// }
///
/// // Output quality unknown, keep the default fold.
/// impl MixHash for MyState {}
///
/// let mut map: DenseMap<u32, u32, MyState> = DenseMap::default();
/// map.insert(1, 2);
/// assert_eq!(map.get(&1), Some(&2));
/// ```
///
/// The [`Avalanching`] and [`Mixed`] adapters declare the bit for an
/// existing builder without a hand-written impl.
///
/// [`AVALANCHING`]: MixHash::AVALANCHING
/// [`mixed_hash`]: MixHash::mixed_hash
/// [a golden-ratio constant]: https://en.wikipedia.org/wiki/Golden_ratio
/// [`DenseMap`]: crate::DenseMap
/// [`DenseSet`]: crate::DenseSet
pub trait MixHash: BuildHasher {
    /// Whether finished hashes are already avalanching.
    const AVALANCHING: bool = false;

    /// Hashes `value` and finalizes the result for table use.
    #[inline]
    fn mixed_hash<T: Hash + ?Sized>(&self, value: &T) -> u64
    where
        Self: Sized,
    {
        let hash = self.hash_one(value);
        if Self::AVALANCHING {
            hash
        } else {
            mix(hash, GOLDEN_RATIO)
        }
    }
}

/// Adapter declaring that `S`'s finished hashes are already avalanching.
///
/// The wrapped builder's hashes are used verbatim, with no extra fold.
#[derive(Clone, Copy, Debug, Default)]
pub struct Avalanching<S>(pub S);

impl<S: BuildHasher> BuildHasher for Avalanching<S> {
    type Hasher = S::Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        self.0.build_hasher()
    }
}

impl<S: BuildHasher> MixHash for Avalanching<S> {
    const AVALANCHING: bool = true;
}

/// Adapter for builders of unknown hash quality.
///
/// Finished hashes are folded through [`mix`] before use.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mixed<S>(pub S);

impl<S: BuildHasher> BuildHasher for Mixed<S> {
    type Hasher = S::Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        self.0.build_hasher()
    }
}

impl<S: BuildHasher> MixHash for Mixed<S> {}

#[cfg(feature = "std")]
impl MixHash for std::collections::hash_map::RandomState {}

/// A streaming wyhash with a fixed secret.
///
/// Each `write` folds the chunk through the byte hash seeded by the
/// running state, so split writes of the same data may hash differently
/// from one contiguous write; the `Hash` impl of a type always splits
/// the same way, which is all a table needs.
#[derive(Clone, Debug)]
pub struct WyHash {
    state: u64,
}

impl Default for WyHash {
    #[inline]
    fn default() -> Self {
        WyHash { state: SECRET[0] }
    }
}

impl Hasher for WyHash {
    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = hash_bytes(bytes, self.state);
    }

    #[inline]
    fn write_u8(&mut self, n: u8) {
        self.write_u64(u64::from(n));
    }

    #[inline]
    fn write_u16(&mut self, n: u16) {
        self.write_u64(u64::from(n));
    }

    #[inline]
    fn write_u32(&mut self, n: u32) {
        self.write_u64(u64::from(n));
    }

    #[inline]
    fn write_u64(&mut self, n: u64) {
        self.state = mix(n ^ self.state, SECRET[1]);
    }

    #[inline]
    fn write_u128(&mut self, n: u128) {
        self.write_u64(n as u64);
        self.write_u64((n >> 64) as u64);
    }

    #[inline]
    fn write_usize(&mut self, n: usize) {
        self.write_u64(n as u64);
    }
}

/// Builder for [`WyHash`]; the crate's default hasher.
#[derive(Clone, Copy, Debug, Default)]
pub struct WyHashState;

impl BuildHasher for WyHashState {
    type Hasher = WyHash;

    #[inline]
    fn build_hasher(&self) -> WyHash {
        WyHash::default()
    }
}

impl MixHash for WyHashState {
    const AVALANCHING: bool = true;
}

/// The hasher builder used by [`DenseMap`] and [`DenseSet`] when none is
/// supplied.
///
/// [`DenseMap`]: crate::DenseMap
/// [`DenseSet`]: crate::DenseSet
pub type DefaultHashBuilder = WyHashState;
