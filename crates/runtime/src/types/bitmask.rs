//! Flag sets over integer-backed enums.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An enum whose values are single bits (or unions of bits) of a flag set.
pub trait BitmaskValue: Copy {
    fn bits(self) -> u64;
}

/// A 64-bit set of flags drawn from the enum domain `T`.
pub struct BitmaskSet<T> {
    bits: u64,
    _domain: PhantomData<fn() -> T>,
}

impl<T> BitmaskSet<T> {
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self {
            bits,
            _domain: PhantomData,
        }
    }

    pub const fn bits(self) -> u64 {
        self.bits
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl<T: BitmaskValue> BitmaskSet<T> {
    /// True when any bit of `value` is set.
    pub fn has(self, value: T) -> bool {
        self.bits & value.bits() != 0
    }

    pub fn has_all(self, values: &[T]) -> bool {
        values.iter().all(|v| self.has(*v))
    }

    pub fn add(self, value: T) -> Self {
        Self::from_bits(self.bits | value.bits())
    }

    pub fn remove(self, value: T) -> Self {
        Self::from_bits(self.bits & !value.bits())
    }

    /// Returns the empty set. The argument is ignored; this is not a
    /// single-flag removal (use [`BitmaskSet::remove`] for that).
    pub fn clear(self, _value: T) -> Self {
        Self::empty()
    }
}

impl<T> Clone for BitmaskSet<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BitmaskSet<T> {}

impl<T> Default for BitmaskSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for BitmaskSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T> Eq for BitmaskSet<T> {}

impl<T> Hash for BitmaskSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

impl<T> fmt::Debug for BitmaskSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitmaskSet({:#x})", self.bits)
    }
}

impl<T> fmt::Display for BitmaskSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.bits, f)
    }
}

impl<T> Serialize for BitmaskSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits)
    }
}

impl<'de, T> Deserialize<'de> for BitmaskSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::from_bits)
    }
}
