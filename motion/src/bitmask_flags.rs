use num_traits::{One, PrimInt};
use serde::{Deserialize, Serialize};

/// Trait implemented by flag enums whose discriminant is a bit index.
///
/// The backing integer is chosen through the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container, used for layer masks and contact sets.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn empty() -> Self {
        Self { bits: T::zero() }
    }

    pub fn from_tags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::empty();
        flags.add_many(tags);
        flags
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.remove(tag);
        }
    }

    // --- Logic Gates ---
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return true;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn has_any<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) != T::zero()
    }

    /// True when the two masks share at least one bit.
    pub fn intersects(&self, other: Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }

    pub fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Variants take their bit index from their position, or from an explicit
/// discriminant when every variant carries one:
/// ```rust
/// motion::define_bitmask_flags!(UnitStatus, u16, {
///     IsFriendly,
///     InCombat,
///     Stunned,
/// });
///
/// motion::define_bitmask_flags!(Channel, u32, {
///     Default = 0,
///     Ui = 5,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident = $index:literal),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $index),*
        }

        impl $name {
            /// Every declared variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every declared variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_bitmask_flags!(Sequential, u16, { A, B, C });
    define_bitmask_flags!(Indexed, u32, { Low = 1, High = 12 });

    #[test]
    fn sequential_variants_use_their_position() {
        let mut flags = BitmaskFlags::<u16>::empty();
        flags.add(Sequential::C);
        assert_eq!(flags.bits, 0b100);
        assert!(flags.has(Sequential::C));
        assert!(!flags.has(Sequential::A));
    }

    #[test]
    fn explicit_indices_are_respected() {
        let flags = BitmaskFlags::from_tags(&[Indexed::Low, Indexed::High]);
        assert_eq!(flags.bits, (1 << 1) | (1 << 12));
        assert!(flags.has_all(Indexed::ALL));
    }

    #[test]
    fn bulk_removal_and_gates() {
        let mut flags = BitmaskFlags::from_tags(Sequential::ALL);
        flags.remove_many(&[Sequential::A, Sequential::B]);
        assert!(flags.has_any(&[Sequential::A, Sequential::C]));
        assert!(!flags.has_all(&[Sequential::A, Sequential::C]));
        assert!(!flags.has_any::<Sequential>(&[]));

        flags.clear();
        assert!(flags.is_empty());
    }

    #[test]
    fn masks_intersect_on_shared_bits() {
        let a = BitmaskFlags::<u32>::new(0b0110);
        let b = BitmaskFlags::<u32>::new(0b0100);
        let c = BitmaskFlags::<u32>::new(0b1000);
        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert_eq!(a.union(c).bits, 0b1110);
    }
}
