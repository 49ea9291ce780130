
mod imp;
mod bitdynarr;

mod dynarr;

use core::{alloc::Layout, fmt};

pub use bitdynarr::*;
pub use dynarr::*;

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Error returned when a container could not get the memory it needs
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity does not fit in `isize::MAX` bytes
    CapacityOverflow,
    /// The allocator could not provide a block with this layout
    AllocError(Layout),
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self {
            TryReserveError::CapacityOverflow => f.write_str(" because the computed capacity exceeded the collection's maximum"),
            TryReserveError::AllocError(layout) => write!(f, " because the allocator returned an error ({} bytes, align {})", layout.size(), layout.align()),
        }
    }
}

impl std::error::Error for TryReserveError {}

/// Error returned by checked accessors when the index is not smaller than the length
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfRangeError {
    pub index : usize,
    pub len   : usize,
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index out of range: the len is {} but the index is {}", self.len, self.index)
    }
}

impl std::error::Error for OutOfRangeError {}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// Returns `Err(())` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()>;
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
#[derive(Debug)]
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        let double_cap = cur_capacity.saturating_mul(2);
        let new_cap = if double_cap > min_capacity { double_cap } else { min_capacity };
        if new_cap <= isize::MAX as usize {
            Ok(new_cap)
        } else if min_capacity <= isize::MAX as usize {
            Ok(isize::MAX as usize)
        } else {
            Err(())
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
#[derive(Debug)]
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        match min_capacity.checked_next_power_of_two() {
            Some(new_cap) if new_cap <= isize::MAX as usize => Ok(new_cap),
            _ => Err(()),
        }
    }
}

/// A reserve stategy that grows the capacity by 1.5
#[derive(Debug)]
pub struct ThreeHalvesReserveStrategy;

impl ReserveStrategy for ThreeHalvesReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        if min_capacity > isize::MAX as usize {
            return Err(());
        }

        let mut cap = cur_capacity.max(1);
        while cap < min_capacity {
            cap = cap + (cap >> 1).max(1);
            if cap >= isize::MAX as usize {
                return Ok(isize::MAX as usize);
            }
        }
        Ok(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_or_min() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 1), Ok(1));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, 20), Ok(20));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(4, usize::MAX), Err(()));
    }

    #[test]
    fn pow2() {
        assert_eq!(Pow2ReserveStrategy::calculate(0, 5), Ok(8));
        assert_eq!(Pow2ReserveStrategy::calculate(8, 9), Ok(16));
        assert_eq!(Pow2ReserveStrategy::calculate(0, usize::MAX), Err(()));
    }

    #[test]
    fn three_halves() {
        assert_eq!(ThreeHalvesReserveStrategy::calculate(0, 1), Ok(1));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(4, 5), Ok(6));
        assert_eq!(ThreeHalvesReserveStrategy::calculate(8, 13), Ok(18));
    }

    #[test]
    fn error_messages() {
        let err = OutOfRangeError { index: 6, len: 6 };
        assert_eq!(err.to_string(), "index out of range: the len is 6 but the index is 6");
        assert!(TryReserveError::CapacityOverflow.to_string().starts_with("memory allocation failed"));
    }
}
