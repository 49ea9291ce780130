use std::{alloc::Layout, ptr::NonNull};

//------------------------------------------------------------------------------------------------------------------------------

/// Allocation strategy that provides raw heap memory to containers.
///
/// A container holds its allocator by value and routes every allocation and deallocation through it.
/// Allocators never know about the containers using them.
pub trait Allocator {
    /// Allocate memory for the given layout.
    ///
    /// # Return
    ///
    /// If no memory could be allocated, `None` should be returned.
    ///
    /// # Safety
    ///
    /// The layout must have a non-zero size, containers never request zero-sized blocks.
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocate an allocation
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `alloc` on this allocator (or a compatible one) with the same `layout`, and must not be used afterwards.
    ///
    /// # Panics
    ///
    /// Deallocation may panic, since an incorrect deallocation should not happen
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Check if the allocator owns the allocation
    ///
    /// Default implementation assumes every allocation is owned by the allocator
    fn owns(&self, _ptr: NonNull<u8>, _layout: Layout) -> bool {
        true
    }

    /// Get the kind of the allocator.
    ///
    /// Memory allocated by one allocator may be released by any other allocator with an equal id.
    fn alloc_id(&self) -> AllocId;
}

/// Check if memory allocated by `a` can be released by `b` and the other way around.
pub fn is_compatible<A: Allocator + ?Sized, B: Allocator + ?Sized>(a: &A, b: &B) -> bool {
    a.alloc_id() == b.alloc_id()
}

//------------------------------------------------------------------------------------------------------------------------------

/// Identifies the kind of an allocator
#[derive(Clone, Copy, Eq, Debug)]
pub enum AllocId {
    /// The system allocator
    Malloc,
    /// An allocator recording every request it forwards
    Tracing,
    /// An allocator with a fixed byte budget
    Capped,
    /// A user allocator, ids below [`NUM_RESERVED_ALLOC_IDS`] alias the reserved kinds
    Id(u16),
}

/// Reserved allocs IDs
/// - 0: Malloc
/// - 1: Tracing
/// - 2: Capped
pub const NUM_RESERVED_ALLOC_IDS: u16 = 3;

impl AllocId {
    pub const fn get_id(&self) -> u16 {
        match self {
            Self::Malloc => 0,
            Self::Tracing => 1,
            Self::Capped => 2,
            Self::Id(id) => *id,
        }
    }
}

impl PartialEq for AllocId {
    fn eq(&self, other: &Self) -> bool {
        self.get_id() == other.get_id()
    }
}

impl core::hash::Hash for AllocId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get_id().hash(state)
    }
}

impl core::fmt::Display for AllocId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malloc => f.write_str("malloc"),
            Self::Tracing => f.write_str("tracing"),
            Self::Capped => f.write_str("capped"),
            Self::Id(id) => write!(f, "id({id})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{Mallocator, TracingAllocator, CappedAllocator};

    #[test]
    fn reserved_ids_alias() {
        assert_eq!(AllocId::Malloc, AllocId::Id(0));
        assert_eq!(AllocId::Capped, AllocId::Id(2));
        assert_ne!(AllocId::Tracing, AllocId::Id(NUM_RESERVED_ALLOC_IDS));
    }

    #[test]
    fn compatibility_follows_kind() {
        assert!(is_compatible(&Mallocator, &Mallocator));
        assert!(is_compatible(&TracingAllocator::new(), &TracingAllocator::new()));
        assert!(!is_compatible(&Mallocator, &TracingAllocator::new()));
        assert!(!is_compatible(&CappedAllocator::new(16), &Mallocator));
    }
}
