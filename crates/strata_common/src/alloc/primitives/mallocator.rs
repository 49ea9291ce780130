use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

use crate::alloc::{Allocator, AllocId};

/// Allocator calling directly to the system allocator
///
/// Mallocator uses rust's global allocator to retrieve memory
///
/// This allocator has a special allocator id, which will always refer to the Mallocator: [`AllocId::Malloc`]
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Mallocator;

impl Allocator for Mallocator {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0, "Mallocator cannot allocate zero-sized blocks");
        NonNull::new(alloc::alloc(layout))
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout);
    }

    fn alloc_id(&self) -> AllocId {
        AllocId::Malloc
    }
}

#[cfg(test)]
mod test {
    use std::alloc::Layout;

    use crate::alloc::*;
    use super::Mallocator;

    #[test]
    fn alloc_dealloc() {
        let mut alloc = Mallocator;
        let layout = Layout::new::<u64>();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            ptr.cast::<u64>().as_ptr().write(42);
            assert_eq!(ptr.cast::<u64>().as_ptr().read(), 42);
            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn respects_alignment() {
        let mut alloc = Mallocator;
        let layout = Layout::from_size_align(24, 64).unwrap();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            assert_eq!(ptr.as_ptr() as usize % 64, 0);
            alloc.dealloc(ptr, layout);
        }
    }
}
