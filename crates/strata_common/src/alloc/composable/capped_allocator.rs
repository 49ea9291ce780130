use std::{
    alloc::Layout,
    ptr::NonNull,
};

use crate::alloc::*;

/// Allocator with a fixed byte budget
///
/// Requests are forwarded to the inner allocator as long as the total amount of live memory stays within the budget,
/// any request that would exceed it returns `None`.
#[derive(Debug)]
pub struct CappedAllocator<A: Allocator = Mallocator> {
    inner  : A,
    budget : usize,
    in_use : usize,
}

impl CappedAllocator<Mallocator> {
    /// Create a capped allocator on top of the system allocator
    pub fn new(budget: usize) -> Self {
        Self::with_inner(Mallocator, budget)
    }
}

impl<A: Allocator> CappedAllocator<A> {
    pub fn with_inner(inner: A, budget: usize) -> Self {
        Self { inner, budget, in_use: 0 }
    }

    /// Maximum number of bytes that can be live at once
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Number of bytes currently allocated through this allocator
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Number of bytes that can still be allocated
    pub fn remaining(&self) -> usize {
        self.budget - self.in_use
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

// A clone gets the same budget, but none of the memory allocated by the original counts towards it
impl<A: Allocator + Clone> Clone for CappedAllocator<A> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), budget: self.budget, in_use: 0 }
    }
}

impl<A: Allocator> Allocator for CappedAllocator<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() > self.remaining() {
            return None;
        }

        let ptr = self.inner.alloc(layout)?;
        self.in_use += layout.size();
        Some(ptr)
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        self.in_use = self.in_use.saturating_sub(layout.size());
    }

    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
        self.inner.owns(ptr, layout)
    }

    fn alloc_id(&self) -> AllocId {
        AllocId::Capped
    }
}
