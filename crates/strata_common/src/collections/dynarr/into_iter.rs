use std::{
    fmt,
    iter::FusedIterator,
    ptr,
    slice,
};

use crate::{
    alloc::{Allocator, Mallocator},
    collections::{imp::RawArray, DoubleOrMinReserveStrategy, ReserveStrategy},
};

/// An iterator that moves out of a dynamic array.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`](super::DynArr) (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T, A: Allocator = Mallocator, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    /// Elements in `[start, end)` are still owned by the iterator, the buffer is released when the iterator is dropped
    pub(super) buf   : RawArray<T, A, R>,
    pub(super) start : usize,
    pub(super) end   : usize,
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIter<T, A, R> {
    /// Returns the remaining items of this iterator as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns a reference to the underlying allocator.
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for IntoIter<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Iterator for IntoIter<T, A, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            let value = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
            self.start += 1;
            Some(value)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, A, R> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            self.end -= 1;
            Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
        }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> FusedIterator for IntoIter<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> Drop for IntoIter<T, A, R> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        // Mark everything as moved out first, so a panicking destructor can't cause a double drop
        self.start = self.end;
        unsafe { ptr::drop_in_place(remaining) };
        // `RawArray` handles deallocation
    }
}
