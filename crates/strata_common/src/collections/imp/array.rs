use std::{
    alloc::{self, Layout},
    marker::PhantomData,
    mem::size_of,
    ptr::{self, NonNull},
};

use crate::{
    alloc::Allocator,
    collections::{ReserveStrategy, TryReserveError},
    KiB,
};

/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory in an allocator without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces `NonNull::dangling` on zero-sized types
/// - Produces `NonNull::dangling` on zero-length allocations.
/// - Avoids freeing `NonNull::dangling`
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Allocates a new buffer before touching the old one, so a failed grow leaves the buffer as it was.
///
/// This type does not in anyway inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`
///
/// Note that the capacity of a zero-sized type is always `usize::MAX`.
pub(crate) struct RawArray<T, A: Allocator, R: ReserveStrategy> {
    ptr      : NonNull<T>,
    cap      : usize,
    alloc    : A,
    _phantom : PhantomData<(T, fn() -> R)>,
}

unsafe impl<T: Send, A: Allocator + Send, R: ReserveStrategy> Send for RawArray<T, A, R> {}
unsafe impl<T: Sync, A: Allocator + Sync, R: ReserveStrategy> Sync for RawArray<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> RawArray<T, A, R> {
    /// Tiny arrays are dumb, so like std's `RawVec`, skip to:
    /// - 8 if the element size is 1, because of how heap allocators are likely to round up a request of 8 bytes to at least 8 bytes (if not 16).
    /// - 4 if the element is moderate-sized (<= 1KiB, which could fit nicely in a single OS memory page)
    /// - 1 otherwise, to avoid wasting too much space for very short arrays.
    pub const MIN_NON_ZERO_CAP: usize = if size_of::<T>() == 1 {
        8
    } else if size_of::<T>() <= KiB(1) {
        4
    } else {
        1
    };

    /// Creates the biggest possible `RawArray` without allocating.
    /// If `T` has a non-zero size, the this makes a `RawArray` with a capacity of `0`.
    /// If `T` is zero-sized, the it makes a `RawArray` with a capacity of `usize::MAX`.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, alloc, _phantom: PhantomData }
    }

    /// Creates a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceed `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        match Self::try_with_capacity_in(capacity, alloc) {
            Ok(res) => res,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new_in` when `capacity` is `0` or `T` is zero-sized.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut res = Self::new_in(alloc);
        // Don't allocate here, because `drop` will not deallocate when capacity is 0.
        if size_of::<T>() != 0 && capacity != 0 {
            unsafe { res.finalize_grow(Ok(capacity), 0)? };
        }
        Ok(res)
    }

    /// Get the capacity of the allocation.
    ///
    /// This will always be `usize::MAX` if `T` is zero-sized.
    pub const fn capacity(&self) -> usize {
        if size_of::<T>() == 0 {
            usize::MAX
        } else {
            self.cap
        }
    }

    /// Get the allocator used for the allocation.
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
        if size_of::<T>() == 0 || self.cap == 0 {
            None
        } else {
            // The layout was already validated when this memory was allocated
            let layout = Layout::array::<T>(self.cap).ok()?;
            Some((self.ptr.cast(), layout))
        }
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already have enough capacity, will reallocate enough space plus comfortable slack space to get amortized *O*(1) behavior.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn reserve(&mut self, len: usize, additional: usize) {
        // Callers expect this function to be very cheap when there is already sufficient capacity.
        #[cold]
        fn do_reserve_and_handle<T, A: Allocator, R: ReserveStrategy>(
            slf: &mut RawArray<T, A, R>,
            len: usize,
            additional: usize,
        ) {
            if let Err(err) = slf.grow_amortized(len, additional) {
                handle_error(err);
            }
        }

        if self.needs_to_grow(len, additional) {
            do_reserve_and_handle(self, len, additional);
        }
    }

    /// The same as `reserve`, but returns on errors instead of panicking or aborting.
    pub fn try_reserve(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_amortized(len, additional)?;
        }
        Ok(())
    }

    /// A specialized version of `self.reserve(len, 1)`, which requires the caller to ensure `len == self.capacity()`.
    pub fn grow_one(&mut self) {
        if let Err(err) = self.grow_amortized(self.capacity(), 1) {
            handle_error(err);
        }
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already, will reallocate the minimum possible amount of memory necessary.
    pub fn reserve_exact(&mut self, len: usize, additional: usize) {
        if let Err(err) = self.try_reserve_exact(len, additional) {
            handle_error(err);
        }
    }

    pub fn try_reserve_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_exact(len, additional)?;
        }
        Ok(())
    }

    /// Shrinks the buffer down to the specified capacity, keeping the first `len` elements.
    /// If the given amount is 0, actually completely deallocates.
    ///
    /// # Panics
    ///
    /// Panics if the given amount is *larger* than the current capacity.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    pub fn shrink_to_fit(&mut self, len: usize, cap: usize) {
        if let Err(err) = self.shrink(len, cap) {
            handle_error(err);
        }
    }

    /// Release the allocation and replace the allocator with `alloc`.
    ///
    /// # Safety
    ///
    /// The buffer must not contain any live elements.
    pub unsafe fn replace_allocator(&mut self, alloc: A) {
        self.release();
        self.alloc = alloc;
    }

    //--------------------------------------------------------------

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.capacity().wrapping_sub(len)
    }

    fn grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        debug_assert!(additional > 0);

        if size_of::<T>() == 0 {
            // Since we return a capacity of `usize::MAX` when `T` is zero-sized, getting to here necessarily means that `RawArray` is overfull.
            return Err(TryReserveError::CapacityOverflow);
        }

        let required_cap = len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = R::calculate(self.cap, required_cap).map(|cap| cap.max(Self::MIN_NON_ZERO_CAP));

        unsafe { self.finalize_grow(new_cap, len) }
    }

    fn grow_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if size_of::<T>() == 0 {
            return Err(TryReserveError::CapacityOverflow);
        }

        let target_cap = len.checked_add(additional).ok_or(());
        unsafe { self.finalize_grow(target_cap, len) }
    }

    fn shrink(&mut self, len: usize, cap: usize) -> Result<(), TryReserveError> {
        assert!(cap <= self.capacity(), "Tried to shrink to a larger capacity");
        debug_assert!(len <= cap);

        if size_of::<T>() == 0 || cap == self.cap {
            return Ok(());
        }

        if cap == 0 {
            unsafe { self.release() };
            return Ok(());
        }

        unsafe { self.move_to_new_buffer(cap, len) }
    }

    unsafe fn finalize_grow(&mut self, new_cap: Result<usize, ()>, len: usize) -> Result<(), TryReserveError> {
        let Ok(new_cap) = new_cap else {
            return Err(TryReserveError::CapacityOverflow);
        };
        self.move_to_new_buffer(new_cap, len)
    }

    /// Allocate a buffer of `new_cap` elements, move the first `len` elements into it and release the old buffer.
    /// On failure, nothing is changed.
    unsafe fn move_to_new_buffer(&mut self, new_cap: usize, len: usize) -> Result<(), TryReserveError> {
        let layout = match Layout::array::<T>(new_cap) {
            Ok(layout) if layout.size() <= isize::MAX as usize => layout,
            _ => return Err(TryReserveError::CapacityOverflow),
        };

        let new_ptr = match self.alloc.alloc(layout) {
            Some(ptr) => ptr.cast::<T>(),
            None => return Err(TryReserveError::AllocError(layout)),
        };

        if len != 0 {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
        }
        self.release();

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Free the current buffer, if any, and go back to a dangling pointer with 0 capacity.
    unsafe fn release(&mut self) {
        if let Some((ptr, layout)) = self.current_memory() {
            self.alloc.dealloc(ptr, layout);
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for RawArray<T, A, R> {
    fn drop(&mut self) {
        unsafe { self.release() };
    }
}

/// Central function for reserve error handling
#[cold]
pub(crate) fn handle_error(e: TryReserveError) -> ! {
    match e {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError(layout) => alloc::handle_alloc_error(layout),
    }
}

fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        alloc::{CappedAllocator, TracingAllocator},
        collections::DoubleOrMinReserveStrategy,
    };

    type Raw<T, A> = RawArray<T, A, DoubleOrMinReserveStrategy>;

    #[test]
    fn zero_sized_never_allocates() {
        let alloc = TracingAllocator::new();
        let mut buf = Raw::<(), _>::new_in(alloc.clone());
        assert_eq!(buf.capacity(), usize::MAX);
        buf.reserve(0, 1000);
        assert_eq!(alloc.trace().alloc_count(), 0);
    }

    #[test]
    fn grow_uses_min_non_zero_cap() {
        let mut buf = Raw::<u8, _>::new_in(TracingAllocator::new());
        buf.reserve(0, 1);
        assert_eq!(buf.capacity(), 8);

        let mut buf = Raw::<u32, _>::new_in(TracingAllocator::new());
        buf.reserve(0, 1);
        assert_eq!(buf.capacity(), 4);
        buf.reserve(4, 1);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn failed_grow_keeps_buffer() {
        let mut buf = Raw::<u64, _>::try_with_capacity_in(2, CappedAllocator::new(32)).unwrap();
        let ptr = buf.ptr();

        assert!(matches!(buf.try_reserve(2, 4), Err(TryReserveError::AllocError(_))));
        assert_eq!(buf.ptr(), ptr);
        assert_eq!(buf.capacity(), 2);
        assert_eq!(buf.allocator().in_use(), 16);
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let mut buf = Raw::<u64, _>::new_in(TracingAllocator::new());
        assert_eq!(buf.try_reserve_exact(0, usize::MAX / 4), Err(TryReserveError::CapacityOverflow));
        assert_eq!(buf.try_reserve(0, usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(buf.allocator().trace().alloc_count(), 0);
    }

    #[test]
    fn shrink_to_zero_releases() {
        let alloc = TracingAllocator::new();
        let mut buf = Raw::<u32, _>::with_capacity_in(16, alloc.clone());
        buf.shrink_to_fit(0, 4);
        assert_eq!(buf.capacity(), 4);
        buf.shrink_to_fit(0, 0);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(alloc.trace().alloc_count(), 2);
        assert_eq!(alloc.trace().dealloc_count(), 2);
        assert_eq!(alloc.trace().bytes_in_use(), 0);
    }
}
