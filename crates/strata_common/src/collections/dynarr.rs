use core::{
    fmt,
    hash::Hash,
    mem::{self, ManuallyDrop},
    ops::{self, Bound, Index, IndexMut, Range, RangeBounds},
    ptr,
    slice::{self, SliceIndex},
};

use crate::alloc::{is_compatible, Allocator, Mallocator};

use super::{imp::RawArray, impl_slice_partial_eq_generic, DoubleOrMinReserveStrategy, OutOfRangeError, ReserveStrategy, TryReserveError};

mod into_iter;

pub use into_iter::IntoIter;

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
/// All memory is requested from the allocator `A`, and the capacity grows according to the reserve strategy `R`.
///
/// _Note: It was decided to not name this `Vec` as in the standard library, as this is easily confusable with a math vector_
///
/// # Examples
///
/// ```
/// use strata_common::{collections::DynArr, dynarr};
///
/// let mut arr = DynArr::<i32>::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, dynarr![7, 2, 1, 2, 3]);
/// ```
///
/// # Indexing
///
/// Indexing with `[]` panics when the index is out of bounds, use [`at`] or [`get`] for a checked access.
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto the dynamic array.
/// If a dynamic array's length exceeds its capacity, its capacity will automatically be increased, but its elements will have to be moved into a new allocation.
/// A growing operation allocates the new buffer before touching the old one, so when the allocator fails, the dynamic array is left unchanged.
///
/// Any operation that reallocates invalidates all pointers into the dynamic array, the borrow checker enforces this for references.
/// [`swap_with`] never reallocates: the buffers change owners, and a pointer taken before the swap now points into the other dynamic array.
///
/// `DynArr` will never automatically shrink itself, even if completely empty.
/// If you wish to free up unused memory use [`shrink_to_fit`] or [`shrink_to`].
///
/// If `T` is zero-sized, `DynArr` never allocates and its capacity is `usize::MAX`.
///
/// [`at`]: DynArr::at
/// [`get`]: slice::get
/// [`swap_with`]: DynArr::swap_with
/// [`shrink_to_fit`]: DynArr::shrink_to_fit
/// [`shrink_to`]: DynArr::shrink_to
pub struct DynArr<T, A: Allocator = Mallocator, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    arr : RawArray<T, A, R>,
    len : usize,
}

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>` using the system allocator.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Mallocator)
    }

    /// Constructs a new, empty `DynArr<T>` with at least the specified capacity, using the system allocator.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Mallocator)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_in(capacity, Mallocator)
    }
}

impl<T: Clone> DynArr<T> {
    /// Constructs a `DynArr<T>` containing `n` clones of `elem`.
    pub fn from_elem(elem: T, n: usize) -> Self {
        Self::from_elem_in(elem, n, Mallocator)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Constructs a new, empty `DynArr<T, A, R>` with the provided allocator.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { arr: RawArray::new_in(alloc), len: 0 }
    }

    /// Constructs a new `DynArr<T, A, R>` with at least the specified capacity with the provided allocator.
    ///
    /// The dynamic array will be able to hold at least `capacity` elements without reallocating.
    /// If `capacity` is 0, the dynamic array will not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self { arr: RawArray::with_capacity_in(capacity, alloc), len: 0 }
    }

    /// Tries to construct a new `DynArr<T, A, R>` with at least the specified capacity with the provided allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds `isize::MAX` _bytes_, or if the allocator reports an allocation failure.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity_in(capacity, alloc)?, len: 0 })
    }

    /// Returns the total number of element the dynamic array can hold without reallocating.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Returns the maximum number of elements a dynamic array of `T` could theoretically hold.
    pub const fn max_size(&self) -> usize {
        if mem::size_of::<T>() == 0 {
            usize::MAX
        } else {
            isize::MAX as usize / mem::size_of::<T>()
        }
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub const fn allocator(&self) -> &A {
        self.arr.allocator()
    }

    /// Reserves capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    /// The collection may reserve more space to speculatively avoid frequent reallocations.
    /// Does nothing if capacity is already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn reserve(&mut self, additional: usize) {
        self.arr.reserve(self.len, additional)
    }

    /// Reserves the minimum capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    /// Unlike [`reserve`], this will not deliberately over-allocate to speculatively avoid frequent allocations.
    ///
    /// [`reserve`]: DynArr::reserve
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn reserve_exact(&mut self, additional: usize) {
        self.arr.reserve_exact(self.len, additional)
    }

    /// Tries to reserve capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    /// This method preserves the contents even if an error occurs.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, the an error is returned.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve(self.len, additional)
    }

    /// Tries to reserve the minimum capacity for at least `additional` more elements to be inserted in the given `DynArr<T>`.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.arr.try_reserve_exact(self.len, additional)
    }

    /// Shrinks the capacity of the dynamic array as much as possible.
    ///
    /// An empty dynamic array releases its allocation.
    pub fn shrink_to_fit(&mut self) {
        // The capacity is never less than the length, and there's nothing to do when they are equal,
        // so we can avoid the panic case in `RawArray::shrink_to_fit` by only calling it with a greater capacity.
        if self.capacity() > self.len {
            self.arr.shrink_to_fit(self.len, self.len);
        }
    }

    /// Shrinks the capacity of the dynamic array with a lower bound.
    ///
    /// The capacity will remain at least as large as both the length and supplied value.
    ///
    /// If the current capacity is less than the lower limit, this is a no-op.
    pub fn shrink_to(&mut self, min_capacity: usize) {
        if self.capacity() > min_capacity {
            self.arr.shrink_to_fit(self.len, core::cmp::max(self.len, min_capacity));
        }
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater or equal to the dynamic array's current length, this has no effect.
    /// This method has no effect on the allocated capacity of the dynamic array.
    pub fn truncate(&mut self, len: usize) {
        // Safety:
        // - The slice passed to `drop_in_place` is valid; the `len >= self.len` case avoids creating an invalid slice, and
        // - The `len` of the dynamic array is shrunk before calling `drop_in_place` such that no value will be dropped twice
        //   in case `drop_in_place` were to panic once (if it panics twice, the program aborts.)
        unsafe {
            if len >= self.len {
                return;
            }
            let remaining_len = self.len - len;
            let s = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), remaining_len);
            self.len = len;
            ptr::drop_in_place(s);
        }
    }

    /// Extracts a slice containing the entire dynamic array.
    ///
    /// Equivalent to `&s[..]`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice of the entire dynamic array.
    ///
    /// Equivalent to `&mut s[..]`
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    ///
    /// Modifying the dynamic array may cause its buffer to be reallocated, which would also make any pointer to it invalid.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Returns an unsafe mutable pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero sized reads if the dynamic array didn't allocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`](DynArr::capacity).
    /// - The elements at `old_len..new_len` must be initialized.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRangeError> {
        let len = self.len;
        self.as_slice().get(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRangeError> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(OutOfRangeError { index, len })
    }

    /// Returns the first element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns the last element, or `None` if the dynamic array is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Removes an element from the dynamic array and returns it.
    ///
    /// The removed element is replaced by the last element of the dynamic array.
    /// This does not preserve ordering, but is *O*(1).
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds.
    #[inline]
    pub fn swap_remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("swap_remove index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            // We replace self[index] with the last element.
            // Note that if the bounds check above succeeds there must be a last element (which can be self[index] itself).
            let value = ptr::read(self.as_ptr().add(index));
            let base_ptr = self.as_mut_ptr();
            ptr::copy(base_ptr.add(len - 1), base_ptr.add(index), 1);
            self.set_len(len - 1);
            value
        }
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all element after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Time complexity
    ///
    /// Takes *O*([`DynArr::len`]) time.
    pub fn insert(&mut self, index: usize, element: T) {
        let len = self.len;
        if index > len {
            insert_assert_failed(index, len);
        }

        // Space for the new element
        if len == self.arr.capacity() {
            self.arr.grow_one();
        }

        unsafe { self.insert_within_capacity(index, element) };
    }

    /// Inserts an element at position `index`, returning an error instead of panicking when the memory for it could not be allocated.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    pub fn try_insert(&mut self, index: usize, element: T) -> Result<(), TryReserveError> {
        let len = self.len;
        if index > len {
            insert_assert_failed(index, len);
        }

        self.try_reserve(1)?;
        unsafe { self.insert_within_capacity(index, element) };
        Ok(())
    }

    /// # Safety
    ///
    /// `index <= len` and `len < capacity`
    unsafe fn insert_within_capacity(&mut self, index: usize, element: T) {
        let len = self.len;
        {
            let p = self.as_mut_ptr().add(index);
            if index < len {
                // Shift everything over to make space.
                // (Duplicating the `index`th element into two consecutive places.)
                ptr::copy(p, p.add(1), len - index);
            }
            // Write it in, over writing the first copy of the `index`th element.
            ptr::write(p, element);
        }
        self.set_len(len + 1);
    }

    /// Inserts `count` elements produced by `f` at `index`, `f` receives the offset of the element it creates.
    ///
    /// If `f` panics, the elements created so far stay in the dynamic array and the tail is moved back in place.
    fn insert_with<F: FnMut(usize) -> T>(&mut self, index: usize, count: usize, mut f: F) {
        let len = self.len;
        if index > len {
            insert_assert_failed(index, len);
        }
        if count == 0 {
            return;
        }

        self.reserve(count);

        unsafe {
            let base = self.as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + count), len - index);

            let len_ref = &mut self.len;
            *len_ref = index;
            let mut filled = scopeguard::guard(0usize, move |filled| {
                // Close the gap between the filled elements and the tail, this is a no-op once everything is filled
                ptr::copy(base.add(index + count), base.add(index + filled), len - index);
                *len_ref = len + filled;
            });

            while *filled < count {
                ptr::write(base.add(index + *filled), f(*filled));
                *filled += 1;
            }
        }
    }

    /// Removes and returns the element at position `index` within the dynamic array, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            let ret;
            {
                // the place we are taking from
                let ptr = self.as_mut_ptr().add(index);
                // copy it out, unsafely having a copy of the value on the stack and in the dynamic array at the same time
                ret = ptr::read(ptr);

                // Shift everything down to fill in that spot
                ptr::copy(ptr.add(1), ptr, len - index - 1);
            }
            self.set_len(len - 1);
            ret
        }
    }

    /// Removes the elements in `range`, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end, or if the end is greater than the length of the dynamic array.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3, 4, 5];
    /// arr.erase(1..3);
    /// assert_eq!(arr, [1, 4, 5]);
    /// ```
    #[track_caller]
    pub fn erase<RA: RangeBounds<usize>>(&mut self, range: RA) {
        let Range { start, end } = to_range(range, self.len);
        if start == end {
            return;
        }

        let len = self.len;
        unsafe {
            // Hide the erased elements and the tail while the erased elements are dropped
            self.set_len(start);
            let base = self.as_mut_ptr();
            let _shift_tail = scopeguard::guard(&mut self.len, |self_len| {
                ptr::copy(base.add(end), base.add(start), len - end);
                *self_len = len - (end - start);
            });
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(e)` returns `false`.
    /// This method operates in place, visiting each element exactly once in the original order, and preserves the order of the retained elements.
    pub fn retain<F>(&mut self, mut f: F) where
        F: FnMut(&T) -> bool
    {
        self.retain_mut(|elem| f(elem))
    }

    /// Retains only the elements specified by the predicate, passing a mutable reference to it.
    pub fn retain_mut<F>(&mut self, mut f: F) where
        F: FnMut(&mut T) -> bool
    {
        let original_len = self.len;
        // Avoid double drop if the predicate or a destructor panics, the guard below restores a consistent state
        unsafe { self.set_len(0) };

        struct State {
            processed : usize,
            deleted   : usize,
            len       : usize,
        }

        let base = self.as_mut_ptr();
        let len_ref = &mut self.len;
        let mut state = scopeguard::guard(State { processed: 0, deleted: 0, len: original_len }, move |state| {
            // Move the unprocessed elements back to fill the holes
            if state.deleted > 0 {
                unsafe {
                    ptr::copy(base.add(state.processed), base.add(state.processed - state.deleted), state.len - state.processed);
                }
            }
            *len_ref = state.len - state.deleted;
        });

        while state.processed < state.len {
            let cur = unsafe { &mut *base.add(state.processed) };
            if !f(cur) {
                state.processed += 1;
                state.deleted += 1;
                unsafe { ptr::drop_in_place(cur) };
            } else {
                if state.deleted > 0 {
                    unsafe { ptr::copy_nonoverlapping(cur, base.add(state.processed - state.deleted), 1) };
                }
                state.processed += 1;
            }
        }
    }

    /// Appends an element to the back of a collection.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    /// If the dynamic array's length would exceed its capacity after the push, *O*(*capacity*) times is taken to move the elements to a larger allocation.
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len;
        // This will panic or abort if we would allocate > isize::MAX bytes or if the length increment would overflow for zero-sized types.
        if len == self.arr.capacity() {
            self.arr.grow_one();
        }
        unsafe {
            let end = self.as_mut_ptr().add(len);
            ptr::write(end, value);
            self.len += 1;
        }
    }

    /// Appends an element to the back of a collection, returning an error if the memory for it could not be allocated.
    ///
    /// On failure, `value` is dropped and the dynamic array is left unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        self.try_reserve(1)?;
        unsafe {
            let end = self.as_mut_ptr().add(self.len);
            ptr::write(end, value);
            self.len += 1;
        }
        Ok(())
    }

    /// Appends an element if there is sufficient spare capacity, otherwise an error is returned with the element.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.arr.capacity() {
            return Err(value);
        }
        unsafe {
            let end = self.as_mut_ptr().add(self.len);
            ptr::write(end, value);
            self.len += 1;
        }
        Ok(())
    }

    /// Removes the last element from a dynamic array and returns it, or [`None`] if it is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            unsafe {
                self.len -= 1;
                Some(ptr::read(self.as_ptr().add(self.len)))
            }
        }
    }

    /// Clears the dynamic array, removing all values.
    ///
    /// Note that this method has no effect on the allocated capacity of the dynamic array.
    #[inline]
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();

        // SAFETY
        // - `elems` comes directly from `as_mut_slice` and is therefore valid.
        // - Setting `self.len` before calling `drop_in_place` means that if an element's `Drop` impl panics,
        // the dynamic array's `Drop` impl will do nothing (leaking the rest of the elements) instead of dropping some twice.
        unsafe {
            self.len = 0;
            ptr::drop_in_place(elems);
        }
    }

    /// Returns the number of elements in the dynamic array, also referred to as the 'length'.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exchanges the contents of two dynamic arrays, including their allocators.
    ///
    /// No element is moved or reallocated, pointers into either buffer now point into the other dynamic array.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Resizes the `DynArr` in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the `DynArr` is extended by the difference, with each additional slot filled with the result of calling the closure `f`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F) where
        F: FnMut() -> T
    {
        let len = self.len;
        if new_len > len {
            self.reserve(new_len - len);
            for _ in len..new_len {
                unsafe {
                    ptr::write(self.as_mut_ptr().add(self.len), f());
                    self.len += 1;
                }
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// leaf method to which `Extend` delegates.
    fn extend_desugared<I: Iterator<Item = T>>(&mut self, mut iter: I) {
        while let Some(element) = iter.next() {
            let len = self.len;
            if len == self.capacity() {
                let (lower, _) = iter.size_hint();
                self.reserve(lower.saturating_add(1));
            }
            unsafe {
                ptr::write(self.as_mut_ptr().add(len), element);
                // Since next() executes user code which can panic we have to bump the length after each step.
                self.len = len + 1;
            }
        }
    }
}

impl<T: Clone, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Constructs a `DynArr` containing `n` clones of `elem`, with the provided allocator.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn from_elem_in(elem: T, n: usize, alloc: A) -> Self {
        let mut arr = Self::with_capacity_in(n, alloc);
        arr.extend_with(n, elem);
        arr
    }

    /// Tries to construct a `DynArr` containing `n` clones of `elem`, with the provided allocator.
    pub fn try_from_elem_in(elem: T, n: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut arr = Self::try_with_capacity_in(n, alloc)?;
        arr.extend_with(n, elem);
        Ok(arr)
    }

    /// Constructs a `DynArr` by cloning the elements of `s` in order, with the provided allocator.
    pub fn from_slice_in(s: &[T], alloc: A) -> Self {
        let mut arr = Self::with_capacity_in(s.len(), alloc);
        arr.extend_from_slice(s);
        arr
    }

    /// Tries to construct a `DynArr` by cloning the elements of `s` in order, with the provided allocator.
    pub fn try_from_slice_in(s: &[T], alloc: A) -> Result<Self, TryReserveError> {
        let mut arr = Self::try_with_capacity_in(s.len(), alloc)?;
        arr.extend_from_slice(s);
        Ok(arr)
    }

    /// Resizes the `DynArr` in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the `DynArr` is extended by the difference, with each additional slot filled with `value`.
    /// If `new_len` is less than `len`, the `DynArr` is simply truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr!["hello"];
    /// arr.resize(3, "world");
    /// assert_eq!(arr, ["hello", "world", "world"]);
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.resize(2, 0);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn resize(&mut self, new_len: usize, value: T) {
        let len = self.len;

        if new_len > len {
            self.reserve(new_len - len);
            self.extend_with(new_len - len, value);
        } else {
            self.truncate(new_len);
        }
    }

    /// The same as [`resize`](DynArr::resize), but returns an error instead of panicking when the memory could not be allocated.
    ///
    /// On failure, the dynamic array is left unchanged.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), TryReserveError> {
        let len = self.len;

        if new_len > len {
            self.try_reserve(new_len - len)?;
            self.extend_with(new_len - len, value);
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }

    /// Clones and appends all elements in a slice to the `DynArr`.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        for elem in other {
            unsafe {
                ptr::write(self.as_mut_ptr().add(self.len), elem.clone());
                self.len += 1;
            }
        }
    }

    /// Inserts `count` clones of `value` at `index`, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) {
        self.insert_with(index, count, |_| value.clone());
    }

    /// Inserts clones of the elements of `s` at `index`, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 5];
    /// arr.insert_slice(1, &[2, 3, 4]);
    /// assert_eq!(arr, [1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_slice(&mut self, index: usize, s: &[T]) {
        self.insert_with(index, s.len(), |idx| s[idx].clone());
    }

    /// Replaces the content of the dynamic array with `n` clones of `value`.
    pub fn assign(&mut self, n: usize, value: T) {
        self.clear();
        self.resize(n, value);
    }

    /// Replaces the content of the dynamic array with clones of the elements of `s`.
    pub fn assign_from_slice(&mut self, s: &[T]) {
        self.clear();
        self.extend_from_slice(s);
    }

    // Extend the dynamic array by `n` clones of value, the capacity needs to already be reserved
    fn extend_with(&mut self, n: usize, value: T) {
        debug_assert!(self.capacity() - self.len >= n);

        unsafe {
            let mut ptr = self.as_mut_ptr().add(self.len);

            // Write all elements except for the last one
            for _ in 1..n {
                ptr::write(ptr, value.clone());
                ptr = ptr.add(1);
                self.len += 1;
            }

            if n > 0 {
                // We can write the last element directly without cloning needlessly
                ptr::write(ptr, value);
                self.len += 1;
            }
        }
    }
}

#[track_caller]
pub(super) fn to_range<RA: RangeBounds<usize>>(range: RA, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.checked_add(1).unwrap_or_else(|| panic!("attempted to index slice from after maximum usize")),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.checked_add(1).unwrap_or_else(|| panic!("attempted to index slice up to maximum usize")),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end {
        panic!("range start index {start} should be <= range end index {end}");
    }
    if end > len {
        panic!("range end index {end} out of range for dynamic array of length {len}");
    }
    start..end
}

#[cold]
#[track_caller]
fn insert_assert_failed(index: usize, len: usize) -> ! {
    panic!("insertion index (is {index}) should be <= len (is {len})");
}

//------------------------------------------------------------------------------------------------------------------------------

impl<T, A: Allocator, R: ReserveStrategy> ops::Deref for DynArr<T, A, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> ops::DerefMut for DynArr<T, A, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone, A: Allocator + Clone, R: ReserveStrategy> Clone for DynArr<T, A, R> {
    fn clone(&self) -> Self {
        Self::from_slice_in(self, self.allocator().clone())
    }

    /// Overwrites the contents of `self` with a clone of the contents of `source`.
    ///
    /// When both allocators are compatible, the buffer of `self` is reused, and no reallocation happens if it is large enough.
    /// Otherwise the buffer is released and `self` continues with a clone of the allocator of `source`.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::dynarr;
    ///
    /// let x = dynarr![5, 6, 7];
    /// let mut y = dynarr![8, 9, 10];
    /// let yp: *const i32 = y.as_ptr();
    ///
    /// y.clone_from(&x);
    ///
    /// // The value is the same
    /// assert_eq!(x, y);
    ///
    /// // And no reallocation occurred
    /// assert_eq!(yp, y.as_ptr());
    /// ```
    fn clone_from(&mut self, source: &Self) {
        if !is_compatible(self.allocator(), source.allocator()) {
            self.clear();
            // SAFETY: there are no live elements after `clear`
            unsafe { self.arr.replace_allocator(source.allocator().clone()) };
        }

        self.truncate(source.len);
        let (init, tail) = source.split_at(self.len);
        self.clone_from_slice(init);
        self.extend_from_slice(tail);
    }
}

impl<T: Hash, A: Allocator, R: ReserveStrategy> Hash for DynArr<T, A, R> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> Index<I> for DynArr<T, A, R> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> IndexMut<I> for DynArr<T, A, R> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

/// Collects an iterator into a DynArr, commonly called via [`Iterator::collect()`].
impl<T, A: Allocator + Default, R: ReserveStrategy> FromIterator<T> for DynArr<T, A, R> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new_in(A::default());
        arr.extend_desugared(iter.into_iter());
        arr
    }
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIterator for DynArr<T, A, R> {
    type Item = T;
    type IntoIter = IntoIter<T, A, R>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    /// The dynamic array cannot be used after calling this
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never used or dropped again, so the buffer is owned by the iterator from here on
        let buf = unsafe { ptr::read(&me.arr) };
        IntoIter { buf, start: 0, end: me.len }
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a DynArr<T, A, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, A, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Extend<T> for DynArr<T, A, R> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower);
        self.extend_desugared(iter)
    }
}

impl<'a, T: Copy + 'a, A: Allocator, R: ReserveStrategy> Extend<&'a T> for DynArr<T, A, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([A0: Allocator, A1: Allocator, R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, A0, R0>, DynArr<U, A1, R1>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &[U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &mut [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &[T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &mut [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] DynArr<T, A, R>, [U; N]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] [T; N], DynArr<U, A, R>);

impl<T, A0, A1, R0, R1> PartialOrd<DynArr<T, A1, R1>> for DynArr<T, A0, R0> where
    T: PartialOrd,
    A0: Allocator,
    A1: Allocator,
    R0: ReserveStrategy,
    R1: ReserveStrategy
{
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, A1, R1>) -> Option<core::cmp::Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, A: Allocator, R: ReserveStrategy> Eq for DynArr<T, A, R> {}

impl<T: Ord, A: Allocator, R: ReserveStrategy> Ord for DynArr<T, A, R> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for DynArr<T, A, R> {
    fn drop(&mut self) {
        unsafe {
            // use drop for [T]
            // uses a raw slice to refer to the elements of the dynamic array as the weakest necessary type;
            // could avoid question of validity in certain cases
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len))
        }
        // RawArray handles deallocation
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy> Default for DynArr<T, A, R> {
    /// Creates an empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for DynArr<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Formats the elements as `[a, b, c]`
impl<T: fmt::Display, A: Allocator, R: ReserveStrategy> fmt::Display for DynArr<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, elem) in self.iter().enumerate() {
            if idx != 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(elem, f)?;
        }
        f.write_str("]")
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsRef<[T]> for DynArr<T, A, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsMut<[T]> for DynArr<T, A, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone, A: Allocator + Default, R: ReserveStrategy> From<&[T]> for DynArr<T, A, R> {
    /// Allocate a `DynArr<T>` and fill it by cloning `s`'s items.
    fn from(s: &[T]) -> Self {
        Self::from_slice_in(s, A::default())
    }
}

impl<T: Clone, A: Allocator + Default, R: ReserveStrategy> From<&mut [T]> for DynArr<T, A, R> {
    fn from(s: &mut [T]) -> Self {
        Self::from_slice_in(s, A::default())
    }
}

impl<T: Clone, A: Allocator + Default, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, A, R> {
    fn from(s: &[T; N]) -> Self {
        Self::from_slice_in(s, A::default())
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, A, R> {
    /// Allocate a `DynArr<T>` and move `value`'s items into it.
    fn from(value: [T; N]) -> Self {
        let mut res = Self::with_capacity_in(N, A::default());
        unsafe {
            let value = ManuallyDrop::new(value);
            ptr::copy_nonoverlapping(value.as_ptr(), res.as_mut_ptr(), N);
            res.set_len(N);
        }
        res
    }
}

impl<A: Allocator + Default, R: ReserveStrategy> From<&str> for DynArr<u8, A, R> {
    fn from(value: &str) -> Self {
        From::from(value.as_bytes())
    }
}

static_assertions::assert_impl_all!(DynArr<u32>: Send, Sync);
static_assertions::assert_not_impl_any!(DynArr<std::rc::Rc<u32>>: Send, Sync);
static_assertions::assert_eq_size!(DynArr<u8>, [usize; 3]);

//------------------------------------------------------------------------------------------------------------------------------

/// Creates a [`DynArr`] containing the arguments, using the system allocator.
///
/// - Create an empty `DynArr`: `dynarr![]`
/// - Create a `DynArr` containing a given list of elements: `dynarr![1, 2, 3]`
/// - Create a `DynArr` from a given element and size: `dynarr![1; 3]`
///
/// [`DynArr`]: crate::collections::DynArr
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::<_>::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::<_>::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::collections::DynArr::<_>::from([$($x),+])
    };
}
