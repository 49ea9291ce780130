use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    mem,
    ops::{Index, Range, RangeBounds},
};

use crate::alloc::{Allocator, Mallocator};

use super::{dynarr::to_range, imp::handle_error, DynArr, OutOfRangeError, TryReserveError};

const BITS_PER_WORD : usize = u64::BITS as usize;

static TRUE  : bool = true;
static FALSE : bool = false;

/// Number of words needed to store `len` bits
const fn words_for(len: usize) -> usize {
    len / BITS_PER_WORD + (len % BITS_PER_WORD != 0) as usize
}

/// Word index and bit index within that word
const fn indices(idx: usize) -> (usize, u32) {
    (idx / BITS_PER_WORD, (idx % BITS_PER_WORD) as u32)
}

/// A growable array of bits, packed into 64-bit words.
///
/// This is the boolean counterpart of [`DynArr`]: every bit takes up a single bit of storage instead of a byte.
/// Since a single bit has no address, mutable element access goes through a [`BitRef`] proxy,
/// and there is no access to the underlying buffer.
///
/// Bits past `len` in the last word are always 0, so equal sequences have equal storage, and hash the same.
///
/// # Examples
///
/// ```
/// use strata_common::bitdynarr;
///
/// let mut bits = bitdynarr![false, true, false, true];
/// bits.flip();
/// assert_eq!(bits, bitdynarr![true, false, true, false]);
///
/// bits.bit(1).set(true);
/// assert_eq!(bits.to_string(), "1110");
/// ```
pub struct BitDynArr<A: Allocator = Mallocator> {
    words : DynArr<u64, A>,
    len   : usize,
}

impl BitDynArr {
    /// Create an empty bit array using the system allocator
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Mallocator)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Mallocator)
    }

    /// Create a bit array of `n` bits with the value `bit`
    pub fn from_elem(bit: bool, n: usize) -> Self {
        Self::from_elem_in(bit, n, Mallocator)
    }
}

impl<A: Allocator> BitDynArr<A> {
    /// Create an empty bit array with the provided allocator
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { words: DynArr::new_in(alloc), len: 0 }
    }

    /// Create an empty bit array that can hold at least `capacity` bits without reallocating
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self { words: DynArr::with_capacity_in(words_for(capacity), alloc), len: 0 }
    }

    /// Create an empty bit array that can hold at least `capacity` bits, returning an error if the memory could not be allocated
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        Ok(Self { words: DynArr::try_with_capacity_in(words_for(capacity), alloc)?, len: 0 })
    }

    pub fn from_elem_in(bit: bool, n: usize, alloc: A) -> Self {
        match Self::try_from_elem_in(bit, n, alloc) {
            Ok(res) => res,
            Err(err) => handle_error(err),
        }
    }

    /// Create a bit array of `n` bits with the value `bit`, returning an error if the memory could not be allocated
    pub fn try_from_elem_in(bit: bool, n: usize, alloc: A) -> Result<Self, TryReserveError> {
        let word = if bit { u64::MAX } else { 0 };
        let mut res = Self { words: DynArr::try_from_elem_in(word, words_for(n), alloc)?, len: n };
        res.clear_unused_bits();
        Ok(res)
    }

    /// Number of bits in the array
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits the array can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.words.capacity().saturating_mul(BITS_PER_WORD)
    }

    /// Returns a reference to the underlying allocator.
    pub fn allocator(&self) -> &A {
        self.words.allocator()
    }

    /// Reserve capacity for at least `additional` more bits.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            handle_error(err);
        }
    }

    /// Try to reserve capacity for at least `additional` more bits.
    ///
    /// # Errors
    ///
    /// Returns `CapacityOverflow` if the capacity in bits would not fit in a `usize`, or `AllocError` if the allocator failed.
    /// On failure, the bit array is left unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = self.len.checked_add(additional).ok_or(TryReserveError::CapacityOverflow)?;
        let needed_words = words_for(needed);
        if needed_words.checked_mul(BITS_PER_WORD).is_none() {
            return Err(TryReserveError::CapacityOverflow);
        }
        self.words.try_reserve(needed_words - self.words.len())
    }

    pub fn shrink_to_fit(&mut self) {
        self.words.shrink_to_fit();
    }

    /// Get the value of the bit at `idx`, or `None` if it is out of range
    pub fn get(&self, idx: usize) -> Option<bool> {
        if idx < self.len {
            Some(self.get_unchecked(idx))
        } else {
            None
        }
    }

    /// Get the value of the bit at `idx`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `idx >= len`.
    pub fn try_get(&self, idx: usize) -> Result<bool, OutOfRangeError> {
        self.get(idx).ok_or(OutOfRangeError { index: idx, len: self.len })
    }

    /// Set the bit at `idx` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[track_caller]
    pub fn set(&mut self, idx: usize, value: bool) {
        self.bit(idx).set(value);
    }

    /// Get a proxy to the bit at `idx`.
    ///
    /// # Errors
    ///
    /// Returns an [`OutOfRangeError`] if `idx >= len`.
    pub fn at(&mut self, idx: usize) -> Result<BitRef<'_>, OutOfRangeError> {
        if idx < self.len {
            Ok(self.bit_ref(idx))
        } else {
            Err(OutOfRangeError { index: idx, len: self.len })
        }
    }

    /// Get a proxy to the bit at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[track_caller]
    pub fn bit(&mut self, idx: usize) -> BitRef<'_> {
        if idx >= self.len {
            out_of_range_failed(idx, self.len);
        }
        self.bit_ref(idx)
    }

    /// Get a proxy to the first bit, or `None` if the array is empty
    pub fn front(&mut self) -> Option<BitRef<'_>> {
        self.at(0).ok()
    }

    /// Get a proxy to the last bit, or `None` if the array is empty
    pub fn back(&mut self) -> Option<BitRef<'_>> {
        let last = self.len.checked_sub(1)?;
        self.at(last).ok()
    }

    /// Append a bit
    pub fn push(&mut self, value: bool) {
        if let Err(err) = self.try_push(value) {
            handle_error(err);
        }
    }

    /// Append a bit, returning an error if the memory for it could not be allocated.
    ///
    /// On failure, the bit array is left unchanged.
    pub fn try_push(&mut self, value: bool) -> Result<(), TryReserveError> {
        let (word_idx, bit_idx) = indices(self.len);
        if bit_idx == 0 {
            self.words.try_push(0)?;
        }
        self.words[word_idx] |= (value as u64) << bit_idx;
        self.len += 1;
        Ok(())
    }

    /// Remove the last bit and return it, or `None` if the array is empty
    pub fn pop(&mut self) -> Option<bool> {
        let last = self.len.checked_sub(1)?;
        let value = self.get_unchecked(last);
        self.truncate(last);
        Some(value)
    }

    /// Insert a bit at `idx`, shifting all bits after it up by one.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`
    #[track_caller]
    pub fn insert(&mut self, idx: usize, value: bool) {
        if let Err(err) = self.try_insert(idx, value) {
            handle_error(err);
        }
    }

    /// Insert a bit at `idx`, returning an error if the memory for it could not be allocated.
    ///
    /// On failure, the bit array is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`
    #[track_caller]
    pub fn try_insert(&mut self, idx: usize, value: bool) -> Result<(), TryReserveError> {
        if idx > self.len {
            panic!("insertion index (is {idx}) should be <= len (is {})", self.len);
        }

        self.try_push(false)?;

        let (word_idx, bit_idx) = indices(idx);
        let words = self.words.as_mut_slice();
        for cur in (word_idx + 1..words.len()).rev() {
            words[cur] = (words[cur] << 1) | (words[cur - 1] >> (BITS_PER_WORD - 1));
        }

        let low_mask = (1u64 << bit_idx) - 1;
        let word = words[word_idx];
        words[word_idx] = (word & low_mask) | ((word & !low_mask) << 1) | ((value as u64) << bit_idx);
        Ok(())
    }

    /// Insert all bits in `bits` at `idx`, shifting all bits after it up.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len`
    #[track_caller]
    pub fn insert_slice(&mut self, idx: usize, bits: &[bool]) {
        if idx > self.len {
            panic!("insertion index (is {idx}) should be <= len (is {})", self.len);
        }

        let old_len = self.len;
        self.resize(old_len + bits.len(), false);
        for src in (idx..old_len).rev() {
            let value = self.get_unchecked(src);
            self.bit_ref(src + bits.len()).set(value);
        }
        for (offset, &value) in bits.iter().enumerate() {
            self.bit_ref(idx + offset).set(value);
        }
    }

    /// Remove the bit at `idx` and return it, shifting all bits after it down by one.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[track_caller]
    pub fn remove(&mut self, idx: usize) -> bool {
        if idx >= self.len {
            out_of_range_failed(idx, self.len);
        }
        let value = self.get_unchecked(idx);

        let (word_idx, bit_idx) = indices(idx);
        let words = self.words.as_mut_slice();

        let low_mask = (1u64 << bit_idx) - 1;
        let word = words[word_idx];
        words[word_idx] = (word & low_mask) | ((word >> 1) & !low_mask);
        for cur in word_idx + 1..words.len() {
            words[cur - 1] |= words[cur] << (BITS_PER_WORD - 1);
            words[cur] >>= 1;
        }

        // The last bit is 0 now, so this only drops an empty word when needed
        self.truncate(self.len - 1);
        value
    }

    /// Remove the bits in `range`, shifting all bits after it down.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than the end, or if the end is greater than the length.
    #[track_caller]
    pub fn erase<RA: RangeBounds<usize>>(&mut self, range: RA) {
        let Range { start, end } = to_range(range, self.len);
        if start == end {
            return;
        }

        for src in end..self.len {
            let value = self.get_unchecked(src);
            self.bit_ref(start + src - end).set(value);
        }
        self.truncate(self.len - (end - start));
    }

    /// Shorten the array to `len` bits, this has no effect when `len` is greater or equal to the current length
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.words.truncate(words_for(len));
        self.clear_unused_bits();
    }

    /// Resize the array to `new_len` bits, new bits get the value `value`.
    pub fn resize(&mut self, new_len: usize, value: bool) {
        if let Err(err) = self.try_resize(new_len, value) {
            handle_error(err);
        }
    }

    /// The same as [`resize`](BitDynArr::resize), but returns an error instead of panicking when the memory could not be allocated.
    ///
    /// On failure, the bit array is left unchanged.
    pub fn try_resize(&mut self, new_len: usize, value: bool) -> Result<(), TryReserveError> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_reserve(new_len - self.len)?;
        // Capacity is reserved, nothing below allocates.
        // Fill up the last partial word bit by bit, then add whole words
        while self.len < new_len && self.len % BITS_PER_WORD != 0 {
            self.push(value);
        }
        let word = if value { u64::MAX } else { 0 };
        self.words.resize(words_for(new_len), word);
        self.len = new_len;
        self.clear_unused_bits();
        Ok(())
    }

    /// Remove all bits, the capacity is kept
    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    /// Exchange the contents of two bit arrays, including their allocators.
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Invert every bit in the array
    pub fn flip(&mut self) {
        for word in self.words.iter_mut() {
            *word = !*word;
        }
        self.clear_unused_bits();
    }

    /// Exchange the values of the bits at `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[track_caller]
    pub fn swap_bits(&mut self, a: usize, b: usize) {
        let bit_a = self.bit(a).get();
        let bit_b = self.bit(b).get();
        self.bit(a).set(bit_b);
        self.bit(b).set(bit_a);
    }

    /// Number of bits that are set
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Number of bits that are not set
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Check if any bit is set
    pub fn any(&self) -> bool {
        self.words.iter().any(|&word| word != 0)
    }

    /// Check if all bits are set, this is `true` for an empty array
    pub fn all(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Iterate over the values of all bits
    pub fn iter(&self) -> Iter<'_, A> {
        Iter { arr: self, front: 0, back: self.len }
    }

    fn get_unchecked(&self, idx: usize) -> bool {
        let (word_idx, bit_idx) = indices(idx);
        (self.words[word_idx] >> bit_idx) & 1 == 1
    }

    fn bit_ref(&mut self, idx: usize) -> BitRef<'_> {
        let (word_idx, bit_idx) = indices(idx);
        BitRef { word: &mut self.words[word_idx], bit: bit_idx }
    }

    /// Zero the bits past `len` in the last word
    fn clear_unused_bits(&mut self) {
        let (_, used) = indices(self.len);
        if used != 0 {
            if let Some(last) = self.words.back_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

#[cold]
#[track_caller]
fn out_of_range_failed(idx: usize, len: usize) -> ! {
    panic!("bit index (is {idx}) should be < len (is {len})");
}

//------------------------------------------------------------------------------------------------------------------------------

/// Proxy to a single bit in a [`BitDynArr`].
///
/// Reads and writes go straight to the word containing the bit.
pub struct BitRef<'a> {
    word : &'a mut u64,
    bit  : u32,
}

impl BitRef<'_> {
    /// Get the value of the bit
    pub fn get(&self) -> bool {
        (*self.word >> self.bit) & 1 == 1
    }

    /// Set the value of the bit
    pub fn set(&mut self, value: bool) {
        let mask = 1u64 << self.bit;
        if value {
            *self.word |= mask;
        } else {
            *self.word &= !mask;
        }
    }

    /// Invert the bit and return its new value
    pub fn flip(&mut self) -> bool {
        *self.word ^= 1u64 << self.bit;
        self.get()
    }
}

impl From<BitRef<'_>> for bool {
    fn from(bit: BitRef<'_>) -> Self {
        bit.get()
    }
}

impl PartialEq<bool> for BitRef<'_> {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl fmt::Debug for BitRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl fmt::Display for BitRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Iterator over the bits of a [`BitDynArr`]
pub struct Iter<'a, A: Allocator = Mallocator> {
    arr   : &'a BitDynArr<A>,
    front : usize,
    back  : usize,
}

impl<A: Allocator> Iterator for Iter<'_, A> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.front == self.back {
            None
        } else {
            let value = self.arr.get_unchecked(self.front);
            self.front += 1;
            Some(value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<A: Allocator> DoubleEndedIterator for Iter<'_, A> {
    fn next_back(&mut self) -> Option<bool> {
        if self.front == self.back {
            None
        } else {
            self.back -= 1;
            Some(self.arr.get_unchecked(self.back))
        }
    }
}

impl<A: Allocator> ExactSizeIterator for Iter<'_, A> {}

impl<A: Allocator> FusedIterator for Iter<'_, A> {}

impl<'a, A: Allocator> IntoIterator for &'a BitDynArr<A> {
    type Item = bool;
    type IntoIter = Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//------------------------------------------------------------------------------------------------------------------------------

impl<A: Allocator> Index<usize> for BitDynArr<A> {
    type Output = bool;

    #[track_caller]
    fn index(&self, idx: usize) -> &bool {
        match self.get(idx) {
            Some(true) => &TRUE,
            Some(false) => &FALSE,
            None => out_of_range_failed(idx, self.len),
        }
    }
}

impl<A: Allocator + Clone> Clone for BitDynArr<A> {
    fn clone(&self) -> Self {
        Self { words: self.words.clone(), len: self.len }
    }

    fn clone_from(&mut self, source: &Self) {
        self.words.clone_from(&source.words);
        self.len = source.len;
    }
}

impl<A: Allocator + Default> Default for BitDynArr<A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<A: Allocator> Hash for BitDynArr<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.words.hash(state);
    }
}

impl<A0: Allocator, A1: Allocator> PartialEq<BitDynArr<A1>> for BitDynArr<A0> {
    fn eq(&self, other: &BitDynArr<A1>) -> bool {
        self.len == other.len && self.words == other.words
    }
}

impl<A: Allocator> Eq for BitDynArr<A> {}

impl<A0: Allocator, A1: Allocator> PartialOrd<BitDynArr<A1>> for BitDynArr<A0> {
    fn partial_cmp(&self, other: &BitDynArr<A1>) -> Option<Ordering> {
        Some(self.iter().cmp(other.iter()))
    }
}

impl<A: Allocator> Ord for BitDynArr<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<A: Allocator> fmt::Debug for BitDynArr<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Formats the bits as a string of `0`s and `1`s, starting with the first bit
impl<A: Allocator> fmt::Display for BitDynArr<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl<A: Allocator + Default> FromIterator<bool> for BitDynArr<A> {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut res = Self::default();
        res.extend(iter);
        res
    }
}

impl<A: Allocator> Extend<bool> for BitDynArr<A> {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for bit in iter {
            self.push(bit);
        }
    }
}

impl<A: Allocator + Default> From<&[bool]> for BitDynArr<A> {
    fn from(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }
}

impl<A: Allocator + Default, const N: usize> From<[bool; N]> for BitDynArr<A> {
    fn from(bits: [bool; N]) -> Self {
        bits.into_iter().collect()
    }
}

static_assertions::assert_impl_all!(BitDynArr: Send, Sync);
static_assertions::assert_eq_size!(BitDynArr, [usize; 4]);

//------------------------------------------------------------------------------------------------------------------------------

/// Creates a [`BitDynArr`] containing the arguments, using the system allocator.
///
/// - Create an empty `BitDynArr`: `bitdynarr![]`
/// - Create a `BitDynArr` containing a given list of bits: `bitdynarr![true, false]`
/// - Create a `BitDynArr` from a given bit and size: `bitdynarr![true; 3]`
///
/// [`BitDynArr`]: crate::collections::BitDynArr
#[macro_export]
macro_rules! bitdynarr {
    () => {
        $crate::collections::BitDynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::BitDynArr::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::collections::BitDynArr::<$crate::alloc::Mallocator>::from([$($x),+])
    };
}

#[cfg(test)]
mod tests {
    use std::collections::{hash_map::DefaultHasher, HashSet};

    use proptest::prelude::*;

    use super::*;
    use crate::{alloc::*, bitdynarr};

    fn hash_of(bits: &BitDynArr<impl Allocator>) -> u64 {
        let mut hasher = DefaultHasher::new();
        bits.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn push_get_pop() {
        let mut bits = BitDynArr::new();
        for i in 0..150 {
            bits.push(i % 3 == 0);
        }
        assert_eq!(bits.len(), 150);
        assert_eq!(bits.get(3), Some(true));
        assert_eq!(bits.get(4), Some(false));
        assert_eq!(bits.get(150), None);
        assert!(bits[147]);
        assert!(!bits[148]);

        assert_eq!(bits.pop(), Some(false));
        assert_eq!(bits.pop(), Some(false));
        assert_eq!(bits.pop(), Some(true));
        assert_eq!(bits.len(), 147);

        let mut empty = BitDynArr::new();
        assert_eq!(empty.pop(), None);
        assert!(empty.front().is_none());
        assert!(empty.back().is_none());
    }

    #[test]
    fn flip_scenario() {
        let mut bits = bitdynarr![false, true, false, true];
        bits.flip();
        assert_eq!(bits, bitdynarr![true, false, true, false]);
        assert_eq!(bits.to_string(), "1010");
    }

    #[test]
    fn proxy_reads_and_writes() {
        let mut bits = bitdynarr![false; 70];

        let mut bit = bits.at(65).unwrap();
        assert_eq!(bit, false);
        bit.set(true);
        assert_eq!(bit, true);
        assert!(!bit.flip());
        assert!(bit.flip());
        assert!(bool::from(bit));
        assert!(bits[65]);

        bits.set(0, true);
        assert!(bits.front().unwrap().get());
        bits.back().unwrap().set(true);
        assert!(bits[69]);
        assert_eq!(bits.count_ones(), 3);

        assert_eq!(bits.at(70).err(), Some(OutOfRangeError { index: 70, len: 70 }));
    }

    #[test]
    #[should_panic(expected = "bit index (is 4) should be < len (is 4)")]
    fn index_out_of_range_panics() {
        let bits = bitdynarr![true; 4];
        let _bit = bits[4];
    }

    #[test]
    fn insert_and_remove_across_words() {
        let mut bits = BitDynArr::from_elem(true, 64);
        bits.insert(0, false);
        assert_eq!(bits.len(), 65);
        assert!(!bits[0]);
        assert!(bits[64]);
        assert_eq!(bits.count_ones(), 64);

        bits.insert(65, false);
        bits.insert(30, false);
        assert_eq!(bits.len(), 67);
        assert_eq!(bits.count_zeros(), 3);
        assert!(!bits[30]);
        assert!(!bits[66]);

        assert!(!bits.remove(30));
        assert!(!bits.remove(0));
        assert!(bits.remove(0));
        assert_eq!(bits.len(), 64);
        assert_eq!(bits.count_ones(), 63);
        assert!(!bits[63]);
    }

    #[test]
    fn erase_range() {
        let mut bits: BitDynArr = (0..100).map(|i| i % 2 == 0).collect();
        bits.erase(1..71);
        assert_eq!(bits.len(), 30);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[2]);
        assert_eq!(bits.count_ones(), 15);

        bits.erase(..);
        assert!(bits.is_empty());
    }

    #[test]
    fn insert_slice_in_the_middle() {
        let mut bits = bitdynarr![true, true, true];
        bits.insert_slice(1, &[false, true, false]);
        assert_eq!(bits.to_string(), "101011");

        bits.insert_slice(6, &[false; 70]);
        assert_eq!(bits.len(), 76);
        assert_eq!(bits.count_ones(), 4);
    }

    #[test]
    fn checked_read() {
        let bits = bitdynarr![true, false];
        assert_eq!(bits.try_get(0), Ok(true));
        assert_eq!(bits.try_get(1), Ok(false));
        assert_eq!(bits.try_get(2), Err(OutOfRangeError { index: 2, len: 2 }));
    }

    #[test]
    fn reserve_overflow_is_reported() {
        let mut bits = BitDynArr::new();
        bits.push(true);
        assert_eq!(bits.try_reserve(usize::MAX - 1), Err(TryReserveError::CapacityOverflow));
        assert_eq!(bits.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
        assert_eq!(bits.len(), 1);
        assert!(bits[0]);
    }

    #[test]
    fn allocation_failure_leaves_bits_unchanged() {
        let mut empty = BitDynArr::new_in(CappedAllocator::new(8));
        assert!(matches!(empty.try_push(true), Err(TryReserveError::AllocError(_))));
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 0);

        // 4 words fill the budget exactly
        let mut bits = BitDynArr::try_from_elem_in(true, 256, CappedAllocator::new(32)).unwrap();
        assert_eq!(bits.capacity(), 256);

        assert!(matches!(bits.try_push(false), Err(TryReserveError::AllocError(_))));
        assert!(matches!(bits.try_insert(3, false), Err(TryReserveError::AllocError(_))));
        assert!(matches!(bits.try_resize(300, false), Err(TryReserveError::AllocError(_))));
        assert_eq!(bits.len(), 256);
        assert!(bits.all());
        assert_eq!(bits, BitDynArr::from_elem(true, 256));

        assert_eq!(bits.try_resize(10, false), Ok(()));
        assert_eq!(bits.try_insert(3, false), Ok(()));
        assert_eq!(bits.to_string(), "11101111111");

        assert!(matches!(BitDynArr::try_from_elem_in(true, 1000, CappedAllocator::new(32)), Err(TryReserveError::AllocError(_))));
        assert!(matches!(BitDynArr::try_with_capacity_in(1000, CappedAllocator::new(32)), Err(TryReserveError::AllocError(_))));
    }

    #[test]
    fn resize_and_truncate_keep_tail_clear() {
        let mut bits = bitdynarr![true, false, true];
        bits.resize(130, true);
        assert_eq!(bits.len(), 130);
        assert_eq!(bits.count_ones(), 129);

        bits.resize(70, false);
        assert_eq!(bits.len(), 70);
        assert_eq!(bits.count_ones(), 69);

        // Growing again must not resurrect the truncated bits
        bits.resize(80, false);
        assert_eq!(bits.count_ones(), 69);

        bits.clear();
        assert!(bits.is_empty());
        assert!(!bits.any());
        assert!(bits.all());
    }

    #[test]
    fn swap_bits_and_swap_with() {
        let mut a = bitdynarr![true, false, false];
        a.swap_bits(0, 2);
        assert_eq!(a.to_string(), "001");

        let mut b = bitdynarr![true];
        a.swap_with(&mut b);
        assert_eq!(a.to_string(), "1");
        assert_eq!(b.to_string(), "001");
    }

    #[test]
    fn hashing_in_a_set() {
        let mut set = HashSet::new();
        set.insert(bitdynarr![true, false, true]);
        set.insert(bitdynarr![true, false]);

        let mut built = BitDynArr::new();
        built.push(true);
        built.push(false);
        built.push(true);
        assert!(set.contains(&built));

        // Same content after going through a longer array
        let mut long = BitDynArr::from_elem(true, 100);
        long.truncate(3);
        long.set(1, false);
        assert_eq!(hash_of(&long), hash_of(&built));
        assert!(set.contains(&long));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(bitdynarr![false, true] < bitdynarr![true]);
        assert!(bitdynarr![true] < bitdynarr![true, false]);
        assert_eq!(bitdynarr![true, true].cmp(&bitdynarr![true, true]), Ordering::Equal);
    }

    #[test]
    fn uses_the_provided_allocator() {
        let alloc = TracingAllocator::new();
        let mut bits = BitDynArr::new_in(alloc.clone());
        bits.resize(200, true);
        assert_eq!(alloc.trace().alloc_count(), 1);

        let copy = bits.clone();
        assert_eq!(copy, bits);
        assert_eq!(bits, BitDynArr::from_elem(true, 200));

        drop(bits);
        drop(copy);
        assert_eq!(alloc.trace().bytes_in_use(), 0);
    }

    #[test]
    fn formatting() {
        let bits = bitdynarr![true, false];
        assert_eq!(format!("{bits}"), "10");
        assert_eq!(format!("{bits:?}"), "[true, false]");
        assert_eq!(BitDynArr::new().to_string(), "");
    }

    proptest! {
        #[test]
        fn double_flip_restores(values in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut bits = BitDynArr::<Mallocator>::from(values.as_slice());
            let original = bits.clone();
            bits.flip();
            prop_assert_eq!(bits.count_ones(), original.count_zeros());
            bits.flip();
            prop_assert_eq!(&bits, &original);
        }

        #[test]
        fn equal_bits_hash_equal(values in proptest::collection::vec(any::<bool>(), 0..200)) {
            let a = BitDynArr::<Mallocator>::from(values.as_slice());
            let b: BitDynArr = values.iter().copied().collect();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }

        #[test]
        fn insert_remove_match_vec(values in proptest::collection::vec(any::<bool>(), 0..200), at in 0usize..200, value in any::<bool>()) {
            let at = at.min(values.len());
            let mut bits = BitDynArr::<Mallocator>::from(values.as_slice());
            let mut expected = values.clone();

            bits.insert(at, value);
            expected.insert(at, value);
            prop_assert!(bits.iter().eq(expected.iter().copied()));

            prop_assert_eq!(bits.remove(at), expected.remove(at));
            prop_assert!(bits.iter().eq(expected.iter().copied()));
            prop_assert_eq!(bits.len(), values.len());
        }
    }
}
