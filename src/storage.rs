//! Initialized element container [`Storage`] over an aligned [`Buffer`].

use crate::memory::{Buffer, BufferBuilder};

/// `Storage<T>` is a partially-initialized memory container.
///
/// It wraps [`Buffer<T>`], which handles allocation and layout.
/// The uninitialized tail (if any) of the `Buffer` is never exposed directly.
pub struct Storage<T> {
    buffer: Buffer<T>,
    /// The number of elements guaranteed to be initialized.
    init: usize,
}

impl<T> Storage<T> {
    /// Creates storage for `numel` elements; nothing is initialized yet.
    pub fn new(numel: usize) -> Self {
        let buffer: Buffer<T> = BufferBuilder::new(numel).build();
        Self { buffer, init: 0 }
    }

    /// Builds storage holding every item of `iter`, which must yield exactly `numel` items.
    ///
    /// # Panics
    ///
    /// Panics if the iterator yields a different number of items.
    pub fn from_iter_exact(numel: usize, iter: impl IntoIterator<Item = T>) -> Self {
        let mut storage = Self::new(numel);
        for value in iter {
            assert!(
                storage.init < storage.allocated_len(),
                "iterator yielded more than {numel} items"
            );
            // SAFETY: `init < allocated_len()` checked above.
            unsafe { storage.write_unchecked(value) };
        }
        assert_eq!(storage.init, numel, "iterator yielded too few items");
        storage
    }

    /// Returns a reference to the element at `index` if it has been initialized.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Writes a value to the next uninitialized slot, extending `init` by 1.
    ///
    /// # Safety
    ///
    /// `init < allocated_len()` must hold.
    pub unsafe fn write_unchecked(&mut self, value: T) {
        debug_assert!(self.init < self.allocated_len());
        // SAFETY:
        // - `self.as_mut_ptr()` is a valid, non-null, aligned pointer.
        // - `self.init` < `self.allocated_len()`
        unsafe {
            std::ptr::write(self.as_mut_ptr().add(self.init), value);
        }
        self.init += 1;
    }

    /// Returns the number of initialized elements.
    pub fn len(&self) -> usize {
        self.init
    }

    /// Returns the number of elements the buffer was originally allocated for.
    pub fn allocated_len(&self) -> usize {
        self.buffer.numel()
    }

    pub fn is_empty(&self) -> bool {
        self.init == 0
    }

    /// Capacity in elements, accounting for alignment padding.
    pub fn capacity(&self) -> usize {
        self.buffer.allocated_capacity()
    }

    pub fn as_ptr(&self) -> *const T {
        self.buffer.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buffer.as_mut_ptr()
    }

    /// Returns a shared slice of all initialized elements `[0, init)`.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY:
        // - `self.as_ptr()` is a valid non-null, aligned pointer to
        //   allocated memory.
        // - `self.init` is a valid number of initialized elements
        //   within the allocated region.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.init) }
    }

    /// Returns a mutable slice of all initialized elements `[0, init)`.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY:
        // - `self.as_mut_ptr()` is a valid non-null, aligned pointer to
        //   allocated memory.
        // - `self.init` is a valid number of initialized elements
        //   within the allocated region.
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.init) }
    }
}

impl<T: Clone> Storage<T> {
    /// Clones each element of `slice` into fresh storage.
    pub fn from_slice(slice: &[T]) -> Self {
        Self::from_iter_exact(slice.len(), slice.iter().cloned())
    }

    /// Storage of `numel` elements, each cloned from `value`.
    pub fn filled_with(numel: usize, value: T) -> Self {
        Self::from_iter_exact(numel, std::iter::repeat_n(value, numel))
    }
}

impl<T: Clone> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> Drop for Storage<T> {
    fn drop(&mut self) {
        // SAFETY:
        // - `as_mut_slice` covers exactly the initialized elements.
        // - they are never read again after this point.
        unsafe {
            std::ptr::drop_in_place(self.as_mut_slice());
        }
    }
}
