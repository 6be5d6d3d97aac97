use std::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::memory::policy::{AlignmentStrategy, InitStrategy, SimdAlignment, Uninitialized};

/// Fixed-size aligned allocation backing one tensor storage.
///
/// The allocation is padded up to a multiple of its alignment and the padding
/// is zeroed, so vector loads past the last element read zeros.
///
/// `Buffer` frees memory but never drops elements: which slots hold a live
/// `T` is tracked by [`crate::storage::Storage`].
#[derive(Debug)]
pub struct Buffer<T> {
    ptr: NonNull<T>,
    /// Elements requested, excluding padding.
    numel: usize,
    layout: Layout,
}

/// Chooses the init and alignment policies of a [`Buffer`].
///
/// ```
/// use symtensor::memory::{Buffer, BufferBuilder};
///
/// let buffer: Buffer<f32> = BufferBuilder::new(10).build();
/// assert_eq!(buffer.numel(), 10);
/// assert_eq!(buffer.as_ptr() as usize % align_of::<f32>(), 0);
/// ```
pub struct BufferBuilder<I, A>
where
    I: InitStrategy,
    A: AlignmentStrategy,
{
    numel: usize,
    _policies: PhantomData<(I, A)>,
}

impl BufferBuilder<Uninitialized, SimdAlignment> {
    pub fn new(numel: usize) -> Self {
        Self {
            numel,
            _policies: PhantomData,
        }
    }
}

impl<I: InitStrategy, A: AlignmentStrategy> BufferBuilder<I, A> {
    #[must_use]
    pub fn build<T>(self) -> Buffer<T> {
        Buffer::allocate::<I, A>(self.numel)
    }
}

/// Layout of `numel` elements rounded up to a multiple of `align`.
fn padded_layout<T>(numel: usize, align: usize) -> Layout {
    Layout::array::<T>(numel)
        .and_then(|l| l.align_to(align))
        .map(|l| l.pad_to_align())
        .unwrap_or_else(|e| panic!("no layout for {numel} elements aligned to {align}: {e}"))
}

impl<T> Buffer<T> {
    /// # Panics
    ///
    /// Panics for zero-sized `T` or `numel == 0`.
    fn allocate<I: InitStrategy, A: AlignmentStrategy>(numel: usize) -> Self {
        assert!(size_of::<T>() != 0, "zero-sized element types are not supported");
        assert!(numel != 0, "zero-sized buffers (numel=0) are not supported");

        let layout = padded_layout::<T>(numel, A::alignment::<T>());
        // SAFETY: `layout` covers at least one non-zero-sized element.
        let Some(ptr) = (unsafe { I::allocate(layout) }) else {
            std::alloc::handle_alloc_error(layout);
        };

        if cfg!(debug_assertions) && I::POISON {
            // SAFETY: `ptr` points to `layout.size()` writable bytes.
            unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0xAB, layout.size()) };
        }

        let used = numel * size_of::<T>();
        // SAFETY: `used <= layout.size()`, so the padding lies inside the allocation.
        unsafe { std::ptr::write_bytes(ptr.as_ptr().add(used), 0, layout.size() - used) };

        Buffer {
            ptr: ptr.cast(),
            numel,
            layout,
        }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Bytes allocated, padding included.
    #[inline]
    pub fn allocated_size_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Number of `T` that fit in the allocation, padding included.
    #[inline]
    pub fn allocated_capacity(&self) -> usize {
        self.layout.size() / size_of::<T>()
    }

    #[inline]
    pub fn numel(&self) -> usize {
        self.numel
    }
}

impl<T> Drop for Buffer<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` and `layout` are exactly what `allocate` obtained.
        unsafe { std::alloc::dealloc(self.ptr.as_ptr().cast(), self.layout) };
    }
}
