//! Memory allocation policies for buffers.
//!
//! This module provides strategy traits that control how memory is allocated and aligned.

use std::{alloc::Layout, ptr::NonNull};

/// Strategy for initializing allocated memory.
pub trait InitStrategy {
    /// Whether debug builds fill fresh allocations with a poison pattern.
    const POISON: bool;

    /// Allocates `layout` with the global allocator according to the
    /// strategy's initialization policy.
    ///
    /// Returns `None` if the allocation fails.
    ///
    /// # Safety
    ///
    /// `layout` must have a non-zero size.
    unsafe fn allocate(layout: Layout) -> Option<NonNull<u8>>;
}

/// Strategy for determining memory alignment requirements.
///
/// All alignment calculations are performed at compile time.
pub trait AlignmentStrategy {
    /// Returns the required memory alignment for type `T`, always a power of two.
    fn alignment<T>() -> usize;
}

/// SIMD-optimized alignment strategy.
///
/// - **`ARM64 with NEON`** (or the `neon` feature): 16-byte alignment
/// - **`x86/x86_64 with AVX2`** (or the `avx2` feature): 32-byte alignment
/// - **Fallback**: `align_of::<T>()`
///
/// Never below `align_of::<T>()`.
pub struct SimdAlignment;

/// 16-byte alignment for ARM NEON SIMD operations.
const NEON_ALIGN: usize = 16;

/// 32-byte alignment for x86 AVX2 SIMD operations.
const AVX2_ALIGN: usize = 32;

impl AlignmentStrategy for SimdAlignment {
    fn alignment<T>() -> usize {
        let simd = if cfg!(any(
            feature = "avx2",
            all(
                target_feature = "avx2",
                any(target_arch = "x86", target_arch = "x86_64")
            )
        )) {
            AVX2_ALIGN
        } else if cfg!(any(
            feature = "neon",
            all(target_feature = "neon", target_arch = "aarch64")
        )) {
            NEON_ALIGN
        } else {
            1
        };
        let ret = simd.max(std::mem::align_of::<T>());
        debug_assert!(ret.is_power_of_two());
        ret
    }
}

/// Allocates without initializing; contents are undefined until written.
pub struct Uninitialized;

impl InitStrategy for Uninitialized {
    const POISON: bool = true;

    unsafe fn allocate(layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: the caller guarantees a non-zero sized layout.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }
}
