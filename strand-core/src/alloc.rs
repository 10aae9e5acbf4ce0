//! Allocation policies for frame storage.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::Arc;

/// Where the storage behind a [`Frame`](crate::Frame) comes from.
///
/// The policy only decides memory provenance; it has no say in what a
/// generator yields or what a task returns.
///
/// # Safety
///
/// `allocate` must return either null or a pointer to a fresh block that is
/// valid for reads and writes of `layout` until the block is handed back to
/// `deallocate` with the same layout. Frames never request zero-sized blocks.
pub unsafe trait FrameAllocator {
    /// Allocate a block for `layout`. A null return signals exhaustion.
    fn allocate(&self, layout: Layout) -> *mut u8;

    /// Return a block to this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have come from [`allocate`](Self::allocate) on this
    /// allocator with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout);
}

/// The process-wide Rust allocator. The default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards to the registered global allocator.
unsafe impl FrameAllocator for Global {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        // SAFETY: frames never ask for zero-sized blocks.
        unsafe { std::alloc::alloc(layout) }
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { std::alloc::dealloc(ptr, layout) }
    }
}

/// The operating-system allocator, bypassing any `#[global_allocator]`.
///
/// The stock "custom allocator" choice for
/// `CustomAllocatorGenerator` and `CustomAllocatorTask`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAlloc;

// SAFETY: forwards to `std::alloc::System`, which upholds the same contract.
unsafe impl FrameAllocator for SystemAlloc {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        // SAFETY: frames never ask for zero-sized blocks.
        unsafe { System.alloc(layout) }
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { System.dealloc(ptr, layout) }
    }
}

// SAFETY: delegates to the shared allocator.
unsafe impl<A: FrameAllocator + ?Sized> FrameAllocator for Arc<A> {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}

// SAFETY: delegates to the referenced allocator.
unsafe impl<A: FrameAllocator + ?Sized> FrameAllocator for &'static A {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
