//! CountingAlloc — a frame allocator that records what it hands out.

use std::alloc::Layout;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alloc::{FrameAllocator, SystemAlloc};

/// Allocates through [`SystemAlloc`] and counts every block it serves.
///
/// Share it between frames with `Arc<CountingAlloc>` and inspect the
/// counters afterwards to prove frame storage was returned.
#[derive(Debug, Default)]
pub struct CountingAlloc {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl CountingAlloc {
    /// Create a new counting allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks handed out so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Blocks returned so far.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    /// Bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }
}

// SAFETY: every block comes from and goes back to `SystemAlloc`.
unsafe impl FrameAllocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> *mut u8 {
        let ptr = SystemAlloc.allocate(layout);
        if !ptr.is_null() {
            self.allocations.fetch_add(1, Ordering::SeqCst);
            self.live_bytes.fetch_add(layout.size(), Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
        // SAFETY: caller guarantees `ptr` came from `allocate` with `layout`.
        unsafe { SystemAlloc.deallocate(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_blocks_and_bytes() {
        let alloc = CountingAlloc::new();
        let layout = Layout::from_size_align(48, 8).unwrap();
        let a = alloc.allocate(layout);
        let b = alloc.allocate(layout);
        assert_eq!(alloc.allocations(), 2);
        assert_eq!(alloc.live_bytes(), 96);
        unsafe {
            alloc.deallocate(a, layout);
            alloc.deallocate(b, layout);
        }
        assert_eq!(alloc.deallocations(), 2);
        assert_eq!(alloc.live_bytes(), 0);
    }
}
