//! Owned storage for one suspended computation.

use std::alloc::{Layout, handle_alloc_error};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::ptr::NonNull;
use std::task::{Context, Poll};

use crate::alloc::{FrameAllocator, Global};
use crate::error::Panicked;

/// A suspended computation placed in allocator-provided storage.
///
/// The frame owns a type-erased `Future` that never moves once placed. It is
/// resumed with [`resume`](Self::resume) and torn down, along with its
/// storage, when the frame is dropped. Dropping a frame that never finished
/// runs the destructors of everything live at its suspension point.
///
/// Frames are neither `Send` nor `Sync`: a suspended computation is resumed
/// from the context that owns it.
pub struct Frame<O, A: FrameAllocator = Global> {
    future: NonNull<dyn Future<Output = O>>,
    alloc: A,
    _owns: PhantomData<Box<dyn Future<Output = O>>>,
}

impl<O> Frame<O, Global> {
    /// Place `future` in storage from the global allocator.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = O> + 'static,
    {
        Self::new_in(future, Global)
    }
}

impl<O, A: FrameAllocator> Frame<O, A> {
    /// Place `future` in storage from `alloc`.
    ///
    /// Zero-sized futures never touch the allocator. An allocator that
    /// returns null aborts through [`handle_alloc_error`].
    pub fn new_in<F>(future: F, alloc: A) -> Self
    where
        F: Future<Output = O> + 'static,
    {
        let layout = Layout::new::<F>();
        let raw: *mut F = if layout.size() == 0 {
            NonNull::<F>::dangling().as_ptr()
        } else {
            let ptr = alloc.allocate(layout);
            if ptr.is_null() {
                handle_alloc_error(layout);
            }
            ptr.cast::<F>()
        };
        // SAFETY: `raw` is aligned for `F` and valid for one write of it.
        unsafe { raw.write(future) };
        let erased: *mut dyn Future<Output = O> = raw;
        tracing::trace!(size = layout.size(), align = layout.align(), "frame placed");
        Self {
            // SAFETY: both branches above produce a non-null pointer.
            future: unsafe { NonNull::new_unchecked(erased) },
            alloc,
            _owns: PhantomData,
        }
    }

    /// Run the computation until its next suspension point or its end.
    ///
    /// A panic inside the body is caught and returned as [`Panicked`]. The
    /// caller must not resume a frame again after it returned `Ready`.
    pub fn resume(&mut self, cx: &mut Context<'_>) -> Poll<Result<O, Panicked>> {
        // SAFETY: the future stays at this address until the frame drops,
        // and `&mut self` rules out aliasing.
        let future = unsafe { Pin::new_unchecked(self.future.as_mut()) };
        match catch_unwind(AssertUnwindSafe(|| future.poll(cx))) {
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => Poll::Ready(Err(Panicked::from_payload(payload))),
        }
    }

    /// Size in bytes of the stored computation.
    pub fn size(&self) -> usize {
        // SAFETY: the pointee is live for as long as the frame.
        unsafe { Layout::for_value(self.future.as_ref()) }.size()
    }

    /// The policy this frame's storage came from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<O, A: FrameAllocator> Drop for Frame<O, A> {
    fn drop(&mut self) {
        let ptr = self.future.as_ptr();
        // SAFETY: the pointee is live; its layout is read before it is dropped
        // and the value is dropped exactly once.
        unsafe {
            let layout = Layout::for_value(&*ptr);
            std::ptr::drop_in_place(ptr);
            if layout.size() != 0 {
                self.alloc.deallocate(ptr.cast::<u8>(), layout);
            }
        }
    }
}

impl<O, A: FrameAllocator + fmt::Debug> fmt::Debug for Frame<O, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.size())
            .field("alloc", &self.alloc)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CountingAlloc;
    use futures::task::noop_waker_ref;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    /// Suspends exactly once.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();
        fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                Poll::Pending
            }
        }
    }

    fn frame_should_explode() -> bool {
        true
    }

    fn cx() -> Context<'static> {
        Context::from_waker(noop_waker_ref())
    }

    #[test]
    fn resumes_to_completion() {
        let mut frame = Frame::new(async {
            YieldOnce(false).await;
            YieldOnce(false).await;
            7
        });
        let mut cx = cx();
        assert!(frame.resume(&mut cx).is_pending());
        assert!(frame.resume(&mut cx).is_pending());
        assert_eq!(frame.resume(&mut cx), Poll::Ready(Ok(7)));
    }

    #[test]
    fn panic_is_caught() {
        let mut frame = Frame::new(async {
            YieldOnce(false).await;
            if frame_should_explode() {
                panic!("body exploded");
            }
            1
        });
        let mut cx = cx();
        assert!(frame.resume(&mut cx).is_pending());
        match frame.resume(&mut cx) {
            Poll::Ready(Err(p)) => assert_eq!(p.message, "body exploded"),
            other => panic!("expected a caught panic, got {other:?}"),
        }
    }

    #[test]
    fn storage_returns_to_its_allocator() {
        let alloc = Arc::new(CountingAlloc::new());
        let mut frame = Frame::new_in(
            async {
                let buf = [1_u8; 64];
                YieldOnce(false).await;
                buf.len()
            },
            Arc::clone(&alloc),
        );
        assert_eq!(alloc.allocations(), 1);
        assert!(alloc.live_bytes() >= 64);
        assert!(frame.size() >= 64);
        assert!(frame.resume(&mut cx()).is_pending());
        drop(frame);
        assert_eq!(alloc.deallocations(), 1);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn dropping_suspended_frame_runs_destructors() {
        struct Guard(Rc<Cell<bool>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let guard = Guard(Rc::clone(&dropped));
        let mut frame = Frame::new(async move {
            let _guard = guard;
            YieldOnce(false).await;
        });
        assert!(frame.resume(&mut cx()).is_pending());
        assert!(!dropped.get());
        drop(frame);
        assert!(dropped.get());
    }

    #[test]
    fn zero_sized_frames_skip_the_allocator() {
        let alloc = Arc::new(CountingAlloc::new());
        struct Immediate;
        impl Future for Immediate {
            type Output = ();
            fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
                Poll::Ready(())
            }
        }

        let frame = Frame::new_in(Immediate, Arc::clone(&alloc));
        assert_eq!(frame.size(), 0);
        drop(frame);
        assert_eq!(alloc.allocations(), 0);
        assert_eq!(alloc.deallocations(), 0);
    }
}
