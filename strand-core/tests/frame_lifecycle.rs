//! Frame storage lifecycle across arbitrary resume/drop schedules.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;
use proptest::prelude::*;
use strand_core::test_utils::CountingAlloc;
use strand_core::{Frame, FrameState};

/// Suspends exactly once.
struct Pause(bool);

impl Future for Pause {
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

fn body(steps: usize) -> impl Future<Output = usize> + 'static {
    async move {
        let mut acc = [0_usize; 8];
        for i in 0..steps {
            acc[i % 8] += i;
            Pause(false).await;
        }
        acc.iter().sum()
    }
}

/// Drives a frame `resumes` times and reports the state it ends in.
fn drive(frame: &mut Frame<usize, Arc<CountingAlloc>>, resumes: usize) -> FrameState {
    let mut cx = Context::from_waker(noop_waker_ref());
    let mut state = FrameState::Created;
    for _ in 0..resumes {
        match frame.resume(&mut cx) {
            Poll::Pending => state = FrameState::Suspended,
            Poll::Ready(Ok(_)) => return FrameState::Completed,
            Poll::Ready(Err(_)) => return FrameState::Failed,
        }
    }
    state
}

#[test]
fn finished_frame_reports_sum() {
    let alloc = Arc::new(CountingAlloc::new());
    let mut frame = Frame::new_in(body(4), Arc::clone(&alloc));
    let mut cx = Context::from_waker(noop_waker_ref());
    for _ in 0..4 {
        assert!(frame.resume(&mut cx).is_pending());
    }
    assert_eq!(frame.resume(&mut cx), Poll::Ready(Ok(6)));
}

proptest! {
    #[test]
    fn storage_always_returned(schedule in prop::collection::vec((0usize..6, 0usize..8), 1..16)) {
        let alloc = Arc::new(CountingAlloc::new());
        let mut frames = Vec::new();
        for (steps, resumes) in &schedule {
            let mut frame = Frame::new_in(body(*steps), Arc::clone(&alloc));
            let state = drive(&mut frame, (*resumes).min(*steps + 1));
            prop_assert_ne!(state, FrameState::Failed);
            frames.push(frame);
        }
        prop_assert_eq!(alloc.allocations(), schedule.len());
        drop(frames);
        prop_assert_eq!(alloc.deallocations(), schedule.len());
        prop_assert_eq!(alloc.live_bytes(), 0);
    }
}
