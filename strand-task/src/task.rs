//! The eager task.

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;
use strand_core::{BoxError, Frame, FrameAllocator, FrameState, Global, Panicked, SystemAlloc};

use crate::error::TaskError;

type Continuation<T> = Box<dyn FnOnce(Settled<'_, T>)>;

// Write-once result slot. A failure stays in place so every reader sees it.
enum Slot<T> {
    Empty,
    Value(T),
    Taken,
    Failed(TaskError),
}

// What a continuation sees of a finished task.
enum Settled<'a, T> {
    // `None` once the value has been moved out by an await or `get_result`.
    Succeeded(Option<&'a T>),
    Failed(&'a TaskError),
}

/// A unit of asynchronous work that produces one `T` or fails.
///
/// The body starts running inside the constructor and runs until it
/// finishes or first suspends on something that is not ready. A suspended
/// task is driven further by awaiting it, by [`wait`](Self::wait), or by
/// calling [`resume`](Self::resume) explicitly.
///
/// A successful value is handed out once. A failure is handed to every
/// reader: awaiting a failed task again (through `&mut Task`) re-raises the
/// same error.
///
/// Continuations registered with [`then`](Self::then),
/// [`catching`](Self::catching) and [`finally`](Self::finally) run exactly
/// once, on the thread that completes the task, in registration order. The
/// outcome is stored before they run; a panicking continuation is logged
/// and does not stop the others.
///
/// Dropping an unfinished task tears its body down; nothing is leaked.
pub struct Task<T, A: FrameAllocator = Global> {
    frame: Option<Frame<Result<T, BoxError>, A>>,
    slot: Slot<T>,
    state: FrameState,
    continuations: Vec<Continuation<T>>,
}

/// A task whose suspended body lives in caller-chosen storage.
pub type CustomAllocatorTask<T, A = SystemAlloc> = Task<T, A>;

impl<T: 'static> Task<T> {
    /// Start `body` with its frame in the global allocator.
    pub fn new<F, E>(body: F) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
        E: Into<BoxError>,
    {
        Self::new_in(body, Global)
    }
}

impl<T: 'static, A: FrameAllocator> Task<T, A> {
    /// Start `body` with its frame in `alloc`.
    pub fn new_in<F, E>(body: F, alloc: A) -> Self
    where
        F: Future<Output = Result<T, E>> + 'static,
        E: Into<BoxError>,
    {
        let frame = Frame::new_in(async move { body.await.map_err(Into::into) }, alloc);
        let mut task = Self {
            frame: Some(frame),
            slot: Slot::Empty,
            state: FrameState::Created,
            continuations: Vec::new(),
        };
        task.resume();
        task
    }
}

impl<T, A: FrameAllocator> Task<T, A> {
    /// `true` once the body has finished, successfully or not.
    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Lifecycle state of the body.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Drive the body once more without an executor. Returns whether the
    /// task is now complete.
    pub fn resume(&mut self) -> bool {
        let mut cx = Context::from_waker(noop_waker_ref());
        self.drive(&mut cx).is_ready()
    }

    /// Take the outcome without blocking.
    ///
    /// An unfinished task is resumed once first; if it still has not
    /// finished, [`TaskError::NotCompleted`] is returned and the task is
    /// dropped.
    pub fn get_result(mut self) -> Result<T, TaskError> {
        if !self.is_completed() {
            self.resume();
        }
        self.take_outcome()
    }

    /// Block the current thread until the task finishes, then take the
    /// outcome.
    pub fn wait(self) -> Result<T, TaskError> {
        futures::executor::block_on(self)
    }

    /// Run `f` with the value once the task succeeds.
    ///
    /// Runs immediately if the task has already succeeded and its value is
    /// still held. Never runs if the task fails, or if the value was already
    /// taken by an await or [`get_result`](Self::get_result).
    pub fn then<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&T) + 'static,
    {
        self.on_complete(move |settled| match settled {
            Settled::Succeeded(Some(value)) => f(value),
            Settled::Succeeded(None) => {
                tracing::debug!("task value already taken; skipping continuation");
            }
            Settled::Failed(_) => {}
        })
    }

    /// Run `f` with the error once the task fails. Never runs for a task
    /// that succeeded.
    pub fn catching<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&TaskError) + 'static,
    {
        self.on_complete(move |settled| {
            if let Settled::Failed(err) = settled {
                f(err);
            }
        })
    }

    /// Run `f` once the task finishes, whatever the outcome.
    pub fn finally<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce() + 'static,
    {
        self.on_complete(move |_| f())
    }

    fn on_complete<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(Settled<'_, T>) + 'static,
    {
        match self.settled() {
            Some(settled) => f(settled),
            None => self.continuations.push(Box::new(f)),
        }
        self
    }

    fn settled(&self) -> Option<Settled<'_, T>> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Value(value) => Some(Settled::Succeeded(Some(value))),
            Slot::Taken => Some(Settled::Succeeded(None)),
            Slot::Failed(err) => Some(Settled::Failed(err)),
        }
    }

    fn drive(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        let Some(frame) = self.frame.as_mut() else {
            return Poll::Ready(());
        };
        tracing::trace!(state = %self.state, "resuming task");
        let outcome = match frame.resume(cx) {
            Poll::Pending => {
                self.state = FrameState::Suspended;
                return Poll::Pending;
            }
            Poll::Ready(Ok(Ok(value))) => Ok(value),
            Poll::Ready(Ok(Err(err))) => Err(TaskError::from_body(err)),
            Poll::Ready(Err(panicked)) => Err(TaskError::Panicked(panicked.message)),
        };
        self.complete(outcome);
        Poll::Ready(())
    }

    fn complete(&mut self, outcome: Result<T, TaskError>) {
        self.frame = None;
        self.slot = match outcome {
            Ok(value) => {
                self.state = FrameState::Completed;
                tracing::debug!("task completed");
                Slot::Value(value)
            }
            Err(err) => {
                self.state = FrameState::Failed;
                tracing::warn!(error = %err, "task failed");
                Slot::Failed(err)
            }
        };
        for continuation in std::mem::take(&mut self.continuations) {
            let Some(settled) = self.settled() else {
                break;
            };
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| continuation(settled))) {
                let panicked = Panicked::from_payload(payload);
                tracing::warn!(error = %panicked, "task continuation panicked");
            }
        }
    }

    fn take_outcome(&mut self) -> Result<T, TaskError> {
        match std::mem::replace(&mut self.slot, Slot::Taken) {
            Slot::Value(value) => Ok(value),
            Slot::Taken => Err(TaskError::Consumed),
            Slot::Failed(err) => {
                self.slot = Slot::Failed(err.clone());
                Err(err)
            }
            Slot::Empty => {
                self.slot = Slot::Empty;
                Err(TaskError::NotCompleted)
            }
        }
    }
}

// Nothing is ever pinned through a `Task`; its body lives in the frame.
impl<T, A: FrameAllocator> Unpin for Task<T, A> {}

impl<T, A: FrameAllocator> Future for Task<T, A> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match this.drive(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(()) => Poll::Ready(this.take_outcome()),
        }
    }
}

impl<T, A: FrameAllocator> Drop for Task<T, A> {
    fn drop(&mut self) {
        if self.frame.is_some() {
            tracing::debug!(state = %self.state, "dropping unfinished task");
        }
    }
}

impl<T, A: FrameAllocator> fmt::Debug for Task<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("state", &self.state)
            .field("continuations", &self.continuations.len())
            .finish_non_exhaustive()
    }
}
