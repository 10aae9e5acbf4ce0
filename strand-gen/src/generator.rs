//! The lazy generator.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::iter::FusedIterator;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;
use strand_core::{BoxError, Frame, FrameAllocator, FrameState, Global, SystemAlloc};

use crate::cancel;
use crate::co::{Co, Slot};
use crate::error::GeneratorError;

/// What a producer body may finish with: `()` or `Result<(), E>`.
pub trait ProducerOutput {
    /// Normalize into the generator's internal completion type.
    fn into_completion(self) -> Result<(), BoxError>;
}

impl ProducerOutput for () {
    fn into_completion(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> ProducerOutput for Result<(), E> {
    fn into_completion(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A lazy sequence of `T` computed on demand by a suspended producer body.
///
/// The body is not started at construction. Each [`advance`](Self::advance)
/// resumes it until it yields the next value, finishes, or fails. A failure
/// stops the generator for good: the body's frame is torn down, the cancel
/// hook for this generator type runs, and the error is returned once.
///
/// `Generator` is also an [`Iterator`] over `Result<T, GeneratorError>`.
///
/// The allocator parameter `A` only controls where the suspended body
/// lives. See [`CustomAllocatorGenerator`].
pub struct Generator<T, A: FrameAllocator = Global> {
    frame: Option<Frame<Result<(), BoxError>, A>>,
    slot: Slot<T>,
    lookahead: Option<Result<T, GeneratorError>>,
    current: Option<T>,
    state: FrameState,
}

/// A generator whose suspended body lives in caller-chosen storage.
///
/// Observationally identical to [`Generator`] with the default policy; it
/// keeps its own cancel-hook slot.
pub type CustomAllocatorGenerator<T, A = SystemAlloc> = Generator<T, A>;

impl<T: 'static> Generator<T> {
    /// Wrap `producer` into a generator backed by the global allocator.
    ///
    /// `producer` is called once, immediately, to build the body; the body
    /// itself does not run until the first `advance`.
    pub fn new<P, Fut>(producer: P) -> Self
    where
        P: FnOnce(Co<T>) -> Fut,
        Fut: Future + 'static,
        Fut::Output: ProducerOutput,
    {
        Self::new_in(producer, Global)
    }
}

impl<T: 'static, A: FrameAllocator + 'static> Generator<T, A> {
    /// Wrap `producer` into a generator whose body lives in `alloc`.
    pub fn new_in<P, Fut>(producer: P, alloc: A) -> Self
    where
        P: FnOnce(Co<T>) -> Fut,
        Fut: Future + 'static,
        Fut::Output: ProducerOutput,
    {
        let slot: Slot<T> = Rc::new(Cell::new(None));
        let body = producer(Co::new(Rc::clone(&slot)));
        let frame = Frame::new_in(async move { body.await.into_completion() }, alloc);
        Self {
            frame: Some(frame),
            slot,
            lookahead: None,
            current: None,
            state: FrameState::Created,
        }
    }

    /// Whether another `advance` would produce something: a value, or the
    /// pending error.
    ///
    /// May resume the body to find out; the outcome is buffered and handed
    /// out by the next `advance`, so no value is skipped or produced twice.
    pub fn has_next(&mut self) -> bool {
        if self.lookahead.is_none() {
            self.lookahead = self.resume();
        }
        self.lookahead.is_some()
    }

    /// Move to the next value.
    ///
    /// `Ok(true)` means [`current`](Self::current) now holds a fresh value.
    /// `Ok(false)` means the sequence is exhausted; this is stable, and every
    /// later call says the same. `Err` reports a failure exactly once.
    pub fn advance(&mut self) -> Result<bool, GeneratorError> {
        let next = match self.lookahead.take() {
            Some(next) => Some(next),
            None => self.resume(),
        };
        match next {
            Some(Ok(value)) => {
                self.current = Some(value);
                Ok(true)
            }
            Some(Err(err)) => {
                self.current = None;
                Err(err)
            }
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    /// The value produced by the last successful `advance`.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Take ownership of the current value.
    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    /// `true` once the body has ended and nothing buffered remains.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal() && self.lookahead.is_none()
    }

    /// Lifecycle state of the body.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Register the cancel hook for this generator type.
    ///
    /// The hook is process-wide and shared by every generator of exactly
    /// this type. A later registration replaces the earlier one.
    pub fn set_on_cancel<F>(hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        cancel::set::<Self>(Arc::new(hook));
    }

    /// Remove the cancel hook for this generator type. Returns whether one
    /// was registered.
    pub fn clear_on_cancel() -> bool {
        cancel::clear::<Self>()
    }

    /// Whether a cancel hook is registered for this generator type.
    pub fn has_on_cancel() -> bool {
        cancel::is_set::<Self>()
    }

    fn resume(&mut self) -> Option<Result<T, GeneratorError>> {
        let frame = self.frame.as_mut()?;
        let mut cx = Context::from_waker(noop_waker_ref());
        tracing::trace!(state = %self.state, "resuming generator");
        match frame.resume(&mut cx) {
            Poll::Pending => match self.slot.take() {
                Some(value) => {
                    self.state = FrameState::Suspended;
                    Some(Ok(value))
                }
                None => Some(Err(self.fail(GeneratorError::Stalled))),
            },
            Poll::Ready(Ok(Ok(()))) => {
                self.frame = None;
                self.state = FrameState::Completed;
                tracing::debug!("generator exhausted");
                None
            }
            Poll::Ready(Ok(Err(err))) => Some(Err(self.fail(GeneratorError::Production(err)))),
            Poll::Ready(Err(panicked)) => {
                Some(Err(self.fail(GeneratorError::Panicked(panicked.message))))
            }
        }
    }

    fn fail(&mut self, err: GeneratorError) -> GeneratorError {
        self.frame = None;
        self.slot.take();
        self.state = FrameState::Failed;
        tracing::warn!(error = %err, "generator stopped on error");
        cancel::fire::<Self>();
        err
    }
}

// Nothing is ever pinned through a `Generator`; its body lives in the frame.
impl<T, A: FrameAllocator> Unpin for Generator<T, A> {}

impl<T: 'static, A: FrameAllocator + 'static> Iterator for Generator<T, A> {
    type Item = Result<T, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current.take().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<T: 'static, A: FrameAllocator + 'static> FusedIterator for Generator<T, A> {}

impl<T, A: FrameAllocator> fmt::Debug for Generator<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("state", &self.state)
            .field("buffered", &self.lookahead.is_some())
            .finish_non_exhaustive()
    }
}
