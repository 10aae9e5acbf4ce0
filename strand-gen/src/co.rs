//! The yield handle passed to a generator body.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Single-value slot shared by a generator and its body.
pub(crate) type Slot<T> = Rc<Cell<Option<T>>>;

/// Handle a generator body uses to hand values to its consumer.
///
/// A body receives exactly one `Co` and keeps it for its whole run.
pub struct Co<T> {
    slot: Slot<T>,
}

impl<T> Co<T> {
    pub(crate) fn new(slot: Slot<T>) -> Self {
        Self { slot }
    }

    /// Hand `value` to the consumer and suspend until the next value is
    /// requested.
    pub fn yield_(&self, value: T) -> Yield<'_, T> {
        Yield {
            slot: &self.slot,
            value: Some(value),
        }
    }
}

/// Future returned by [`Co::yield_`].
#[must_use = "a value is only produced when the yield is awaited"]
pub struct Yield<'a, T> {
    slot: &'a Slot<T>,
    value: Option<T>,
}

// The value is moved out, never pinned in place.
impl<T> Unpin for Yield<'_, T> {}

impl<T> Future for Yield<'_, T> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        match self.value.take() {
            Some(value) => {
                self.slot.set(Some(value));
                Poll::Pending
            }
            None => Poll::Ready(()),
        }
    }
}
