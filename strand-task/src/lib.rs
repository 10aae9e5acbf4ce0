#![deny(missing_docs)]
//! Eager, awaitable tasks for strand.
//!
//! A [`Task`] starts running as soon as it is built and keeps going until
//! its first real suspension. Its outcome, a value or a [`TaskError`], can
//! be read with [`Task::get_result`], blocked on with [`Task::wait`], or
//! awaited from another task, because `Task` is itself a `Future`.
//!
//! ```
//! use strand_task::{Task, TaskError};
//!
//! let outer = Task::new(async {
//!     let inner = Task::new(async { Ok::<_, TaskError>(42) });
//!     let answer = inner.await?;
//!     Ok::<_, TaskError>(answer + 1)
//! });
//! assert!(outer.is_completed());
//! assert_eq!(outer.get_result().unwrap(), 43);
//! ```

pub mod error;
pub mod task;

pub use error::{SharedError, TaskError};
pub use task::{CustomAllocatorTask, Task};
