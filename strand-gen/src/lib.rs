#![deny(missing_docs)]
//! Lazy, pull-based generators for strand.
//!
//! A [`Generator`] wraps a producer body, an `async` block that receives a
//! [`Co`] handle and hands values out one at a time with
//! `co.yield_(value).await`. Nothing runs until the consumer asks: each
//! [`Generator::advance`] resumes the body exactly as far as its next yield.
//!
//! ```
//! use strand_gen::Generator;
//!
//! let numbers = Generator::new(|co| async move {
//!     co.yield_(1).await;
//!     co.yield_(2).await;
//! });
//! let collected: Result<Vec<i32>, _> = numbers.collect();
//! assert_eq!(collected.unwrap(), vec![1, 2]);
//! ```
//!
//! A body that returns `Err` (or panics) stops the generator. The error is
//! reported once by the next `advance`, after the per-type cancel hook
//! registered with [`Generator::set_on_cancel`] has run.

mod cancel;
pub mod co;
pub mod error;
pub mod generator;
pub mod invoke;

pub use cancel::CancelHook;
pub use co::{Co, Yield};
pub use error::GeneratorError;
pub use generator::{CustomAllocatorGenerator, Generator, ProducerOutput};
pub use invoke::{generator_invoke, generator_invoke_with, try_generator_invoke};
