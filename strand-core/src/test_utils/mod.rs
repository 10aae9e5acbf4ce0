//! Instrumented allocation policies for testing.
//!
//! Available behind the `test-utils` feature flag.

mod counting_alloc;

pub use counting_alloc::CountingAlloc;
