//! # strand-core — Suspended frames for generators and tasks
//!
//! A suspended computation in strand is an ordinary Rust `Future` that has
//! been moved into a [`Frame`]: heap storage obtained from a
//! [`FrameAllocator`] policy, pinned for its whole life, and resumed by
//! polling. Generators and tasks are both built on top of this one type.
//!
//! | Piece | Type | What it does |
//! |-------|------|-------------|
//! | Storage | [`Frame`] | Owns one pinned, type-erased suspended computation |
//! | Policy | [`FrameAllocator`], [`Global`], [`SystemAlloc`] | Where frame storage comes from |
//! | Lifecycle | [`FrameState`] | Created / Suspended / Completed / Failed |
//! | Errors | [`BoxError`], [`Panicked`] | Error plumbing shared by the frame kinds |
//!
//! ## Allocation policy
//!
//! A frame's allocator only decides memory provenance. The same body run on
//! [`Global`] or on a caller-supplied allocator produces the same values in
//! the same order. Storage is returned to the allocator that produced it
//! when the frame is dropped, whether the computation finished or not.
//!
//! ## Panics
//!
//! A panic raised inside a frame is caught at the resume boundary and
//! surfaces as [`Panicked`]; it never unwinds into the consumer.

#![deny(missing_docs)]

pub mod alloc;
pub mod error;
pub mod frame;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports for convenience
pub use alloc::{FrameAllocator, Global, SystemAlloc};
pub use error::{BoxError, Panicked};
pub use frame::Frame;
pub use state::FrameState;
