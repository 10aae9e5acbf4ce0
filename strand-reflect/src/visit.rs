//! Type-directed dispatch over `dyn Any`.
//!
//! A visitor implements [`VisitCase<C>`] once per case type `C` it handles.
//! The caller lists the cases to try as a tuple, in priority order, and the
//! first case whose type is exactly the value's runtime type is invoked:
//!
//! ```
//! use std::any::Any;
//! use strand_reflect::{VisitCase, visit};
//!
//! struct Describe;
//!
//! impl VisitCase<i32> for Describe {
//!     type Output = String;
//!     fn visit(&mut self, v: &i32) -> String { format!("int {v}") }
//! }
//!
//! impl VisitCase<String> for Describe {
//!     type Output = String;
//!     fn visit(&mut self, v: &String) -> String { format!("text {v}") }
//! }
//!
//! let value: Box<dyn Any> = Box::new(7_i32);
//! let out = visit::<(i32, String), _>(&mut Describe, value.as_ref());
//! assert_eq!(out.unwrap(), "int 7");
//! ```
//!
//! A value matching no case yields [`VisitError::NoMatchingCase`]. Matching
//! is exact: a `u8` value does not match an `i32` case, and a `Box<T>` does
//! not match a `T` case.

use std::any::Any;

use crate::error::VisitError;

/// A visitor's handler for values of type `C`.
pub trait VisitCase<C> {
    /// What the handler returns. Shared by all cases in one visit.
    type Output;

    /// Handle a value known to be a `C`.
    fn visit(&mut self, value: &C) -> Self::Output;
}

/// A visitor's handler for values of type `C`, with write access.
pub trait VisitCaseMut<C> {
    /// What the handler returns. Shared by all cases in one visit.
    type Output;

    /// Handle a value known to be a `C`.
    fn visit_mut(&mut self, value: &mut C) -> Self::Output;
}

/// An ordered list of case types, written as a tuple.
///
/// Implemented for tuples of one to eight `'static` types.
pub trait VisitCases<V> {
    /// Common output of every case.
    type Output;

    /// Try each case in order; `None` when none matches.
    fn dispatch(visitor: &mut V, value: &dyn Any) -> Option<Self::Output>;
}

/// Mutable counterpart of [`VisitCases`].
pub trait VisitCasesMut<V> {
    /// Common output of every case.
    type Output;

    /// Try each case in order; `None` when none matches.
    fn dispatch_mut(visitor: &mut V, value: &mut dyn Any) -> Option<Self::Output>;
}

macro_rules! impl_visit_cases {
    ($($case:ident),+) => {
        impl<V, R, $($case: 'static),+> VisitCases<V> for ($($case,)+)
        where
            $(V: VisitCase<$case, Output = R>,)+
        {
            type Output = R;

            fn dispatch(visitor: &mut V, value: &dyn Any) -> Option<R> {
                $(
                    if let Some(v) = value.downcast_ref::<$case>() {
                        return Some(<V as VisitCase<$case>>::visit(visitor, v));
                    }
                )+
                None
            }
        }

        impl<V, R, $($case: 'static),+> VisitCasesMut<V> for ($($case,)+)
        where
            $(V: VisitCaseMut<$case, Output = R>,)+
        {
            type Output = R;

            fn dispatch_mut(visitor: &mut V, value: &mut dyn Any) -> Option<R> {
                $(
                    if let Some(v) = value.downcast_mut::<$case>() {
                        return Some(<V as VisitCaseMut<$case>>::visit_mut(visitor, v));
                    }
                )+
                None
            }
        }
    };
}

impl_visit_cases!(A);
impl_visit_cases!(A, B);
impl_visit_cases!(A, B, C);
impl_visit_cases!(A, B, C, D);
impl_visit_cases!(A, B, C, D, E);
impl_visit_cases!(A, B, C, D, E, F);
impl_visit_cases!(A, B, C, D, E, F, G);
impl_visit_cases!(A, B, C, D, E, F, G, H);

/// Invoke the first case in `Cases` whose type matches `value`.
pub fn visit<Cases, V>(visitor: &mut V, value: &dyn Any) -> Result<Cases::Output, VisitError>
where
    Cases: VisitCases<V>,
{
    Cases::dispatch(visitor, value).ok_or_else(|| {
        let type_id = (*value).type_id();
        tracing::debug!(?type_id, "no visitor case matched");
        VisitError::NoMatchingCase { type_id }
    })
}

/// Invoke the first case in `Cases` whose type matches `value`, with write
/// access to it.
pub fn visit_mut<Cases, V>(visitor: &mut V, value: &mut dyn Any) -> Result<Cases::Output, VisitError>
where
    Cases: VisitCasesMut<V>,
{
    let type_id = (*value).type_id();
    Cases::dispatch_mut(visitor, value).ok_or_else(|| {
        tracing::debug!(?type_id, "no visitor case matched");
        VisitError::NoMatchingCase { type_id }
    })
}
