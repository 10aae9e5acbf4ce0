//! Visitation errors.

use std::any::TypeId;

use thiserror::Error;

/// Errors from [`visit`](crate::visit) and [`visit_mut`](crate::visit_mut).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    /// None of the listed case types matched the value.
    #[error("no visitor case matches value of type {type_id:?}")]
    NoMatchingCase {
        /// Runtime type of the unmatched value.
        type_id: TypeId,
    },
}
