//! Error types for column storage operations.
//!
//! This module declares focused, composable error types for the type-erased
//! column layer. Each error carries enough context to make failures
//! actionable while remaining small and cheap to pass around or convert into
//! the aggregate [`ColumnError`].
//!
//! ## Scope
//!
//! Only the storage layer returns errors. Expected-miss conditions at the
//! world surface (stale handles, absent components) soft-fail with
//! `None`/`false`/no-op instead, and a storage error reaching the world layer
//! indicates a broken engine invariant, which the world treats as fatal.
//!
//! ## Display vs. Debug
//!
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::any::TypeId;
use std::fmt;

use crate::engine::types::RowId;

/// Returned when a row index addresses storage outside a column's valid
/// bounds.
///
/// ### Fields
/// * `row` — The row index that was addressed.
/// * `len` — The number of valid rows in the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOutOfBoundsError {
    /// Offending row index.
    pub row: RowId,

    /// Number of valid rows in the column.
    pub len: usize,
}

impl fmt::Display for RowOutOfBoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} out of bounds (column holds {} rows)", self.row, self.len)
    }
}

impl std::error::Error for RowOutOfBoundsError {}

/// Returned when a column operation targets storage whose element type does
/// not match the provided value's type.
///
/// This is a logic error surfaced by the type-erased layer when component
/// types diverge (e.g. transferring a `Velocity` row into a `Position`
/// column).
///
/// ### Fields
/// * `expected` — The [`TypeId`] the destination column declares.
/// * `actual` — The [`TypeId`] of the value or source column provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Destination column's declared element type.
    pub expected: TypeId,

    /// Provided value's dynamic type.
    pub actual: TypeId,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column type mismatch: expected {:?}, actual {:?}", self.expected, self.actual)
    }
}

impl std::error::Error for TypeMismatchError {}

/// Aggregate error for type-erased column operations.
///
/// Conversions (`From<T>`) are implemented for the low-level errors so
/// callers can write `?` and still return a single, expressive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// A row index addressed storage outside valid bounds.
    Row(RowOutOfBoundsError),

    /// The dynamic type of a value did not match the column's element type.
    Type(TypeMismatchError),
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::Row(e) => write!(f, "{e}"),
            ColumnError::Type(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ColumnError {}

impl From<RowOutOfBoundsError> for ColumnError {
    fn from(e: RowOutOfBoundsError) -> Self {
        ColumnError::Row(e)
    }
}

impl From<TypeMismatchError> for ColumnError {
    fn from(e: TypeMismatchError) -> Self {
        ColumnError::Type(e)
    }
}
