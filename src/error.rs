//! Error types for traversal, validation and array access.
//!
//! Every error here is a caller contract violation: unsorted input,
//! an index that does not belong to the slice, or a malformed range.
//! Errors surface on the pull that detects them and end the sequence
//! that produced them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A sequence that was expected to be a sorted set was not strictly increasing.
///
/// Raised by [`ensure_sorted_set`](crate::ensure_sorted_set) when an element
/// compares less than or equal to its predecessor. Out-of-order elements and
/// duplicates are reported the same way.
///
/// # Examples
///
/// ```rust
/// use mergejoin::OrderingViolation;
///
/// let error = OrderingViolation { position: 3 };
/// assert_eq!(
///     format!("{error}"),
///     "element at position 3 is not strictly greater than its predecessor"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderingViolation {
    /// Zero-based position of the offending element in its sequence.
    pub position: usize,
}

impl std::fmt::Display for OrderingViolation {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "element at position {} is not strictly greater than its predecessor",
            self.position
        )
    }
}

impl std::error::Error for OrderingViolation {}

/// An index did not address an element of the slice it was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexOutOfRange {
    /// The requested index.
    pub index: usize,
    /// Length of the slice.
    pub length: usize,
}

impl std::fmt::Display for IndexOutOfRange {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "index {} is out of range for a slice of length {}",
            self.index, self.length
        )
    }
}

impl std::error::Error for IndexOutOfRange {}

/// Which bound of a range request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvalidRangeReason {
    /// The start lies beyond the last valid index.
    StartOutOfBounds,
    /// The end lies beyond the slice length.
    EndOutOfBounds,
    /// The end lies before the start.
    EndBeforeStart,
}

impl std::fmt::Display for InvalidRangeReason {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::StartOutOfBounds => "start cannot be greater than the indexes in the slice",
            Self::EndOutOfBounds => "end cannot be greater than the length of the slice",
            Self::EndBeforeStart => "end cannot be less than start",
        };
        formatter.write_str(message)
    }
}

/// A range request that cannot be served by the slice.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{InvalidRange, InvalidRangeReason};
///
/// let error = InvalidRange {
///     start: 4,
///     end: 2,
///     length: 8,
///     reason: InvalidRangeReason::EndBeforeStart,
/// };
/// assert_eq!(
///     format!("{error}"),
///     "invalid range 4..2 for a slice of length 8: end cannot be less than start"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvalidRange {
    /// Resolved start of the request.
    pub start: usize,
    /// Resolved (exclusive) end of the request.
    pub end: usize,
    /// Length of the slice.
    pub length: usize,
    /// The rejected bound.
    pub reason: InvalidRangeReason,
}

impl std::fmt::Display for InvalidRange {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "invalid range {}..{} for a slice of length {}: {}",
            self.start, self.end, self.length, self.reason
        )
    }
}

impl std::error::Error for InvalidRange {}

/// Unified error type for the crate.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{OrderingViolation, SetError};
///
/// let error: SetError = OrderingViolation { position: 1 }.into();
/// assert!(matches!(error, SetError::OrderingViolation(_)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetError {
    /// Input was not a strictly increasing sequence.
    OrderingViolation(OrderingViolation),
    /// An index did not belong to its slice.
    IndexOutOfRange(IndexOutOfRange),
    /// A range request was malformed.
    InvalidRange(InvalidRange),
}

impl std::fmt::Display for SetError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderingViolation(error) => write!(formatter, "{error}"),
            Self::IndexOutOfRange(error) => write!(formatter, "{error}"),
            Self::InvalidRange(error) => write!(formatter, "{error}"),
        }
    }
}

impl std::error::Error for SetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OrderingViolation(error) => Some(error),
            Self::IndexOutOfRange(error) => Some(error),
            Self::InvalidRange(error) => Some(error),
        }
    }
}

impl From<OrderingViolation> for SetError {
    fn from(error: OrderingViolation) -> Self {
        Self::OrderingViolation(error)
    }
}

impl From<IndexOutOfRange> for SetError {
    fn from(error: IndexOutOfRange) -> Self {
        Self::IndexOutOfRange(error)
    }
}

impl From<InvalidRange> for SetError {
    fn from(error: InvalidRange) -> Self {
        Self::InvalidRange(error)
    }
}
