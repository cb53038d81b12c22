//! # mergejoin
//!
//! Lazy set algebra over sorted sequences.
//!
//! ## Overview
//!
//! Every operation in this crate is built on one primitive: a merge-join
//! traversal that walks two sorted sets in lockstep and reports, for each
//! step, whether the current element is only in the source, only in the
//! target, or in both. On top of it sit:
//!
//! - **Traversal**: [`pairwise_traversal`], [`try_pairwise_traversal`], [`dual_traversal`]
//! - **Validation**: [`ensure_sorted_set`], [`checked_pairwise_traversal`]
//! - **Set operations**: [`difference`], [`symmetric_difference`], [`diff`],
//!   [`diff_with`], [`intersection`] and the [`PairwiseExt`] methods
//! - **Slice access**: [`element_at`], [`read_range`]
//! - **Streams**: the same operations over `futures` streams, in [`stream`]
//!
//! Nothing is buffered beyond one element per side, so inputs may be
//! arbitrarily large or infinite.
//!
//! ## Feature Flags
//!
//! - `async`: stream variants (enabled by default)
//! - `serde`: `Serialize`/`Deserialize` for steps, diff entries and errors
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use mergejoin::prelude::*;
//!
//! let before = [1, 2, 3, 5];
//! let after = [2, 3, 4];
//!
//! let removed: Vec<_> = difference(before, after, i32::cmp).collect();
//! let kept: Vec<_> = intersection(before, after, i32::cmp).collect();
//!
//! assert_eq!(removed, vec![1, 5]);
//! assert_eq!(kept, vec![2, 3]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the traversals, set operations and step types.
///
/// # Usage
///
/// ```rust
/// use mergejoin::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algebra::{
        PairwiseExt, diff, diff_with, difference, intersection, symmetric_difference,
    };
    pub use crate::error::{OrderingViolation, SetError};
    pub use crate::step::{Diff, ExclusiveDiff, Pairing, PairwiseStep};
    pub use crate::traversal::{
        checked_pairwise_traversal, pairwise_traversal, try_pairwise_traversal,
    };
    pub use crate::validate::ensure_sorted_set;

    #[cfg(feature = "async")]
    pub use crate::stream::{PairwiseStreamExt, pairwise_stream, try_pairwise_stream};
}

pub mod access;
pub mod algebra;
pub mod error;
pub mod index;
mod merge;
pub mod step;
pub mod traversal;
pub mod validate;

#[cfg(feature = "async")]
pub mod stream;

pub use access::{element_at, read_range};
pub use algebra::{
    DiffOp, Difference, DifferenceOp, Diffs, Intersection, IntersectionOp, NoDiffer, PairwiseExt,
    Select, Selection, SetIter, StepItem, SymmetricDifference, SymmetricDifferenceOp, diff,
    diff_with, difference, intersection, symmetric_difference,
};
pub use error::{IndexOutOfRange, InvalidRange, InvalidRangeReason, OrderingViolation, SetError};
pub use index::{DualTraversal, IndexStep, dual_traversal};
pub use step::{Diff, ExclusiveDiff, Pairing, PairwiseStep};
pub use traversal::{
    CheckedPairwiseTraversal, PairwiseTraversal, TryIterator, TryPairwiseTraversal,
    checked_pairwise_traversal, pairwise_traversal, try_pairwise_traversal,
};
pub use validate::{EnsureSortedSet, ensure_sorted_set};
