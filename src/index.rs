//! Index-based dual traversal of two sorted slices.
//!
//! [`dual_traversal`] follows exactly the cursor movements of
//! [`pairwise_traversal`](crate::pairwise_traversal), but yields indices
//! instead of elements. Callers holding random-access storage can walk two
//! sorted slices without moving or cloning elements, and look the elements
//! up only when they need them.
//!
//! # Examples
//!
//! ```rust
//! use std::cmp::Ordering;
//! use mergejoin::dual_traversal;
//!
//! let source = [1, 3];
//! let target = [3, 4];
//! let steps: Vec<_> = dual_traversal(&source, &target, i32::cmp)
//!     .map(|step| (step.source_index, step.target_index, step.order))
//!     .collect();
//!
//! assert_eq!(
//!     steps,
//!     vec![
//!         (Some(0), Some(0), Ordering::Less),
//!         (Some(1), Some(0), Ordering::Equal),
//!         // source exhausted: its index stays on the last element
//!         (Some(1), Some(1), Ordering::Greater),
//!     ]
//! );
//! ```

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::access::element_at;
use crate::error::IndexOutOfRange;
use crate::step::{Pairing, PairwiseStep};

/// One step of a [`dual_traversal`].
///
/// `order` tells which side(s) the step consumes: `Less` the source element,
/// `Greater` the target element, `Equal` both. While both sides have
/// elements left it is the comparator's result. Once a side is exhausted it
/// is forced (`Less` after the target ended, `Greater` after the source
/// ended) and the exhausted side's index stays clamped to its last element,
/// or is `None` if that slice was empty from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexStep {
    /// Current source index, clamped to the last element.
    pub source_index: Option<usize>,
    /// Current target index, clamped to the last element.
    pub target_index: Option<usize>,
    /// Which side(s) this step consumes.
    pub order: Ordering,
    /// No source element remains after this step.
    pub source_exhausted: bool,
    /// No target element remains after this step.
    pub target_exhausted: bool,
}

impl IndexStep {
    /// Looks the step's elements up, reproducing the matching [`PairwiseStep`].
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if the slices are not the ones the step
    /// was produced from.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mergejoin::{Pairing, dual_traversal};
    ///
    /// let source = ["a", "c"];
    /// let target = ["b", "c"];
    /// let pairings: Vec<_> = dual_traversal(&source, &target, |a, b| a.cmp(b))
    ///     .map(|step| step.resolve(&source, &target).map(|resolved| resolved.pairing))
    ///     .collect::<Result<_, _>>()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     pairings,
    ///     vec![
    ///         Pairing::SourceOnly(&"a"),
    ///         Pairing::TargetOnly(&"b"),
    ///         Pairing::Both(&"c", &"c"),
    ///     ]
    /// );
    /// ```
    pub fn resolve<'a, A, B>(
        &self,
        source: &'a [A],
        target: &'a [B],
    ) -> Result<PairwiseStep<&'a A, &'a B>, IndexOutOfRange> {
        let pairing = match self.order {
            Ordering::Less => Pairing::SourceOnly(lookup(source, self.source_index)?),
            Ordering::Greater => Pairing::TargetOnly(lookup(target, self.target_index)?),
            Ordering::Equal => Pairing::Both(
                lookup(source, self.source_index)?,
                lookup(target, self.target_index)?,
            ),
        };
        Ok(PairwiseStep::new(
            pairing,
            self.source_exhausted,
            self.target_exhausted,
        ))
    }
}

fn lookup<T>(slice: &[T], index: Option<usize>) -> Result<&T, IndexOutOfRange> {
    element_at(slice, index.unwrap_or(slice.len()))
}

/// Iterator returned by [`dual_traversal`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Debug, Clone)]
pub struct DualTraversal<'a, A, B, C> {
    source: &'a [A],
    target: &'a [B],
    comparator: C,
    source_position: usize,
    target_position: usize,
}

/// Traverses two sorted slices in lockstep, yielding index triples.
///
/// Produces one [`IndexStep`] per step of
/// [`pairwise_traversal`](crate::pairwise_traversal) over the same slices;
/// [`IndexStep::resolve`] turns it back into that step.
pub fn dual_traversal<'a, A, B, C>(
    source: &'a [A],
    target: &'a [B],
    comparator: C,
) -> DualTraversal<'a, A, B, C>
where
    C: FnMut(&A, &B) -> Ordering,
{
    DualTraversal {
        source,
        target,
        comparator,
        source_position: 0,
        target_position: 0,
    }
}

const fn clamp(position: usize, length: usize) -> Option<usize> {
    if length == 0 {
        None
    } else if position < length {
        Some(position)
    } else {
        Some(length - 1)
    }
}

impl<A, B, C> Iterator for DualTraversal<'_, A, B, C>
where
    C: FnMut(&A, &B) -> Ordering,
{
    type Item = IndexStep;

    fn next(&mut self) -> Option<IndexStep> {
        let order = match (
            self.source.get(self.source_position),
            self.target.get(self.target_position),
        ) {
            (Some(source), Some(target)) => (self.comparator)(source, target),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => return None,
        };

        let source_index = clamp(self.source_position, self.source.len());
        let target_index = clamp(self.target_position, self.target.len());

        match order {
            Ordering::Less => self.source_position += 1,
            Ordering::Greater => self.target_position += 1,
            Ordering::Equal => {
                self.source_position += 1;
                self.target_position += 1;
            }
        }

        Some(IndexStep {
            source_index,
            target_index,
            order,
            source_exhausted: self.source_position >= self.source.len(),
            target_exhausted: self.target_position >= self.target.len(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let source_remaining = self.source.len().saturating_sub(self.source_position);
        let target_remaining = self.target.len().saturating_sub(self.target_position);
        (
            source_remaining.max(target_remaining),
            source_remaining.checked_add(target_remaining),
        )
    }
}

impl<A, B, C> FusedIterator for DualTraversal<'_, A, B, C> where C: FnMut(&A, &B) -> Ordering {}
