//! Synchronous pairwise traversal of two sorted sets.
//!
//! [`pairwise_traversal`] is the merge-join primitive behind every set
//! operation in this crate. It walks two sorted sets in lockstep and yields
//! one [`PairwiseStep`] per comparison:
//!
//! - the source element precedes the target element: `SourceOnly`, source advances
//! - the target element precedes the source element: `TargetOnly`, target advances
//! - both are equal: `Both`, both advance
//!
//! Once one side ends, the remaining elements of the other are yielded one
//! per step. Every input element appears in exactly one step, in global
//! sorted order.
//!
//! Inputs are assumed to be sorted sets. Use [`checked_pairwise_traversal`]
//! (or wrap the inputs in [`ensure_sorted_set`]) to have that checked.
//!
//! # Examples
//!
//! ```rust
//! use mergejoin::{Pairing, pairwise_traversal};
//!
//! let pairings: Vec<_> = pairwise_traversal([1, 2, 4], [2, 3], i32::cmp)
//!     .map(|step| step.pairing)
//!     .collect();
//!
//! assert_eq!(
//!     pairings,
//!     vec![
//!         Pairing::SourceOnly(1),
//!         Pairing::Both(2, 2),
//!         Pairing::TargetOnly(3),
//!         Pairing::SourceOnly(4),
//!     ]
//! );
//! ```

use std::cmp::Ordering;
use std::convert::Infallible;
use std::iter::{FusedIterator, Map};

use crate::error::OrderingViolation;
use crate::merge::{MergeJoin, Progress};
use crate::step::PairwiseStep;
use crate::validate::{EnsureSortedSet, ensure_sorted_set};

/// An iterator over `Result`s, seen as its success and error types.
///
/// Implemented for every `Iterator<Item = Result<T, E>>`.
pub trait TryIterator {
    /// The success type.
    type Ok;
    /// The error type.
    type Error;

    /// Pulls the next result.
    fn try_next(&mut self) -> Option<Result<Self::Ok, Self::Error>>;
}

impl<I, T, E> TryIterator for I
where
    I: Iterator<Item = Result<T, E>> + ?Sized,
{
    type Ok = T;
    type Error = E;

    #[inline]
    fn try_next(&mut self) -> Option<Result<T, E>> {
        self.next()
    }
}

/// Iterator returned by [`try_pairwise_traversal`].
///
/// Yields `Err` once if either input fails, then ends.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct TryPairwiseTraversal<S, T, C>
where
    S: TryIterator,
    T: TryIterator<Error = S::Error>,
{
    source: S,
    target: T,
    comparator: C,
    join: MergeJoin<S::Ok, T::Ok, S::Error>,
}

/// Traverses two fallible sorted sets in lockstep.
///
/// Behaves like [`pairwise_traversal`] over the `Ok` elements. When either
/// input yields `Err`, the traversal yields that error and ends. An error
/// pulled while refilling a cursor after a consumed element does not discard
/// the step that consumed it: that step is yielded first (with the failing
/// side not flagged as exhausted) and the error follows on the next pull.
/// The consumed element was valid, and its step's exhaustion flags can only
/// be exact once the refill has happened, so the refill's error is reported
/// one step later than the pull that discovered it.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Pairing, try_pairwise_traversal};
///
/// let source = vec![Ok(1), Err("disk error")];
/// let target: Vec<Result<i32, &str>> = vec![Ok(3)];
/// let mut steps = try_pairwise_traversal(source, target, i32::cmp);
///
/// assert_eq!(steps.next().unwrap().unwrap().pairing, Pairing::SourceOnly(1));
/// assert_eq!(steps.next(), Some(Err("disk error")));
/// assert_eq!(steps.next(), None);
/// ```
pub fn try_pairwise_traversal<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> TryPairwiseTraversal<S::IntoIter, T::IntoIter, C>
where
    S: IntoIterator,
    T: IntoIterator,
    S::IntoIter: TryIterator,
    T::IntoIter: TryIterator<Error = <S::IntoIter as TryIterator>::Error>,
    C: FnMut(&<S::IntoIter as TryIterator>::Ok, &<T::IntoIter as TryIterator>::Ok) -> Ordering,
{
    TryPairwiseTraversal {
        source: source.into_iter(),
        target: target.into_iter(),
        comparator,
        join: MergeJoin::new(),
    }
}

impl<S, T, C> Iterator for TryPairwiseTraversal<S, T, C>
where
    S: TryIterator,
    T: TryIterator<Error = S::Error>,
    C: FnMut(&S::Ok, &T::Ok) -> Ordering,
{
    type Item = Result<PairwiseStep<S::Ok, T::Ok>, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.join.needs_source() {
                let pulled = self.source.try_next();
                self.join.fill_source(pulled);
            }
            if self.join.needs_target() {
                let pulled = self.target.try_next();
                self.join.fill_target(pulled);
            }
            if let Progress::Ready(item) = self.join.advance(&mut self.comparator) {
                return item;
            }
        }
    }
}

impl<S, T, C> FusedIterator for TryPairwiseTraversal<S, T, C>
where
    S: TryIterator,
    T: TryIterator<Error = S::Error>,
    C: FnMut(&S::Ok, &T::Ok) -> Ordering,
{
}

type Infallibly<I> = Map<I, fn(<I as Iterator>::Item) -> Result<<I as Iterator>::Item, Infallible>>;

fn infallibly<I: Iterator>(iterator: I) -> Infallibly<I> {
    iterator.map(Ok as fn(I::Item) -> Result<I::Item, Infallible>)
}

/// Iterator returned by [`pairwise_traversal`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct PairwiseTraversal<S: Iterator, T: Iterator, C> {
    inner: TryPairwiseTraversal<Infallibly<S>, Infallibly<T>, C>,
}

/// Traverses two sorted sets in lockstep, yielding one step per comparison.
///
/// `comparator(source, target)` must be a strict total order consistent
/// across both inputs. Nothing is pulled until the first call to `next`;
/// afterwards each side holds at most one element, so infinite inputs are
/// fine as long as the consumer stops pulling.
///
/// The exhaustion flags of a step are exact: `source_exhausted` is `true`
/// on the step that consumes the final source element, and on every later
/// step (including every step when the source was empty to begin with).
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Pairing, PairwiseStep, pairwise_traversal};
///
/// let steps: Vec<_> = pairwise_traversal(Vec::<i32>::new(), vec![0, 1, 2], i32::cmp).collect();
/// assert_eq!(
///     steps,
///     vec![
///         PairwiseStep::new(Pairing::TargetOnly(0), true, false),
///         PairwiseStep::new(Pairing::TargetOnly(1), true, false),
///         PairwiseStep::new(Pairing::TargetOnly(2), true, true),
///     ]
/// );
/// ```
pub fn pairwise_traversal<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> PairwiseTraversal<S::IntoIter, T::IntoIter, C>
where
    S: IntoIterator,
    T: IntoIterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    PairwiseTraversal {
        inner: TryPairwiseTraversal {
            source: infallibly(source.into_iter()),
            target: infallibly(target.into_iter()),
            comparator,
            join: MergeJoin::new(),
        },
    }
}

impl<S, T, C> Iterator for PairwiseTraversal<S, T, C>
where
    S: Iterator,
    T: Iterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    type Item = PairwiseStep<S::Item, T::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| {
            let Ok(step) = item;
            step
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.inner.join.is_finished() {
            return (0, Some(0));
        }
        let (source_lower, source_upper) = self.inner.source.size_hint();
        let (target_lower, target_upper) = self.inner.target.size_hint();
        // A step consumes at most one element per side.
        let lower = source_lower.max(target_lower);
        // One element per side may already sit in the cursors.
        let upper = source_upper
            .zip(target_upper)
            .and_then(|(source, target)| source.checked_add(target))
            .and_then(|remaining| remaining.checked_add(2));
        (lower, upper)
    }
}

impl<S, T, C> FusedIterator for PairwiseTraversal<S, T, C>
where
    S: Iterator,
    T: Iterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
}

/// A traversal whose inputs are both checked by [`ensure_sorted_set`].
pub type CheckedPairwiseTraversal<S, T, C> =
    TryPairwiseTraversal<EnsureSortedSet<S, C>, EnsureSortedSet<T, C>, C>;

/// Traverses two sorted sets, validating both as they are pulled.
///
/// The first pulled element on either side that breaks strict ordering
/// surfaces as `Err(OrderingViolation)` and ends the traversal.
///
/// Validation is lazy: it covers only the elements actually pulled. The
/// early exits of [`PairwiseExt::intersection`](crate::PairwiseExt::intersection)
/// and [`PairwiseExt::difference`](crate::PairwiseExt::difference) stop
/// pulling, so a violation in input they never reach goes undetected and the
/// result is computed as if the pulled prefix were the whole set. Consume
/// the full traversal (or validate the inputs beforehand) when every element
/// must be checked.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{OrderingViolation, PairwiseExt, checked_pairwise_traversal};
///
/// let common: Result<Vec<i32>, _> =
///     checked_pairwise_traversal([1, 2, 3], [2, 3], i32::cmp).intersection().collect();
/// assert_eq!(common, Ok(vec![2, 3]));
///
/// let broken: Result<Vec<i32>, _> =
///     checked_pairwise_traversal([1, 3, 2], [1, 2, 3], i32::cmp).intersection().collect();
/// assert_eq!(broken, Err(OrderingViolation { position: 2 }));
///
/// // The source ends first, so intersection stops before reaching the
/// // out-of-order `0` in the target.
/// let unchecked_tail: Result<Vec<i32>, _> =
///     checked_pairwise_traversal([0], [1, 0], i32::cmp).intersection().collect();
/// assert_eq!(unchecked_tail, Ok(vec![]));
/// ```
pub fn checked_pairwise_traversal<S, T, E, C>(
    source: S,
    target: T,
    comparator: C,
) -> CheckedPairwiseTraversal<S::IntoIter, T::IntoIter, C>
where
    S: IntoIterator<Item = E>,
    T: IntoIterator<Item = E>,
    E: Clone,
    C: FnMut(&E, &E) -> Ordering + Clone,
{
    let source = ensure_sorted_set(source, comparator.clone());
    let target = ensure_sorted_set(target, comparator.clone());
    TryPairwiseTraversal {
        source,
        target,
        comparator,
        join: MergeJoin::<E, E, OrderingViolation>::new(),
    }
}
