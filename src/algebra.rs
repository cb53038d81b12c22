//! Set algebra over pairwise traversals.
//!
//! Every operation is a lazy filter over the steps of a traversal:
//!
//! | Operation              | Yields                                             |
//! |------------------------|----------------------------------------------------|
//! | `difference`           | source elements without a target match             |
//! | `symmetric_difference` | elements without a match, from either side         |
//! | `diff` / `diff_with`   | exclusive entries, plus changed matched pairs      |
//! | `intersection`         | source elements with a target match                |
//!
//! The free functions build the traversal for you. [`PairwiseExt`] offers the
//! same operations as methods on any step iterator, including the fallible
//! steps of [`try_pairwise_traversal`](crate::try_pairwise_traversal) and
//! [`checked_pairwise_traversal`](crate::checked_pairwise_traversal), where
//! errors pass through and end the output.
//!
//! # Examples
//!
//! ```rust
//! use mergejoin::{difference, intersection, symmetric_difference};
//!
//! let numbers = 0..8;
//! let evens = [0, 2, 4, 6];
//!
//! assert_eq!(difference(numbers.clone(), evens, i32::cmp).collect::<Vec<_>>(), vec![1, 3, 5, 7]);
//! assert_eq!(intersection(numbers.clone(), evens, i32::cmp).collect::<Vec<_>>(), vec![0, 2, 4, 6]);
//! assert_eq!(
//!     symmetric_difference(numbers, evens, i32::cmp).collect::<Vec<_>>(),
//!     vec![1, 3, 5, 7]
//! );
//! ```

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::step::{Diff, ExclusiveDiff, Pairing, PairwiseStep};
use crate::traversal::{PairwiseTraversal, pairwise_traversal};

/// What a set operation does with one traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<O> {
    /// Yield a value and keep going.
    Emit(O),
    /// Yield a value, then end.
    Final(O),
    /// Yield nothing for this step.
    Skip,
    /// End without yielding.
    Stop,
}

impl<O> Selection<O> {
    /// Maps the carried value.
    pub fn map<P, F>(self, function: F) -> Selection<P>
    where
        F: FnOnce(O) -> P,
    {
        match self {
            Self::Emit(value) => Selection::Emit(function(value)),
            Self::Final(value) => Selection::Final(function(value)),
            Self::Skip => Selection::Skip,
            Self::Stop => Selection::Stop,
        }
    }
}

/// A set operation expressed as a per-step decision.
pub trait Select<A, B> {
    /// The yielded value.
    type Output;

    /// Decides what to do with `step`.
    fn select(&mut self, step: PairwiseStep<A, B>) -> Selection<Self::Output>;
}

/// A traversal item: either a plain step or a `Result` around one.
///
/// Lets one adapter serve infallible and fallible traversals. Errors are
/// emitted unchanged; the underlying traversal ends after them.
pub trait StepItem {
    /// Source element type.
    type Source;
    /// Target element type.
    type Target;
    /// The adapter's item for an operation output `O`.
    type Wrapped<O>;

    /// Runs `select` on the step, or passes an error through.
    fn route<O, F>(self, select: F) -> Selection<Self::Wrapped<O>>
    where
        F: FnOnce(PairwiseStep<Self::Source, Self::Target>) -> Selection<O>;
}

impl<A, B> StepItem for PairwiseStep<A, B> {
    type Source = A;
    type Target = B;
    type Wrapped<O> = O;

    #[inline]
    fn route<O, F>(self, select: F) -> Selection<O>
    where
        F: FnOnce(PairwiseStep<A, B>) -> Selection<O>,
    {
        select(self)
    }
}

impl<A, B, Er> StepItem for Result<PairwiseStep<A, B>, Er> {
    type Source = A;
    type Target = B;
    type Wrapped<O> = Result<O, Er>;

    #[inline]
    fn route<O, F>(self, select: F) -> Selection<Result<O, Er>>
    where
        F: FnOnce(PairwiseStep<A, B>) -> Selection<O>,
    {
        match self {
            Ok(step) => select(step).map(Ok),
            Err(error) => Selection::Emit(Err(error)),
        }
    }
}

/// Source elements without a match.
///
/// Ends as soon as the source is exhausted, without pulling the rest of
/// the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferenceOp;

impl<A, B> Select<A, B> for DifferenceOp {
    type Output = A;

    fn select(&mut self, step: PairwiseStep<A, B>) -> Selection<A> {
        match (step.pairing, step.source_exhausted) {
            (Pairing::SourceOnly(source), false) => Selection::Emit(source),
            (Pairing::SourceOnly(source), true) => Selection::Final(source),
            (_, true) => Selection::Stop,
            (_, false) => Selection::Skip,
        }
    }
}

/// Unmatched elements from either side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricDifferenceOp;

impl<A> Select<A, A> for SymmetricDifferenceOp {
    type Output = A;

    fn select(&mut self, step: PairwiseStep<A, A>) -> Selection<A> {
        match step.pairing {
            Pairing::SourceOnly(element) | Pairing::TargetOnly(element) => Selection::Emit(element),
            Pairing::Both(_, _) => Selection::Skip,
        }
    }
}

/// The predicate type used by [`diff`] when no differ is given.
pub type NoDiffer<A, B = A> = fn(&A, &B) -> bool;

/// Exclusive entries, plus matched pairs the differ judges different.
#[derive(Debug, Clone, Copy)]
pub struct DiffOp<D> {
    differ: Option<D>,
}

impl<D> DiffOp<D> {
    /// Reports matched pairs when `differ` returns `true` for them.
    pub const fn with(differ: D) -> Self {
        Self {
            differ: Some(differ),
        }
    }

    /// Never reports matched pairs.
    pub const fn exclusive_only() -> Self {
        Self { differ: None }
    }
}

impl<A, B, D> Select<A, B> for DiffOp<D>
where
    D: FnMut(&A, &B) -> bool,
{
    type Output = Diff<A, B>;

    fn select(&mut self, step: PairwiseStep<A, B>) -> Selection<Diff<A, B>> {
        match step.pairing {
            Pairing::SourceOnly(source) => Selection::Emit(ExclusiveDiff::Source(source).into()),
            Pairing::TargetOnly(target) => Selection::Emit(ExclusiveDiff::Target(target).into()),
            Pairing::Both(source, target) => {
                let changed = self
                    .differ
                    .as_mut()
                    .is_some_and(|differ| differ(&source, &target));
                if changed {
                    Selection::Emit(Diff::Changed(source, target))
                } else {
                    Selection::Skip
                }
            }
        }
    }
}

/// Source elements with a match.
///
/// Stops at the first unmatched step taken after either side is exhausted:
/// with both inputs strictly sorted, no match can follow.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionOp;

impl<A, B> Select<A, B> for IntersectionOp {
    type Output = A;

    fn select(&mut self, step: PairwiseStep<A, B>) -> Selection<A> {
        let either_exhausted = step.either_exhausted();
        match step.pairing {
            Pairing::Both(source, _) => Selection::Emit(source),
            _ if either_exhausted => {
                tracing::trace!(
                    source_exhausted = step.source_exhausted,
                    target_exhausted = step.target_exhausted,
                    "intersection stops early"
                );
                Selection::Stop
            }
            _ => Selection::Skip,
        }
    }
}

/// Applies a [`Select`] operation to a step iterator.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Debug, Clone)]
pub struct SetIter<I, Op> {
    steps: I,
    operation: Op,
    finished: bool,
}

impl<I, Op> SetIter<I, Op> {
    /// Wraps `steps` with `operation`.
    pub const fn new(steps: I, operation: Op) -> Self {
        Self {
            steps,
            operation,
            finished: false,
        }
    }
}

impl<I, Op> Iterator for SetIter<I, Op>
where
    I: Iterator,
    I::Item: StepItem,
    Op: Select<<I::Item as StepItem>::Source, <I::Item as StepItem>::Target>,
{
    type Item = <I::Item as StepItem>::Wrapped<Op::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let Some(item) = self.steps.next() else {
                self.finished = true;
                break;
            };
            match item.route(|step| self.operation.select(step)) {
                Selection::Emit(output) => return Some(output),
                Selection::Final(output) => {
                    self.finished = true;
                    return Some(output);
                }
                Selection::Skip => {}
                Selection::Stop => self.finished = true,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, self.steps.size_hint().1)
        }
    }
}

impl<I, Op> FusedIterator for SetIter<I, Op>
where
    I: Iterator,
    I::Item: StepItem,
    Op: Select<<I::Item as StepItem>::Source, <I::Item as StepItem>::Target>,
{
}

/// Set operations as methods on step iterators.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{PairwiseExt, pairwise_traversal};
///
/// let common: Vec<_> = pairwise_traversal([1, 2, 3], [2, 3, 4], i32::cmp)
///     .intersection()
///     .collect();
/// assert_eq!(common, vec![2, 3]);
/// ```
pub trait PairwiseExt: Iterator + Sized
where
    Self::Item: StepItem,
{
    /// Source elements without a target match.
    fn difference(self) -> SetIter<Self, DifferenceOp> {
        SetIter::new(self, DifferenceOp)
    }

    /// Unmatched elements from either side.
    fn symmetric_difference(self) -> SetIter<Self, SymmetricDifferenceOp> {
        SetIter::new(self, SymmetricDifferenceOp)
    }

    /// Exclusive entries only.
    fn diff(
        self,
    ) -> SetIter<Self, DiffOp<NoDiffer<<Self::Item as StepItem>::Source, <Self::Item as StepItem>::Target>>>
    {
        SetIter::new(self, DiffOp::exclusive_only())
    }

    /// Exclusive entries, plus matched pairs for which `differ` returns `true`.
    fn diff_with<D>(self, differ: D) -> SetIter<Self, DiffOp<D>>
    where
        D: FnMut(&<Self::Item as StepItem>::Source, &<Self::Item as StepItem>::Target) -> bool,
    {
        SetIter::new(self, DiffOp::with(differ))
    }

    /// Source elements with a target match, stopping early once no match can follow.
    fn intersection(self) -> SetIter<Self, IntersectionOp> {
        SetIter::new(self, IntersectionOp)
    }
}

impl<I> PairwiseExt for I
where
    I: Iterator,
    I::Item: StepItem,
{
}

/// Iterator returned by [`difference`].
pub type Difference<S, T, C> = SetIter<PairwiseTraversal<S, T, C>, DifferenceOp>;

/// Iterator returned by [`symmetric_difference`].
pub type SymmetricDifference<S, T, C> = SetIter<PairwiseTraversal<S, T, C>, SymmetricDifferenceOp>;

/// Iterator returned by [`diff`] and [`diff_with`].
pub type Diffs<S, T, C, D> = SetIter<PairwiseTraversal<S, T, C>, DiffOp<D>>;

/// Iterator returned by [`intersection`].
pub type Intersection<S, T, C> = SetIter<PairwiseTraversal<S, T, C>, IntersectionOp>;

/// Yields the elements of `minuend` that have no comparator-equal element in `subtrahend`.
///
/// Stops pulling `subtrahend` once `minuend` is exhausted.
///
/// # Examples
///
/// ```rust
/// use mergejoin::difference;
///
/// let remaining: Vec<_> = difference([1, 2, 3, 4], [2, 4], i32::cmp).collect();
/// assert_eq!(remaining, vec![1, 3]);
/// ```
pub fn difference<M, S, C>(
    minuend: M,
    subtrahend: S,
    comparator: C,
) -> Difference<M::IntoIter, S::IntoIter, C>
where
    M: IntoIterator,
    S: IntoIterator,
    C: FnMut(&M::Item, &S::Item) -> Ordering,
{
    pairwise_traversal(minuend, subtrahend, comparator).difference()
}

/// Yields the elements found on exactly one side, in merged order.
///
/// # Examples
///
/// ```rust
/// use mergejoin::symmetric_difference;
///
/// let unique: Vec<_> = symmetric_difference([1, 2, 3], [2, 3, 4], i32::cmp).collect();
/// assert_eq!(unique, vec![1, 4]);
/// ```
pub fn symmetric_difference<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> SymmetricDifference<S::IntoIter, T::IntoIter, C>
where
    S: IntoIterator,
    T: IntoIterator<Item = S::Item>,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    pairwise_traversal(source, target, comparator).symmetric_difference()
}

/// Yields the exclusive entries of two sorted sets.
///
/// Matched elements never produce output; see [`diff_with`] to report
/// matched elements that differ.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Diff, ExclusiveDiff, diff};
///
/// let entries: Vec<_> = diff([1, 2], [2, 3], i32::cmp).collect();
/// assert_eq!(
///     entries,
///     vec![
///         Diff::Exclusive(ExclusiveDiff::Source(1)),
///         Diff::Exclusive(ExclusiveDiff::Target(3)),
///     ]
/// );
/// ```
pub fn diff<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> Diffs<S::IntoIter, T::IntoIter, C, NoDiffer<S::Item, T::Item>>
where
    S: IntoIterator,
    T: IntoIterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    pairwise_traversal(source, target, comparator).diff()
}

/// Yields the exclusive entries plus every matched pair for which `differ` returns `true`.
///
/// `differ` is only called on comparator-equal pairs. Reconciling two keyed
/// snapshots this way gives removals (`Source`), additions (`Target`) and
/// updates (`Changed`).
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Diff, diff_with};
///
/// let before = [(1, "x"), (2, "y")];
/// let after = [(1, "x"), (2, "z")];
/// let changes: Vec<_> = diff_with(
///     before,
///     after,
///     |a, b| a.0.cmp(&b.0),
///     |a, b| a.1 != b.1,
/// )
/// .collect();
/// assert_eq!(changes, vec![Diff::Changed((2, "y"), (2, "z"))]);
/// ```
pub fn diff_with<S, T, C, D>(
    source: S,
    target: T,
    comparator: C,
    differ: D,
) -> Diffs<S::IntoIter, T::IntoIter, C, D>
where
    S: IntoIterator,
    T: IntoIterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
    D: FnMut(&S::Item, &T::Item) -> bool,
{
    pairwise_traversal(source, target, comparator).diff_with(differ)
}

/// Yields the elements of `source` that have a comparator-equal element in `target`.
///
/// Iteration stops at the first unmatched step after either side is
/// exhausted. That early exit is only sound for strictly sorted inputs; use
/// [`checked_pairwise_traversal`](crate::checked_pairwise_traversal) with
/// [`PairwiseExt::intersection`] to have the inputs checked.
///
/// # Examples
///
/// ```rust
/// use mergejoin::intersection;
///
/// // Terminates although the source is infinite.
/// let common: Vec<_> = intersection(0_u32.., [3, 5, 8], u32::cmp).collect();
/// assert_eq!(common, vec![3, 5, 8]);
/// ```
pub fn intersection<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> Intersection<S::IntoIter, T::IntoIter, C>
where
    S: IntoIterator,
    T: IntoIterator,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    pairwise_traversal(source, target, comparator).intersection()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::try_pairwise_traversal;
    use rstest::rstest;

    fn step<A, B>(
        pairing: Pairing<A, B>,
        source_exhausted: bool,
        target_exhausted: bool,
    ) -> PairwiseStep<A, B> {
        PairwiseStep::new(pairing, source_exhausted, target_exhausted)
    }

    #[rstest]
    fn test_selection_map_keeps_control_flow() {
        assert_eq!(Selection::Emit(1).map(|n| n + 1), Selection::Emit(2));
        assert_eq!(Selection::Final(1).map(|n| n + 1), Selection::Final(2));
        assert_eq!(Selection::<i32>::Skip.map(|n| n + 1), Selection::Skip);
        assert_eq!(Selection::<i32>::Stop.map(|n| n + 1), Selection::Stop);
    }

    #[rstest]
    #[case(step(Pairing::SourceOnly(1), false, false), Selection::Emit(1))]
    #[case(step(Pairing::SourceOnly(1), true, false), Selection::Final(1))]
    #[case(step(Pairing::TargetOnly(1), false, false), Selection::Skip)]
    #[case(step(Pairing::TargetOnly(1), true, false), Selection::Stop)]
    #[case(step(Pairing::Both(1, 1), false, true), Selection::Skip)]
    fn test_difference_op(#[case] input: PairwiseStep<i32>, #[case] expected: Selection<i32>) {
        assert_eq!(DifferenceOp.select(input), expected);
    }

    #[rstest]
    #[case(step(Pairing::Both(1, 1), true, true), Selection::Emit(1))]
    #[case(step(Pairing::SourceOnly(1), false, false), Selection::Skip)]
    #[case(step(Pairing::SourceOnly(1), false, true), Selection::Stop)]
    #[case(step(Pairing::TargetOnly(1), true, false), Selection::Stop)]
    fn test_intersection_op(#[case] input: PairwiseStep<i32>, #[case] expected: Selection<i32>) {
        assert_eq!(IntersectionOp.select(input), expected);
    }

    #[rstest]
    fn test_diff_without_differ_skips_matches() {
        let mut operation: DiffOp<NoDiffer<i32>> = DiffOp::exclusive_only();
        assert_eq!(operation.select(step(Pairing::Both(1, 2), false, false)), Selection::Skip);
    }

    #[rstest]
    fn test_diff_with_differ_reports_changed_pairs() {
        let mut operation = DiffOp::with(|a: &i32, b: &i32| a != b);
        assert_eq!(
            operation.select(step(Pairing::Both(1, 2), false, false)),
            Selection::Emit(Diff::Changed(1, 2))
        );
        assert_eq!(operation.select(step(Pairing::Both(3, 3), false, false)), Selection::Skip);
    }

    #[rstest]
    fn test_end_to_end_numbers_and_evens() {
        let numbers = 0..8;
        let evens = [0, 2, 4, 6];
        assert_eq!(
            difference(numbers.clone(), evens, i32::cmp).collect::<Vec<_>>(),
            vec![1, 3, 5, 7]
        );
        assert_eq!(
            intersection(numbers.clone(), evens, i32::cmp).collect::<Vec<_>>(),
            vec![0, 2, 4, 6]
        );
        assert_eq!(
            symmetric_difference(numbers, evens, i32::cmp).collect::<Vec<_>>(),
            vec![1, 3, 5, 7]
        );
    }

    #[rstest]
    fn test_difference_stops_pulling_subtrahend_after_minuend_ends() {
        let infinite = 10_u32..;
        let remaining: Vec<_> = difference([1, 2, 3], infinite, u32::cmp).collect();
        assert_eq!(remaining, vec![1, 2, 3]);
    }

    #[rstest]
    fn test_difference_with_empty_sides() {
        assert_eq!(difference(Vec::<i32>::new(), [1, 2], i32::cmp).count(), 0);
        assert_eq!(difference([1, 2], Vec::<i32>::new(), i32::cmp).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[rstest]
    fn test_intersection_yields_source_side_elements() {
        let source = [(1, 'a'), (2, 'b'), (3, 'c')];
        let keys = [2, 3];
        let found: Vec<_> = intersection(source, keys, |entry: &(i32, char), key: &i32| {
            entry.0.cmp(key)
        })
        .collect();
        assert_eq!(found, vec![(2, 'b'), (3, 'c')]);
    }

    #[rstest]
    fn test_intersection_stops_on_infinite_target() {
        let common: Vec<_> = intersection([2, 4, 100], 0_u64.., u64::cmp).collect();
        assert_eq!(common, vec![2, 4, 100]);
    }

    #[rstest]
    fn test_symmetric_difference_interleaves_sides() {
        let unique: Vec<_> = symmetric_difference([0, 2, 4], [1, 2, 5], i32::cmp).collect();
        assert_eq!(unique, vec![0, 1, 4, 5]);
    }

    #[rstest]
    fn test_diff_exclusive_entries_in_merged_order() {
        let entries: Vec<_> = diff([1, 3], [2, 3, 4], i32::cmp).collect();
        assert_eq!(
            entries,
            vec![
                Diff::Exclusive(ExclusiveDiff::Source(1)),
                Diff::Exclusive(ExclusiveDiff::Target(2)),
                Diff::Exclusive(ExclusiveDiff::Target(4)),
            ]
        );
    }

    #[rstest]
    fn test_errors_pass_through_set_operations() {
        let source: Vec<Result<i32, &str>> = vec![Ok(1), Ok(2), Err("lost connection")];
        let target: Vec<Result<i32, &str>> = vec![Ok(2), Ok(3)];
        let items: Vec<_> = try_pairwise_traversal(source, target, i32::cmp)
            .difference()
            .collect();
        assert_eq!(items, vec![Ok(1), Err("lost connection")]);
    }

    #[rstest]
    fn test_set_iter_is_fused_after_stop() {
        let mut common = intersection([1, 5], [1, 2], i32::cmp);
        assert_eq!(common.next(), Some(1));
        assert_eq!(common.next(), None);
        assert_eq!(common.next(), None);
        assert_eq!(common.size_hint(), (0, Some(0)));
    }
}
