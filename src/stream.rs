//! Stream variants of the traversal, the validator and the set operations.
//!
//! Every type here mirrors its iterator counterpart and yields the same
//! items in the same order. The only suspension points are the polls of the
//! two input streams; the source is always polled before the target, and a
//! side is polled only when its cursor needs an element.
//!
//! # Examples
//!
//! ```rust
//! use futures::stream::{self, StreamExt};
//! use mergejoin::stream::{PairwiseStreamExt, pairwise_stream};
//!
//! # futures::executor::block_on(async {
//! let numbers = stream::iter(0..8);
//! let evens = stream::iter([0, 2, 4, 6]);
//! let odd: Vec<i32> = pairwise_stream(numbers, evens, i32::cmp)
//!     .difference()
//!     .collect()
//!     .await;
//! assert_eq!(odd, vec![1, 3, 5, 7]);
//! # });
//! ```

use std::cmp::Ordering;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::stream::{FusedStream, Map, Stream, StreamExt, TryStream};
use pin_project_lite::pin_project;

use crate::algebra::{
    DiffOp, DifferenceOp, IntersectionOp, NoDiffer, Select, Selection, StepItem,
    SymmetricDifferenceOp,
};
use crate::error::OrderingViolation;
use crate::merge::{MergeJoin, Progress};
use crate::step::PairwiseStep;
use crate::validate::Monotonic;

// =============================================================================
// Traversal
// =============================================================================

pin_project! {
    /// Stream returned by [`try_pairwise_stream`].
    #[must_use = "streams do nothing unless polled"]
    pub struct TryPairwiseStream<S, T, C>
    where
        S: TryStream,
        T: TryStream<Error = S::Error>,
    {
        #[pin]
        source: S,
        #[pin]
        target: T,
        comparator: C,
        join: MergeJoin<S::Ok, T::Ok, S::Error>,
    }
}

/// Traverses two fallible sorted streams in lockstep.
///
/// Same contract as [`try_pairwise_traversal`](crate::try_pairwise_traversal):
/// an input error is yielded once and ends the stream.
pub fn try_pairwise_stream<S, T, C>(source: S, target: T, comparator: C) -> TryPairwiseStream<S, T, C>
where
    S: TryStream,
    T: TryStream<Error = S::Error>,
    C: FnMut(&S::Ok, &T::Ok) -> Ordering,
{
    TryPairwiseStream {
        source,
        target,
        comparator,
        join: MergeJoin::new(),
    }
}

impl<S, T, C> Stream for TryPairwiseStream<S, T, C>
where
    S: TryStream,
    T: TryStream<Error = S::Error>,
    C: FnMut(&S::Ok, &T::Ok) -> Ordering,
{
    type Item = Result<PairwiseStep<S::Ok, T::Ok>, S::Error>;

    fn poll_next(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if this.join.needs_source() {
                let pulled = ready!(this.source.as_mut().try_poll_next(context));
                this.join.fill_source(pulled);
            }
            if this.join.needs_target() {
                let pulled = ready!(this.target.as_mut().try_poll_next(context));
                this.join.fill_target(pulled);
            }
            if let Progress::Ready(item) = this.join.advance(this.comparator) {
                return Poll::Ready(item);
            }
        }
    }
}

impl<S, T, C> FusedStream for TryPairwiseStream<S, T, C>
where
    S: TryStream,
    T: TryStream<Error = S::Error>,
    C: FnMut(&S::Ok, &T::Ok) -> Ordering,
{
    fn is_terminated(&self) -> bool {
        self.join.is_finished()
    }
}

type Infallibly<S> = Map<S, fn(<S as Stream>::Item) -> Result<<S as Stream>::Item, Infallible>>;

fn infallibly<S: Stream>(stream: S) -> Infallibly<S> {
    stream.map(Ok as fn(S::Item) -> Result<S::Item, Infallible>)
}

pin_project! {
    /// Stream returned by [`pairwise_stream`].
    #[must_use = "streams do nothing unless polled"]
    pub struct PairwiseStream<S, T, C>
    where
        S: Stream,
        T: Stream,
    {
        #[pin]
        inner: TryPairwiseStream<Infallibly<S>, Infallibly<T>, C>,
    }
}

/// Traverses two sorted streams in lockstep, yielding one step per comparison.
///
/// Same contract as [`pairwise_traversal`](crate::pairwise_traversal).
pub fn pairwise_stream<S, T, C>(source: S, target: T, comparator: C) -> PairwiseStream<S, T, C>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    PairwiseStream {
        inner: try_pairwise_stream(infallibly(source), infallibly(target), comparator),
    }
}

impl<S, T, C> Stream for PairwiseStream<S, T, C>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    type Item = PairwiseStep<S::Item, T::Item>;

    fn poll_next(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(context).map(|item| {
            item.map(|result| {
                let Ok(step) = result;
                step
            })
        })
    }
}

impl<S, T, C> FusedStream for PairwiseStream<S, T, C>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}

// =============================================================================
// Validation
// =============================================================================

pin_project! {
    /// Stream returned by [`ensure_sorted_stream`].
    #[must_use = "streams do nothing unless polled"]
    pub struct EnsureSortedStream<S, C>
    where
        S: Stream,
    {
        #[pin]
        stream: S,
        comparator: C,
        guard: Monotonic<S::Item>,
    }
}

/// Checks each element of `stream` against its predecessor as it arrives.
///
/// Same contract as [`ensure_sorted_set`](crate::ensure_sorted_set). The
/// check runs after the inner stream yields, so a violation is reported when
/// the offending element is polled, never at construction.
///
/// # Examples
///
/// ```rust
/// use futures::stream::{self, StreamExt};
/// use mergejoin::OrderingViolation;
/// use mergejoin::stream::ensure_sorted_stream;
///
/// # futures::executor::block_on(async {
/// let checked: Vec<_> = ensure_sorted_stream(stream::iter([0, 0]), i32::cmp).collect().await;
/// assert_eq!(checked, vec![Ok(0), Err(OrderingViolation { position: 1 })]);
/// # });
/// ```
pub fn ensure_sorted_stream<S, C>(stream: S, comparator: C) -> EnsureSortedStream<S, C>
where
    S: Stream,
    S::Item: Clone,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    EnsureSortedStream {
        stream,
        comparator,
        guard: Monotonic::new(),
    }
}

impl<S, C> Stream for EnsureSortedStream<S, C>
where
    S: Stream,
    S::Item: Clone,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    type Item = Result<S::Item, OrderingViolation>;

    fn poll_next(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if this.guard.is_done() {
            return Poll::Ready(None);
        }
        match ready!(this.stream.poll_next(context)) {
            Some(current) => Poll::Ready(Some(this.guard.accept(current, this.comparator))),
            None => {
                this.guard.finish();
                Poll::Ready(None)
            }
        }
    }
}

impl<S, C> FusedStream for EnsureSortedStream<S, C>
where
    S: Stream,
    S::Item: Clone,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    fn is_terminated(&self) -> bool {
        self.guard.is_done()
    }
}

/// A stream traversal whose inputs are both checked by [`ensure_sorted_stream`].
pub type CheckedPairwiseStream<S, T, C> =
    TryPairwiseStream<EnsureSortedStream<S, C>, EnsureSortedStream<T, C>, C>;

/// Traverses two sorted streams, validating both as they are polled.
///
/// Validation covers only the elements actually polled. An early exit of
/// [`PairwiseStreamExt::intersection`] or [`PairwiseStreamExt::difference`]
/// stops polling, so a violation in input it never reaches goes undetected.
pub fn checked_pairwise_stream<S, T, E, C>(
    source: S,
    target: T,
    comparator: C,
) -> CheckedPairwiseStream<S, T, C>
where
    S: Stream<Item = E>,
    T: Stream<Item = E>,
    E: Clone,
    C: FnMut(&E, &E) -> Ordering + Clone,
{
    let source = ensure_sorted_stream(source, comparator.clone());
    let target = ensure_sorted_stream(target, comparator.clone());
    try_pairwise_stream(source, target, comparator)
}

// =============================================================================
// Set operations
// =============================================================================

pin_project! {
    /// Applies a [`Select`] operation to a step stream.
    #[must_use = "streams do nothing unless polled"]
    pub struct SetStream<St, Op> {
        #[pin]
        steps: St,
        operation: Op,
        finished: bool,
    }
}

impl<St, Op> SetStream<St, Op> {
    /// Wraps `steps` with `operation`.
    pub const fn new(steps: St, operation: Op) -> Self {
        Self {
            steps,
            operation,
            finished: false,
        }
    }
}

impl<St, Op> Stream for SetStream<St, Op>
where
    St: Stream,
    St::Item: StepItem,
    Op: Select<<St::Item as StepItem>::Source, <St::Item as StepItem>::Target>,
{
    type Item = <St::Item as StepItem>::Wrapped<Op::Output>;

    fn poll_next(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        while !*this.finished {
            let Some(item) = ready!(this.steps.as_mut().poll_next(context)) else {
                *this.finished = true;
                break;
            };
            match item.route(|step| this.operation.select(step)) {
                Selection::Emit(output) => return Poll::Ready(Some(output)),
                Selection::Final(output) => {
                    *this.finished = true;
                    return Poll::Ready(Some(output));
                }
                Selection::Skip => {}
                Selection::Stop => *this.finished = true,
            }
        }
        Poll::Ready(None)
    }
}

impl<St, Op> FusedStream for SetStream<St, Op>
where
    St: Stream,
    St::Item: StepItem,
    Op: Select<<St::Item as StepItem>::Source, <St::Item as StepItem>::Target>,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

/// Set operations as methods on step streams.
pub trait PairwiseStreamExt: Stream + Sized
where
    Self::Item: StepItem,
{
    /// Source elements without a target match.
    fn difference(self) -> SetStream<Self, DifferenceOp> {
        SetStream::new(self, DifferenceOp)
    }

    /// Unmatched elements from either side.
    fn symmetric_difference(self) -> SetStream<Self, SymmetricDifferenceOp> {
        SetStream::new(self, SymmetricDifferenceOp)
    }

    /// Exclusive entries only.
    fn diff(
        self,
    ) -> SetStream<Self, DiffOp<NoDiffer<<Self::Item as StepItem>::Source, <Self::Item as StepItem>::Target>>>
    {
        SetStream::new(self, DiffOp::exclusive_only())
    }

    /// Exclusive entries, plus matched pairs for which `differ` returns `true`.
    fn diff_with<D>(self, differ: D) -> SetStream<Self, DiffOp<D>>
    where
        D: FnMut(&<Self::Item as StepItem>::Source, &<Self::Item as StepItem>::Target) -> bool,
    {
        SetStream::new(self, DiffOp::with(differ))
    }

    /// Source elements with a target match, stopping early once no match can follow.
    fn intersection(self) -> SetStream<Self, IntersectionOp> {
        SetStream::new(self, IntersectionOp)
    }
}

impl<St> PairwiseStreamExt for St
where
    St: Stream,
    St::Item: StepItem,
{
}

/// Stream form of [`difference`](crate::difference).
pub fn difference<M, S, C>(
    minuend: M,
    subtrahend: S,
    comparator: C,
) -> SetStream<PairwiseStream<M, S, C>, DifferenceOp>
where
    M: Stream,
    S: Stream,
    C: FnMut(&M::Item, &S::Item) -> Ordering,
{
    pairwise_stream(minuend, subtrahend, comparator).difference()
}

/// Stream form of [`symmetric_difference`](crate::symmetric_difference).
pub fn symmetric_difference<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> SetStream<PairwiseStream<S, T, C>, SymmetricDifferenceOp>
where
    S: Stream,
    T: Stream<Item = S::Item>,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    pairwise_stream(source, target, comparator).symmetric_difference()
}

/// Stream form of [`diff`](crate::diff).
pub fn diff<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> SetStream<PairwiseStream<S, T, C>, DiffOp<NoDiffer<S::Item, T::Item>>>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    pairwise_stream(source, target, comparator).diff()
}

/// Stream form of [`diff_with`](crate::diff_with).
pub fn diff_with<S, T, C, D>(
    source: S,
    target: T,
    comparator: C,
    differ: D,
) -> SetStream<PairwiseStream<S, T, C>, DiffOp<D>>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
    D: FnMut(&S::Item, &T::Item) -> bool,
{
    pairwise_stream(source, target, comparator).diff_with(differ)
}

/// Stream form of [`intersection`](crate::intersection).
pub fn intersection<S, T, C>(
    source: S,
    target: T,
    comparator: C,
) -> SetStream<PairwiseStream<S, T, C>, IntersectionOp>
where
    S: Stream,
    T: Stream,
    C: FnMut(&S::Item, &T::Item) -> Ordering,
{
    pairwise_stream(source, target, comparator).intersection()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Pairing;
    use futures::stream;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_stream_traversal_flags_match_iterator() {
        let steps: Vec<_> = pairwise_stream(stream::iter(Vec::<i32>::new()), stream::iter([0, 1, 2]), i32::cmp)
            .collect()
            .await;
        assert_eq!(
            steps,
            vec![
                PairwiseStep::new(Pairing::TargetOnly(0), true, false),
                PairwiseStep::new(Pairing::TargetOnly(1), true, false),
                PairwiseStep::new(Pairing::TargetOnly(2), true, true),
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_stream_traversal_survives_pending_inputs() {
        let slow = |values: Vec<i32>| {
            stream::iter(values).then(|value| async move {
                tokio::task::yield_now().await;
                value
            })
        };
        let common: Vec<_> = intersection(slow(vec![1, 2, 3, 5]), slow(vec![2, 3, 4]), i32::cmp)
            .collect()
            .await;
        assert_eq!(common, vec![2, 3]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_try_stream_error_ends_traversal() {
        let source = stream::iter(vec![Ok(1), Err("stream reset")]);
        let target = stream::iter(vec![Ok::<i32, &str>(4)]);
        let mut steps = try_pairwise_stream(source, target, i32::cmp);

        assert_eq!(
            steps.next().await,
            Some(Ok(PairwiseStep::new(Pairing::SourceOnly(1), false, false)))
        );
        assert_eq!(steps.next().await, Some(Err("stream reset")));
        assert_eq!(steps.next().await, None);
        assert!(steps.is_terminated());
    }

    #[rstest]
    #[tokio::test]
    async fn test_ensure_sorted_stream_rejects_out_of_order() {
        let checked: Vec<_> = ensure_sorted_stream(stream::iter([1, 0]), i32::cmp).collect().await;
        assert_eq!(checked, vec![Ok(1), Err(OrderingViolation { position: 1 })]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_checked_stream_early_exit_leaves_unpolled_input_unvalidated() {
        let common: Vec<_> = checked_pairwise_stream(stream::iter([0]), stream::iter([1, 0]), i32::cmp)
            .intersection()
            .collect()
            .await;
        assert!(common.is_empty());

        let steps: Vec<_> = checked_pairwise_stream(stream::iter([0]), stream::iter([1, 0]), i32::cmp)
            .collect()
            .await;
        assert_eq!(steps.last(), Some(&Err(OrderingViolation { position: 1 })));
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_stream_is_terminated_after_early_exit() {
        let mut common = intersection(stream::iter([1, 9]), stream::iter([1, 2]), i32::cmp);
        assert_eq!(common.next().await, Some(1));
        assert_eq!(common.next().await, None);
        assert!(common.is_terminated());
    }
}
