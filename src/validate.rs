//! Lazy validation of the sorted-set precondition.
//!
//! [`ensure_sorted_set`] passes every element through unchanged while
//! checking that it is strictly greater than the one before it. The check
//! runs as each element is pulled, so infinite inputs are supported and
//! nothing is inspected ahead of demand.
//!
//! # Examples
//!
//! ```rust
//! use mergejoin::{OrderingViolation, ensure_sorted_set};
//!
//! let checked: Vec<_> = ensure_sorted_set([0, 2, 2], i32::cmp).collect();
//! assert_eq!(checked, vec![Ok(0), Ok(2), Err(OrderingViolation { position: 2 })]);
//! ```

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::error::OrderingViolation;

/// Remembers the last accepted element of a sequence.
///
/// Shared by the iterator and stream validators.
#[derive(Debug, Clone)]
pub(crate) struct Monotonic<E> {
    last: Option<E>,
    position: usize,
    done: bool,
}

impl<E: Clone> Monotonic<E> {
    pub(crate) const fn new() -> Self {
        Self {
            last: None,
            position: 0,
            done: false,
        }
    }

    pub(crate) const fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) const fn finish(&mut self) {
        self.done = true;
    }

    /// Accepts `current` if it is strictly greater than the last accepted element.
    ///
    /// A rejection ends the sequence.
    pub(crate) fn accept<C>(&mut self, current: E, comparator: &mut C) -> Result<E, OrderingViolation>
    where
        C: FnMut(&E, &E) -> Ordering,
    {
        if let Some(last) = &self.last
            && comparator(last, &current) != Ordering::Less
        {
            self.done = true;
            self.last = None;
            tracing::debug!(
                position = self.position,
                "element does not extend the sorted set"
            );
            return Err(OrderingViolation {
                position: self.position,
            });
        }

        self.last = Some(current.clone());
        self.position += 1;
        Ok(current)
    }
}

/// Iterator returned by [`ensure_sorted_set`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct EnsureSortedSet<I: Iterator, C> {
    iterator: I,
    comparator: C,
    guard: Monotonic<I::Item>,
}

/// Wraps `iterable` so that every pulled element is checked against its predecessor.
///
/// Yields `Ok(element)` while the input is strictly increasing under
/// `comparator`. The first element that compares less than or equal to its
/// predecessor yields `Err(OrderingViolation)`, and the iterator ends there.
/// Duplicates are rejected the same way as out-of-order elements.
///
/// Elements are cloned to remember the last one; iterate over references
/// (`slice.iter()`) when cloning is expensive.
///
/// # Examples
///
/// ```rust
/// use mergejoin::ensure_sorted_set;
///
/// let mut checked = ensure_sorted_set([1, 0], i32::cmp);
/// assert_eq!(checked.next(), Some(Ok(1)));
/// assert!(checked.next().unwrap().is_err());
/// assert_eq!(checked.next(), None);
/// ```
pub fn ensure_sorted_set<I, C>(iterable: I, comparator: C) -> EnsureSortedSet<I::IntoIter, C>
where
    I: IntoIterator,
    I::Item: Clone,
    C: FnMut(&I::Item, &I::Item) -> Ordering,
{
    EnsureSortedSet {
        iterator: iterable.into_iter(),
        comparator,
        guard: Monotonic::new(),
    }
}

impl<I, C> Iterator for EnsureSortedSet<I, C>
where
    I: Iterator,
    I::Item: Clone,
    C: FnMut(&I::Item, &I::Item) -> Ordering,
{
    type Item = Result<I::Item, OrderingViolation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.guard.is_done() {
            return None;
        }

        let Some(current) = self.iterator.next() else {
            self.guard.finish();
            return None;
        };

        Some(self.guard.accept(current, &mut self.comparator))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.guard.is_done() {
            (0, Some(0))
        } else {
            (0, self.iterator.size_hint().1)
        }
    }
}

impl<I, C> FusedIterator for EnsureSortedSet<I, C>
where
    I: Iterator,
    I::Item: Clone,
    C: FnMut(&I::Item, &I::Item) -> Ordering,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_sorted_input_passes_through() {
        let checked: Result<Vec<i32>, _> = ensure_sorted_set([0, 1, 2], i32::cmp).collect();
        assert_eq!(checked, Ok(vec![0, 1, 2]));
    }

    #[rstest]
    fn test_empty_input_yields_nothing() {
        let mut checked = ensure_sorted_set(Vec::<i32>::new(), i32::cmp);
        assert_eq!(checked.next(), None);
        assert_eq!(checked.next(), None);
    }

    #[rstest]
    fn test_single_element_always_passes() {
        let checked: Vec<_> = ensure_sorted_set([42], i32::cmp).collect();
        assert_eq!(checked, vec![Ok(42)]);
    }

    #[rstest]
    #[case(vec![1, 0], 1)]
    #[case(vec![0, 0], 1)]
    #[case(vec![0, 1, 2, 5, 4], 4)]
    #[case(vec![0, 1, 1, 2], 2)]
    fn test_violation_reports_position(#[case] input: Vec<i32>, #[case] position: usize) {
        let checked: Vec<_> = ensure_sorted_set(input, i32::cmp).collect();
        assert_eq!(checked.len(), position + 1);
        assert_eq!(checked.last(), Some(&Err(OrderingViolation { position })));
        assert!(checked[..position].iter().all(Result::is_ok));
    }

    #[rstest]
    fn test_violation_fuses_the_iterator() {
        let mut checked = ensure_sorted_set([3, 1, 5, 6], i32::cmp);
        assert_eq!(checked.next(), Some(Ok(3)));
        assert_eq!(checked.next(), Some(Err(OrderingViolation { position: 1 })));
        assert_eq!(checked.next(), None);
        assert_eq!(checked.size_hint(), (0, Some(0)));
    }

    #[rstest]
    fn test_validation_is_lazy_on_infinite_input() {
        let first: Vec<_> = ensure_sorted_set(0.., u32::cmp).take(3).collect();
        assert_eq!(first, vec![Ok(0), Ok(1), Ok(2)]);
    }

    #[rstest]
    fn test_custom_comparator_defines_order() {
        let descending = |a: &i32, b: &i32| b.cmp(a);
        let checked: Result<Vec<i32>, _> = ensure_sorted_set([9, 4, 1], descending).collect();
        assert_eq!(checked, Ok(vec![9, 4, 1]));
    }

    #[rstest]
    fn test_references_are_validated_without_cloning_elements() {
        let words = vec![String::from("apple"), String::from("banana")];
        let checked: Vec<_> = ensure_sorted_set(words.iter(), |a: &&String, b: &&String| a.cmp(b))
            .collect();
        assert_eq!(checked, vec![Ok(&words[0]), Ok(&words[1])]);
    }
}
