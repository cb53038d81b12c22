//! Bounds-checked slice access.

use std::ops::{Bound, RangeBounds};

use crate::error::{IndexOutOfRange, InvalidRange, InvalidRangeReason};

/// Returns `&slice[index]`, or [`IndexOutOfRange`] when the index is not valid.
///
/// # Errors
///
/// Returns [`IndexOutOfRange`] when `index >= slice.len()`.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{IndexOutOfRange, element_at};
///
/// let numbers = [10, 20, 30];
/// assert_eq!(element_at(&numbers, 1), Ok(&20));
/// assert_eq!(element_at(&numbers, 3), Err(IndexOutOfRange { index: 3, length: 3 }));
/// ```
#[inline]
pub fn element_at<T>(slice: &[T], index: usize) -> Result<&T, IndexOutOfRange> {
    slice.get(index).ok_or(IndexOutOfRange {
        index,
        length: slice.len(),
    })
}

/// Iterates over `slice[range]` without copying, validating the range first.
///
/// An unbounded start reads from `0` and an unbounded end reads to
/// `slice.len()`. The start must address an existing index, except that an
/// empty slice accepts a start of `0`.
///
/// # Errors
///
/// - [`InvalidRangeReason::StartOutOfBounds`] when the start is past the last index
/// - [`InvalidRangeReason::EndOutOfBounds`] when the end is past `slice.len()`
/// - [`InvalidRangeReason::EndBeforeStart`] when the end precedes the start
///
/// # Examples
///
/// ```rust
/// use mergejoin::read_range;
///
/// let numbers = [0, 1, 2, 3, 4, 5, 6, 7];
/// let middle: Vec<_> = read_range(&numbers, 1..6).unwrap().copied().collect();
/// assert_eq!(middle, vec![1, 2, 3, 4, 5]);
///
/// let tail: Vec<_> = read_range(&numbers, 4..).unwrap().copied().collect();
/// assert_eq!(tail, vec![4, 5, 6, 7]);
///
/// assert!(read_range(&numbers, 9..).is_err());
/// ```
pub fn read_range<T, R>(slice: &[T], range: R) -> Result<std::slice::Iter<'_, T>, InvalidRange>
where
    R: RangeBounds<usize>,
{
    let length = slice.len();
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => length,
    };
    let invalid = |reason| InvalidRange {
        start,
        end,
        length,
        reason,
    };

    if start > length.saturating_sub(1) {
        return Err(invalid(InvalidRangeReason::StartOutOfBounds));
    }
    if end > length {
        return Err(invalid(InvalidRangeReason::EndOutOfBounds));
    }
    if end < start {
        return Err(invalid(InvalidRangeReason::EndBeforeStart));
    }

    slice
        .get(start..end)
        .map(<[T]>::iter)
        .ok_or_else(|| invalid(InvalidRangeReason::EndOutOfBounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NUMBERS: [i32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

    fn read<R: RangeBounds<usize>>(slice: &[i32], range: R) -> Result<Vec<i32>, InvalidRangeReason> {
        read_range(slice, range)
            .map(|iterator| iterator.copied().collect())
            .map_err(|error| error.reason)
    }

    #[rstest]
    #[case(0, Ok(&0))]
    #[case(7, Ok(&7))]
    #[case(8, Err(IndexOutOfRange { index: 8, length: 8 }))]
    fn test_element_at(#[case] index: usize, #[case] expected: Result<&i32, IndexOutOfRange>) {
        assert_eq!(element_at(&NUMBERS, index), expected);
    }

    #[rstest]
    fn test_element_at_empty_slice() {
        let empty: [i32; 0] = [];
        assert_eq!(
            element_at(&empty, 0),
            Err(IndexOutOfRange {
                index: 0,
                length: 0
            })
        );
    }

    #[rstest]
    fn test_read_whole_slice() {
        assert_eq!(read(&NUMBERS, ..), Ok(NUMBERS.to_vec()));
    }

    #[rstest]
    fn test_read_empty_slice() {
        assert_eq!(read(&[], ..), Ok(vec![]));
        assert_eq!(read(&[], 0..), Ok(vec![]));
        assert_eq!(read(&[], 1..), Err(InvalidRangeReason::StartOutOfBounds));
        assert_eq!(read(&[], 4..4), Err(InvalidRangeReason::StartOutOfBounds));
    }

    #[rstest]
    #[case(1..6, vec![1, 2, 3, 4, 5])]
    #[case(4..7, vec![4, 5, 6])]
    #[case(4..4, vec![])]
    #[case(0..0, vec![])]
    fn test_read_bounded_range(#[case] range: std::ops::Range<usize>, #[case] expected: Vec<i32>) {
        assert_eq!(read(&NUMBERS, range), Ok(expected));
    }

    #[rstest]
    fn test_read_inclusive_range() {
        assert_eq!(read(&NUMBERS, 2..=3), Ok(vec![2, 3]));
    }

    #[rstest]
    fn test_read_rejects_bad_bounds() {
        assert_eq!(read(&NUMBERS, 8..), Err(InvalidRangeReason::StartOutOfBounds));
        assert_eq!(read(&NUMBERS, 2..9), Err(InvalidRangeReason::EndOutOfBounds));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 5..3;
        assert_eq!(read(&NUMBERS, reversed), Err(InvalidRangeReason::EndBeforeStart));
    }

    #[rstest]
    fn test_read_error_carries_resolved_bounds() {
        let error = read_range(&NUMBERS, 3..=10).unwrap_err();
        assert_eq!(
            error,
            InvalidRange {
                start: 3,
                end: 11,
                length: 8,
                reason: InvalidRangeReason::EndOutOfBounds,
            }
        );
    }
}
