//! Output records of a pairwise traversal.
//!
//! A traversal walks two sorted sets in lockstep and reports, for every
//! comparison, which side (or both) contributed an element. [`Pairing`]
//! is that tagged outcome; [`PairwiseStep`] adds the exhaustion flags.
//!
//! [`ExclusiveDiff`] and [`Diff`] are the entries produced by
//! [`diff`](crate::diff) and [`diff_with`](crate::diff_with).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The element(s) contributed by one comparison step.
///
/// `Both` is produced only when the comparator deems the two elements equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pairing<A, B = A> {
    /// The source element precedes everything left in the target.
    SourceOnly(A),
    /// The target element precedes everything left in the source.
    TargetOnly(B),
    /// Comparator-equal elements from both sides.
    Both(A, B),
}

impl<A, B> Pairing<A, B> {
    /// Returns the source element, if this step has one.
    #[inline]
    pub const fn source(&self) -> Option<&A> {
        match self {
            Self::SourceOnly(source) | Self::Both(source, _) => Some(source),
            Self::TargetOnly(_) => None,
        }
    }

    /// Returns the target element, if this step has one.
    #[inline]
    pub const fn target(&self) -> Option<&B> {
        match self {
            Self::TargetOnly(target) | Self::Both(_, target) => Some(target),
            Self::SourceOnly(_) => None,
        }
    }

    /// Returns `true` for a matched pair.
    #[inline]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Both(_, _))
    }

    /// Splits the pairing into positional slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mergejoin::Pairing;
    ///
    /// let pairing: Pairing<i32> = Pairing::TargetOnly(7);
    /// assert_eq!(pairing.into_parts(), (None, Some(7)));
    /// ```
    #[inline]
    pub fn into_parts(self) -> (Option<A>, Option<B>) {
        match self {
            Self::SourceOnly(source) => (Some(source), None),
            Self::TargetOnly(target) => (None, Some(target)),
            Self::Both(source, target) => (Some(source), Some(target)),
        }
    }

    /// Maps both sides through their own functions.
    pub fn map<C, D, F, G>(self, source_function: F, target_function: G) -> Pairing<C, D>
    where
        F: FnOnce(A) -> C,
        G: FnOnce(B) -> D,
    {
        match self {
            Self::SourceOnly(source) => Pairing::SourceOnly(source_function(source)),
            Self::TargetOnly(target) => Pairing::TargetOnly(target_function(target)),
            Self::Both(source, target) => {
                Pairing::Both(source_function(source), target_function(target))
            }
        }
    }
}

/// One step of a pairwise traversal.
///
/// `source_exhausted` is `true` exactly when no element of the source is
/// left after this step: either this step consumed the final source
/// element, or the source had already ended. `target_exhausted` mirrors it.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Pairing, pairwise_traversal};
///
/// let steps: Vec<_> = pairwise_traversal(Vec::<i32>::new(), vec![0, 1], i32::cmp).collect();
/// assert_eq!(steps[0].pairing, Pairing::TargetOnly(0));
/// assert!(steps[0].source_exhausted);
/// assert!(!steps[0].target_exhausted);
/// assert!(steps[1].target_exhausted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairwiseStep<A, B = A> {
    /// The element(s) consumed by this step.
    pub pairing: Pairing<A, B>,
    /// No source element remains after this step.
    pub source_exhausted: bool,
    /// No target element remains after this step.
    pub target_exhausted: bool,
}

impl<A, B> PairwiseStep<A, B> {
    /// Creates a step.
    #[inline]
    pub const fn new(pairing: Pairing<A, B>, source_exhausted: bool, target_exhausted: bool) -> Self {
        Self {
            pairing,
            source_exhausted,
            target_exhausted,
        }
    }

    /// Returns `true` once either side has no elements left.
    #[inline]
    pub const fn either_exhausted(&self) -> bool {
        self.source_exhausted || self.target_exhausted
    }

    /// Converts into the positional 4-tuple `(source, target, source_exhausted, target_exhausted)`.
    #[inline]
    pub fn into_tuple(self) -> (Option<A>, Option<B>, bool, bool) {
        let (source, target) = self.pairing.into_parts();
        (source, target, self.source_exhausted, self.target_exhausted)
    }
}

/// An element present on exactly one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExclusiveDiff<A, B = A> {
    /// Only in the source (a removal when reconciling source into target).
    Source(A),
    /// Only in the target (an addition).
    Target(B),
}

/// An entry of a full diff.
///
/// # Examples
///
/// ```rust
/// use mergejoin::{Diff, ExclusiveDiff};
///
/// let entry: Diff<i32> = Diff::Exclusive(ExclusiveDiff::Source(1));
/// assert!(entry.is_exclusive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Diff<A, B = A> {
    /// Present on one side only.
    Exclusive(ExclusiveDiff<A, B>),
    /// Comparator-equal on both sides, but judged different by the differ predicate.
    Changed(A, B),
}

impl<A, B> Diff<A, B> {
    /// Returns `true` for entries present on one side only.
    #[inline]
    pub const fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive(_))
    }

    /// Returns the exclusive entry, or gives back `self` for a changed pair.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` when the entry is [`Diff::Changed`].
    pub fn into_exclusive(self) -> Result<ExclusiveDiff<A, B>, Self> {
        match self {
            Self::Exclusive(exclusive) => Ok(exclusive),
            changed @ Self::Changed(_, _) => Err(changed),
        }
    }
}

impl<A, B> From<ExclusiveDiff<A, B>> for Diff<A, B> {
    fn from(exclusive: ExclusiveDiff<A, B>) -> Self {
        Self::Exclusive(exclusive)
    }
}
