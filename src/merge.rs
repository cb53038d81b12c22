//! Merge-join engine shared by the iterator and stream traversals.
//!
//! The engine never pulls on its own. A driver asks which cursors need an
//! element ([`MergeJoin::needs_source`], [`MergeJoin::needs_target`]), hands
//! the pulled results back, and then calls [`MergeJoin::advance`]. This keeps
//! the comparison logic identical for blocking pulls and for polled streams.
//!
//! Each step runs in two phases:
//!
//! ```text
//!   decide:  compare the current elements, take the consumed one(s),
//!            park the pairing as pending            -> NeedsPull
//!   emit:    (driver refilled the consumed cursors)
//!            attach the exhaustion flags, yield     -> Ready
//! ```
//!
//! Refilling before emitting is what makes the exhaustion flags exact: a flag
//! is set on the very step that consumed the final element of its side.

use std::cmp::Ordering;

use crate::step::{Pairing, PairwiseStep};

/// State of one side of the traversal.
#[derive(Debug)]
enum Cursor<E, Er> {
    /// The previous element was consumed (or nothing was pulled yet).
    Unpulled,
    /// The element waiting for its comparison.
    Current(E),
    /// The input reported end-of-sequence.
    Exhausted,
    /// The input reported a failure that has not been surfaced yet.
    Failed(Er),
}

impl<E, Er> Cursor<E, Er> {
    fn from_pull(pulled: Option<Result<E, Er>>) -> Self {
        match pulled {
            Some(Ok(element)) => Self::Current(element),
            Some(Err(error)) => Self::Failed(error),
            None => Self::Exhausted,
        }
    }

    const fn is_unpulled(&self) -> bool {
        matches!(self, Self::Unpulled)
    }

    const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn take_current(&mut self) -> Option<E> {
        match std::mem::replace(self, Self::Unpulled) {
            Self::Current(element) => Some(element),
            other => {
                *self = other;
                None
            }
        }
    }

    fn take_error(&mut self) -> Option<Er> {
        match std::mem::replace(self, Self::Exhausted) {
            Self::Failed(error) => Some(error),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Outcome of [`MergeJoin::advance`].
pub(crate) enum Progress<A, B, Er> {
    /// A cursor must be refilled before the engine can continue.
    NeedsPull,
    /// The next item of the traversal; `None` ends it.
    Ready(Option<Result<PairwiseStep<A, B>, Er>>),
}

/// Two cursors and the pairing waiting for its exhaustion flags.
#[derive(Debug)]
pub(crate) struct MergeJoin<A, B, Er> {
    source: Cursor<A, Er>,
    target: Cursor<B, Er>,
    pending: Option<Pairing<A, B>>,
    finished: bool,
}

impl<A, B, Er> MergeJoin<A, B, Er> {
    pub(crate) const fn new() -> Self {
        Self {
            source: Cursor::Unpulled,
            target: Cursor::Unpulled,
            pending: None,
            finished: false,
        }
    }

    pub(crate) const fn needs_source(&self) -> bool {
        !self.finished && self.source.is_unpulled()
    }

    pub(crate) const fn needs_target(&self) -> bool {
        !self.finished && self.target.is_unpulled()
    }

    pub(crate) const fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn fill_source(&mut self, pulled: Option<Result<A, Er>>) {
        self.source = Cursor::from_pull(pulled);
    }

    pub(crate) fn fill_target(&mut self, pulled: Option<Result<B, Er>>) {
        self.target = Cursor::from_pull(pulled);
    }

    /// Emits the pending step, or decides the next one.
    ///
    /// Must only be called once both cursors have been refilled.
    pub(crate) fn advance<C>(&mut self, comparator: &mut C) -> Progress<A, B, Er>
    where
        C: FnMut(&A, &B) -> Ordering,
    {
        if self.finished {
            return Progress::Ready(None);
        }

        if let Some(pairing) = self.pending.take() {
            let step = PairwiseStep::new(
                pairing,
                self.source.is_exhausted(),
                self.target.is_exhausted(),
            );
            return Progress::Ready(Some(Ok(step)));
        }

        if self.source.is_failed() || self.target.is_failed() {
            return self.fail();
        }

        let order = match (&self.source, &self.target) {
            (Cursor::Current(source), Cursor::Current(target)) => comparator(source, target),
            (Cursor::Current(_), Cursor::Exhausted) => Ordering::Less,
            (Cursor::Exhausted, Cursor::Current(_)) => Ordering::Greater,
            (Cursor::Exhausted, Cursor::Exhausted) => {
                self.finished = true;
                return Progress::Ready(None);
            }
            _ => return Progress::NeedsPull,
        };

        self.pending = match order {
            Ordering::Less => self.source.take_current().map(Pairing::SourceOnly),
            Ordering::Greater => self.target.take_current().map(Pairing::TargetOnly),
            Ordering::Equal => {
                let source = self.source.take_current();
                let target = self.target.take_current();
                source
                    .zip(target)
                    .map(|(source, target)| Pairing::Both(source, target))
            }
        };

        Progress::NeedsPull
    }

    fn fail(&mut self) -> Progress<A, B, Er> {
        self.finished = true;
        let (side, error) = match self.source.take_error() {
            Some(error) => ("source", Some(error)),
            None => ("target", self.target.take_error()),
        };
        tracing::debug!(side, "pairwise traversal input failed; traversal ends");
        self.source = Cursor::Exhausted;
        self.target = Cursor::Exhausted;
        Progress::Ready(error.map(Err))
    }
}
