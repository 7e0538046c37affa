use splitseq_core_rs::{
    loc::{Interval, IntervalOp},
    num::{One, PrimInt, Saturating},
};

/// A builder for constructing interval tree data structures.
///
/// Intervals and their data elements are added incrementally, and the final query-optimized
/// structure is produced by calling `build`.
pub trait Builder {
    /// The type of interval tree that will be constructed.
    type Target: ITree;

    /// Add an interval and its corresponding element to the tree.
    fn add(
        self,
        interval: Interval<<Self::Target as ITree>::Idx>,
        element: <Self::Target as ITree>::Data,
    ) -> Self;

    /// Extend the tree from an iterator of intervals and their corresponding elements.
    fn extend(
        self,
        data: impl IntoIterator<
            Item = (
                Interval<<Self::Target as ITree>::Idx>,
                <Self::Target as ITree>::Data,
            ),
        >,
    ) -> Self;

    /// Build and return the final interval tree structure.
    fn build(self) -> Self::Target;
}

/// An interval tree organizes intervals to allow for fast overlap queries.
#[allow(clippy::len_without_is_empty)]
pub trait ITree {
    /// The type used for interval coordinates (start and end positions).
    type Idx: PrimInt;

    /// The type of data associated with each interval in the tree.
    type Data;

    /// Number of intervals stored in the tree.
    fn len(&self) -> usize;

    /// Returns an iterator over all (interval, data) pairs stored in the tree.
    ///
    /// The order of pairs is implementation-defined and should not be relied upon.
    fn records(&self) -> impl Iterator<Item = (Interval<Self::Idx>, &Self::Data)>;

    /// Returns an iterator over all (interval, data) pairs overlapping the query interval.
    fn overlapping(
        &self,
        interval: Interval<Self::Idx>,
    ) -> impl Iterator<Item = (Interval<Self::Idx>, &Self::Data)>;

    /// The shortest stored interval containing the given position. Ties are resolved in favor of
    /// the interval with the smallest start.
    fn covering(&self, pos: Self::Idx) -> Option<(Interval<Self::Idx>, &Self::Data)> {
        let query = Interval::new(pos, pos.saturating_add(Self::Idx::one())).ok()?;
        self.overlapping(query)
            .min_by_key(|(interval, _)| (interval.len(), interval.start()))
    }
}
