//! Implementation of an interval tree using the BITS algorithm.
//! Reference: https://doi.org/10.1093/bioinformatics/bts652

use derive_getters::Dissolve;
use derive_more::From;
use itertools::Itertools;

use splitseq_core_rs::{
    loc::{Interval, IntervalOp},
    num::PrimInt,
};

use super::tree::{Builder, ITree};

/// A builder for constructing [`Bits`] interval trees.
#[derive(Debug, Clone, From, Dissolve)]
pub struct BitsBuilder<Idx: PrimInt, Data> {
    records: Vec<(Interval<Idx>, Data)>,
}

impl<Idx: PrimInt, Data> Default for BitsBuilder<Idx, Data> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<Idx: PrimInt, Data> Builder for BitsBuilder<Idx, Data> {
    type Target = Bits<Idx, Data>;

    fn add(
        mut self,
        interval: Interval<<Self::Target as ITree>::Idx>,
        data: <Self::Target as ITree>::Data,
    ) -> Self {
        self.records.push((interval, data));
        self
    }

    fn extend(
        mut self,
        records: impl IntoIterator<
            Item = (
                Interval<<Self::Target as ITree>::Idx>,
                <Self::Target as ITree>::Data,
            ),
        >,
    ) -> Self {
        self.records.extend(records);
        self
    }

    fn build(self) -> Self::Target {
        Bits::new(self.records)
    }
}

/// An immutable interval tree implementation using the BITS algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Dissolve)]
pub struct Bits<Idx: PrimInt, Data> {
    // Intervals sorted by their start coordinate.
    intervals: Vec<Interval<Idx>>,
    // Associated data elements, corresponding to intervals at the same index.
    data: Vec<Data>,
    // The maximum length of any interval in the tree. Bounds the backward scan of each query.
    max_len: Idx,
}

impl<Idx: PrimInt, Data> Default for Bits<Idx, Data> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
            data: Vec::new(),
            max_len: Idx::zero(),
        }
    }
}

impl<Idx: PrimInt, Data> Bits<Idx, Data> {
    /// Creates a new `Bits` interval tree from an iterator of `(Interval, Data)` pairs.
    /// Records are sorted internally by their start coordinates (stable).
    pub fn new(iter: impl IntoIterator<Item = (Interval<Idx>, Data)>) -> Self {
        let iter = iter.into_iter();

        let explen = iter.size_hint().0;
        let mut intervals = Vec::with_capacity(explen);
        let mut data = Vec::with_capacity(explen);
        let mut max_len = Idx::zero();

        for (interval, idata) in iter.sorted_by_key(|(it, _)| it.start()) {
            max_len = max_len.max(interval.len());
            intervals.push(interval);
            data.push(idata);
        }

        Self {
            intervals,
            data,
            max_len,
        }
    }

    #[inline]
    fn lower_bound(&self, start: Idx) -> usize {
        // Intervals starting before `start - max_len` end before `start` and can't overlap.
        let boundary = start.saturating_sub(self.max_len);
        self.intervals.partition_point(|it| it.start() < boundary)
    }

    /// Creates an iterator over entries overlapping the given interval.
    #[inline]
    pub fn query(&self, interval: Interval<Idx>) -> Iter<'_, Idx, Data> {
        Iter {
            query: interval,
            cursor: self.lower_bound(interval.start()),
            bits: self,
        }
    }

    /// Returns `true` if the tree contains no intervals.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Provides access to the raw data elements stored in the tree.
    /// The order corresponds to the intervals sorted by start position.
    pub fn data(&self) -> &[Data] {
        &self.data
    }

    /// Returns a builder for constructing a new `Bits` interval tree.
    pub fn builder() -> BitsBuilder<Idx, Data> {
        BitsBuilder::default()
    }
}

/// An iterator over overlapping intervals and data references produced by `Bits::query`.
pub struct Iter<'tree, Idx: PrimInt, Data> {
    query: Interval<Idx>,
    // Might be behind the next overlapping interval, but never ahead.
    cursor: usize,
    bits: &'tree Bits<Idx, Data>,
}

impl<'tree, Idx: PrimInt, Data> Iterator for Iter<'tree, Idx, Data> {
    type Item = (Interval<Idx>, &'tree Data);

    fn next(&mut self) -> Option<Self::Item> {
        let intervals = &self.bits.intervals;
        while self.cursor < intervals.len() {
            let interval = intervals[self.cursor];
            // Everything past this point starts after the query interval.
            if interval.start() >= self.query.end() {
                self.cursor = intervals.len();
                return None;
            }

            let index = self.cursor;
            self.cursor += 1;
            if interval.end() > self.query.start() {
                debug_assert!(interval.intersects(&self.query));
                return Some((interval, &self.bits.data[index]));
            }
        }
        None
    }
}

impl<Idx: PrimInt, Data> ITree for Bits<Idx, Data> {
    type Idx = Idx;
    type Data = Data;

    fn len(&self) -> usize {
        self.intervals.len()
    }

    fn records(&self) -> impl Iterator<Item = (Interval<Self::Idx>, &Self::Data)> {
        self.intervals.iter().copied().zip(self.data.iter())
    }

    fn overlapping(
        &self,
        interval: Interval<Self::Idx>,
    ) -> impl Iterator<Item = (Interval<Self::Idx>, &Self::Data)> {
        self.query(interval)
    }
}
