use ahash::HashMap;
use derive_getters::Dissolve;
use itertools::Itertools;

use splitseq_core_rs::loc::{Contig, Interval};
use splitseq_core_rs::num::PrimInt;

use crate::interval_tree::{Bits, ITree};

/// Interval trees for each contig of an assembly. Strand-agnostic: annotation boundaries are
/// looked up by coordinate only.
#[derive(Clone, Debug, Dissolve)]
pub struct GenomicIndex<Ctg: Contig, IT: ITree> {
    itrees: HashMap<Ctg, IT>,
}

impl<Ctg: Contig, IT: ITree> Default for GenomicIndex<Ctg, IT> {
    fn default() -> Self {
        Self {
            itrees: HashMap::default(),
        }
    }
}

impl<Ctg: Contig, IT: ITree> GenomicIndex<Ctg, IT> {
    pub fn contigs(&self) -> impl Iterator<Item = &Ctg> {
        self.itrees.keys()
    }

    /// Total number of intervals across all contigs.
    pub fn len(&self) -> usize {
        self.itrees.values().map(|x| x.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlapping(
        &self,
        contig: &Ctg,
        interval: Interval<IT::Idx>,
    ) -> impl Iterator<Item = (Interval<IT::Idx>, &IT::Data)> {
        self.itrees
            .get(contig)
            .into_iter()
            .flat_map(move |tree| tree.overlapping(interval))
    }

    /// The shortest interval on the contig that contains the given position.
    pub fn covering(&self, contig: &Ctg, pos: IT::Idx) -> Option<(Interval<IT::Idx>, &IT::Data)> {
        self.itrees.get(contig)?.covering(pos)
    }
}

impl<Ctg: Contig, Idx: PrimInt, Data> FromIterator<(Ctg, Interval<Idx>, Data)>
    for GenomicIndex<Ctg, Bits<Idx, Data>>
{
    fn from_iter<T: IntoIterator<Item = (Ctg, Interval<Idx>, Data)>>(iter: T) -> Self {
        let itrees = iter
            .into_iter()
            .map(|(contig, interval, data)| (contig, (interval, data)))
            .into_group_map()
            .into_iter()
            .map(|(contig, records)| (contig, Bits::new(records)))
            .collect();
        Self { itrees }
    }
}
