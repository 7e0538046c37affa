//! Narrow interfaces to the data sources consulted by the estimator.
//!
//! All accessors take `&self` and must be safe to share between threads. Index-backed
//! implementations keep one file handle per thread, in-memory implementations are immutable.

use std::sync::Arc;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::Result;
use impl_tools::autoimpl;

use splitseq_core_rs::loc::{Interval, Locus, Strand};
use splitseq_io_rs::bam::Alignment;

use crate::evidence::EvidenceClass;

pub use indexed::{ExonIndex, IndexedAlignments, IndexedReads, IndexedReference};

mod indexed;
pub mod memory;

/// Alignments overlapping a region, split by evidence class.
#[derive(Clone, PartialEq, Eq, Debug, Default, Getters, Dissolve, Constructor)]
pub struct RegionEvidence {
    anchored: Vec<Alignment>,
    discordant: Vec<Alignment>,
}

impl RegionEvidence {
    /// Anchored alignments first, then discordant ones.
    pub fn iter(&self) -> impl Iterator<Item = (EvidenceClass, &Alignment)> {
        let anchored = self.anchored.iter().map(|x| (EvidenceClass::Anchored, x));
        let discordant = self.discordant.iter().map(|x| (EvidenceClass::Discordant, x));
        anchored.chain(discordant)
    }

    pub fn len(&self) -> usize {
        self.anchored.len() + self.discordant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[autoimpl(for<T: trait + ?Sized> &T, Box<T>, Arc<T>)]
pub trait AlignmentAccessor {
    /// Anchored and discordant alignments overlapping the locus. Both strands are reported.
    fn query_region(&self, locus: &Locus<String, u64>) -> Result<RegionEvidence>;
}

#[autoimpl(for<T: trait + ?Sized> &T, Box<T>, Arc<T>)]
pub trait ReadAccessor {
    /// Raw sequence of the read. Fails with [`LookupError::NotFound`] for unknown reads.
    ///
    /// [`LookupError::NotFound`]: splitseq_core_rs::LookupError::NotFound
    fn fetch(&self, read_id: &str, into: &mut Vec<u8>) -> Result<()>;
}

#[autoimpl(for<T: trait + ?Sized> &T, Box<T>, Arc<T>)]
pub trait ReferenceAccessor {
    /// Length of the reference sequence. Fails with `LookupError::NotFound` for unknown sequences.
    fn length(&self, seqid: &str) -> Result<u64>;

    /// Sequence of the interval read on the given strand, i.e. reverse complemented for the
    /// reverse strand. Fails with `LookupError::OutOfRange` if the interval exceeds the sequence.
    fn fetch(
        &self,
        seqid: &str,
        interval: Interval<u64>,
        strand: Strand,
        into: &mut Vec<u8>,
    ) -> Result<()>;
}

#[autoimpl(for<T: trait + ?Sized> &T, Box<T>, Arc<T>)]
pub trait AnnotationAccessor {
    /// Exon enclosing the position, `None` if the position is not annotated.
    fn bounding_exon(&self, seqid: &str, pos: u64) -> Option<Interval<u64>>;
}
