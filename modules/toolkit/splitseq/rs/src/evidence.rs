use derive_getters::{Dissolve, Getters};
use derive_more::{Constructor, Display};

use splitseq_core_rs::loc::Strand;

/// Source of a supporting read: the BAM file its anchoring mate was found in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
pub enum EvidenceClass {
    #[display("anchored")]
    Anchored,
    #[display("discordant")]
    Discordant,
}

/// A candidate split read. The sequence is stored as sequenced; `orientation` tells whether it
/// reads from region A into region B (`Forward`) or the other way round (`Reverse`).
#[derive(Clone, PartialEq, Eq, Debug, Getters, Dissolve, Constructor)]
pub struct SupportingRead {
    id: String,
    sequence: Vec<u8>,
    orientation: Strand,
    class: EvidenceClass,
}

impl SupportingRead {
    /// Sequence in the A-to-B orientation.
    pub fn oriented(&self) -> Vec<u8> {
        match self.orientation {
            Strand::Forward => self.sequence.clone(),
            Strand::Reverse => splitseq_core_rs::seq::reverse_complement(&self.sequence),
        }
    }

    /// Position of a split made `offset_a` bases into the oriented read, counted from the 5' end
    /// of the sequenced read.
    pub fn split_position(&self, offset_a: usize) -> usize {
        match self.orientation {
            Strand::Forward => offset_a,
            Strand::Reverse => self.sequence.len() - offset_a,
        }
    }
}
