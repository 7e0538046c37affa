use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use splitseq_core_rs::loc::Strand;

/// Exact position of a fusion junction on one side. `position` is the 0-based coordinate of the
/// last base before the junction (side A) or the first base after it (side B).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Constructor, Dissolve, Getters)]
pub struct Breakpoint {
    contig: String,
    strand: Strand,
    position: u64,
}

#[derive(Clone, PartialEq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct FusionResult {
    id: String,
    break_a: Breakpoint,
    break_b: Breakpoint,
    // A-to-B oriented sequence around the junction, empty without evidence
    sequence: Vec<u8>,
    // Split reads supporting the reported junction
    supporting_reads: usize,
    // Mean split position across all accepted reads, counted from their 5' ends
    split_pos_avg: f64,
    // The smaller of the per-orientation means of split positions
    split_min_avg: f64,
}

impl FusionResult {
    /// Length of the sequence inserted between the regions, which split reads can't resolve.
    pub fn inter_length(&self) -> usize {
        0
    }
}
