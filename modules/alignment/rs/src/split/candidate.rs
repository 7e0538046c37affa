use derive_getters::{Dissolve, Getters};

/// Best ungapped partition of a read between two windows that flank a fusion junction.
///
/// The read prefix `read[..offset_a]` matches window A right before `junction_a`, and the suffix
/// `read[offset_a..]` matches window B starting at `junction_b`. Junction positions are indices
/// into the strand-oriented windows passed to the aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Getters, Dissolve)]
pub struct SplitCandidate {
    offset_a: usize,
    offset_b: usize,
    junction_a: usize,
    junction_b: usize,
    mismatches: u32,
}

impl SplitCandidate {
    pub(crate) fn new(
        offset_a: usize,
        offset_b: usize,
        junction_a: usize,
        junction_b: usize,
        mismatches: u32,
    ) -> Self {
        debug_assert!(offset_a <= junction_a);
        Self {
            offset_a,
            offset_b,
            junction_a,
            junction_b,
            mismatches,
        }
    }

    /// Offsets always partition the whole read.
    pub fn read_length(&self) -> usize {
        self.offset_a + self.offset_b
    }

    /// Candidates on the same diagonal describe the same junction, up to the placement of the
    /// split inside a micro-homology shared by both windows.
    pub fn diagonal(&self) -> isize {
        self.junction_a as isize - self.junction_b as isize
    }
}
