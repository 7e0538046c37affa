use derive_getters::{Dissolve, Getters};
use eyre::{ensure, Result};

use splitseq_core_rs::loc::{Interval, IntervalOp, Strand};

/// A BED record, restricted to the fields needed to describe gene models.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Dissolve, Getters)]
pub struct Record {
    seqid: String,
    interval: Interval<u64>,
    name: Option<String>,
    #[getter(skip)]
    strand: Option<Strand>,
    // Absolute coordinates, empty for records without blocks
    blocks: Vec<Interval<u64>>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            seqid: "_".to_string(),
            interval: Interval::default(),
            name: None,
            strand: None,
            blocks: Vec::new(),
        }
    }
}

impl Record {
    pub fn new(
        seqid: String,
        interval: Interval<u64>,
        name: Option<String>,
        strand: Option<Strand>,
        blocks: Vec<Interval<u64>>,
    ) -> Result<Self> {
        Self::validate(&seqid, &interval, &blocks)?;
        Ok(Self {
            seqid,
            interval,
            name,
            strand,
            blocks,
        })
    }

    pub fn validate(seqid: &str, interval: &Interval<u64>, blocks: &[Interval<u64>]) -> Result<()> {
        ensure!(!seqid.is_empty(), "BED seqid can't be empty");
        ensure!(
            !seqid.contains(|c: char| c.is_ascii_whitespace()),
            "BED seqid can't contain whitespace characters, got: {seqid}"
        );

        for (i, block) in blocks.iter().enumerate() {
            ensure!(
                interval.covers(block),
                "BED block {block} is outside of the record interval {interval}"
            );
            if i > 0 {
                ensure!(
                    blocks[i - 1].end() <= block.start(),
                    "BED blocks must be sorted and non-overlapping"
                );
            }
        }
        Ok(())
    }

    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    /// Exonic intervals described by the record: the blocks of a BED12 record or the whole
    /// interval otherwise.
    pub fn exons(&self) -> impl Iterator<Item = Interval<u64>> + '_ {
        let whole = match self.blocks.is_empty() {
            true => Some(self.interval),
            false => None,
        };
        whole.into_iter().chain(self.blocks.iter().copied())
    }
}
