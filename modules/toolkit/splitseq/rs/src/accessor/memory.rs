//! In-memory accessors for small inputs and tests.

use ahash::HashMap;
use eyre::Result;

use splitseq_core_rs::loc::{Interval, IntervalOp, Locus, Strand};
use splitseq_core_rs::seq::reverse_complement_in_place;
use splitseq_core_rs::LookupError;
use splitseq_io_rs::bam::Alignment;

use super::{
    AlignmentAccessor, AnnotationAccessor, ReadAccessor, ReferenceAccessor, RegionEvidence,
};

#[derive(Clone, Debug, Default)]
pub struct Sequences {
    sequences: HashMap<String, Vec<u8>>,
}

impl Sequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> &mut Self {
        self.sequences.insert(id.into(), sequence.into());
        self
    }

    pub fn get(&self, id: &str) -> Option<&[u8]> {
        self.sequences.get(id).map(|x| x.as_slice())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl<Id: Into<String>, Seq: Into<Vec<u8>>> FromIterator<(Id, Seq)> for Sequences {
    fn from_iter<T: IntoIterator<Item = (Id, Seq)>>(iter: T) -> Self {
        let sequences = iter
            .into_iter()
            .map(|(id, seq)| (id.into(), seq.into()))
            .collect();
        Self { sequences }
    }
}

impl ReadAccessor for Sequences {
    fn fetch(&self, read_id: &str, into: &mut Vec<u8>) -> Result<()> {
        let sequence = self
            .get(read_id)
            .ok_or_else(|| LookupError::not_found("Read", read_id))?;
        into.clear();
        into.extend_from_slice(sequence);
        Ok(())
    }
}

impl ReferenceAccessor for Sequences {
    fn length(&self, seqid: &str) -> Result<u64> {
        let sequence = self
            .get(seqid)
            .ok_or_else(|| LookupError::not_found("Sequence", seqid))?;
        Ok(sequence.len() as u64)
    }

    fn fetch(
        &self,
        seqid: &str,
        interval: Interval<u64>,
        strand: Strand,
        into: &mut Vec<u8>,
    ) -> Result<()> {
        let length = self.length(seqid)?;
        if interval.end() > length {
            return Err(LookupError::OutOfRange {
                seqid: seqid.to_string(),
                start: interval.start(),
                end: interval.end(),
                length,
            }
            .into());
        }

        let sequence = self
            .get(seqid)
            .ok_or_else(|| LookupError::not_found("Sequence", seqid))?;
        into.clear();
        into.extend_from_slice(&sequence[interval.start() as usize..interval.end() as usize]);
        if strand == Strand::Reverse {
            reverse_complement_in_place(into);
        }
        Ok(())
    }
}

/// Alignments kept in two plain lists and scanned linearly on every query.
#[derive(Clone, Debug, Default)]
pub struct Alignments {
    anchored: Vec<Alignment>,
    discordant: Vec<Alignment>,
}

impl Alignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_anchored(&mut self, alignment: Alignment) -> &mut Self {
        self.anchored.push(alignment);
        self
    }

    pub fn add_discordant(&mut self, alignment: Alignment) -> &mut Self {
        self.discordant.push(alignment);
        self
    }
}

impl AlignmentAccessor for Alignments {
    fn query_region(&self, locus: &Locus<String, u64>) -> Result<RegionEvidence> {
        let select = |alignments: &[Alignment]| {
            alignments
                .iter()
                .filter(|x| x.contig() == &locus.contig && locus.interval.contains(*x.start()))
                .cloned()
                .collect()
        };
        Ok(RegionEvidence::new(
            select(&self.anchored),
            select(&self.discordant),
        ))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Exons {
    exons: HashMap<String, Vec<Interval<u64>>>,
}

impl Exons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, seqid: impl Into<String>, exon: Interval<u64>) -> &mut Self {
        self.exons.entry(seqid.into()).or_default().push(exon);
        self
    }
}

impl AnnotationAccessor for Exons {
    fn bounding_exon(&self, seqid: &str, pos: u64) -> Option<Interval<u64>> {
        self.exons
            .get(seqid)?
            .iter()
            .filter(|x| x.contains(pos))
            .min_by_key(|x| (x.len(), x.start()))
            .copied()
    }
}
