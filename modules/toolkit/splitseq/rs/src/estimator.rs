use std::cmp::Reverse;
use std::sync::Arc;

use ahash::HashSet;
use eyre::{ensure, Result, WrapErr};
use itertools::Itertools;
use rayon::prelude::*;

use splitseq_alignment_rs::split::{SplitAligner, SplitCandidate};
use splitseq_core_rs::loc::{Interval, IntervalOp, Locus, Strand};
use splitseq_core_rs::num::mean;
use splitseq_core_rs::LookupError;

use crate::accessor::{AlignmentAccessor, AnnotationAccessor, ReadAccessor, ReferenceAccessor};
use crate::config::{Config, Library};
use crate::evidence::SupportingRead;
use crate::region::RegionPair;
use crate::result::{Breakpoint, FusionResult};

/// Reference window on one side of the junction, stored in the orientation it is read in.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Window {
    interval: Interval<u64>,
    strand: Strand,
    sequence: Vec<u8>,
}

impl Window {
    /// Genomic coordinate of the i-th base of the oriented sequence.
    fn coordinate(&self, index: usize) -> u64 {
        match self.strand {
            Strand::Forward => self.interval.start() + index as u64,
            Strand::Reverse => self.interval.end() - 1 - index as u64,
        }
    }

    fn index(&self, coordinate: u64) -> usize {
        match self.strand {
            Strand::Forward => (coordinate - self.interval.start()) as usize,
            Strand::Reverse => (self.interval.end() - 1 - coordinate) as usize,
        }
    }
}

/// The last base of a region before the junction it points to.
fn junction_edge(locus: &Locus<String, u64>) -> u64 {
    match locus.strand {
        Strand::Forward => locus.interval.end() - 1,
        Strand::Reverse => locus.interval.start(),
    }
}

/// Most frequent coordinate. Ties go to the coordinate closest to the edge, then to the smaller one.
fn mode(coordinates: impl Iterator<Item = u64>, edge: u64) -> Option<u64> {
    coordinates
        .counts()
        .into_iter()
        .max_by_key(|(coordinate, count)| {
            (
                *count,
                Reverse(coordinate.abs_diff(edge)),
                Reverse(*coordinate),
            )
        })
        .map(|(coordinate, _)| coordinate)
}

/// Predicts the breakpoint and the sequence of a fusion between two regions from the split reads
/// nominated by their anchored and discordant mates.
#[derive(Clone)]
pub struct FusionEstimator {
    alignments: Arc<dyn AlignmentAccessor + Send + Sync>,
    reads: Arc<dyn ReadAccessor + Send + Sync>,
    reference: Arc<dyn ReferenceAccessor + Send + Sync>,
    annotation: Option<Arc<dyn AnnotationAccessor + Send + Sync>>,
    config: Config,
}

impl FusionEstimator {
    pub fn new(
        alignments: Arc<dyn AlignmentAccessor + Send + Sync>,
        reads: Arc<dyn ReadAccessor + Send + Sync>,
        reference: Arc<dyn ReferenceAccessor + Send + Sync>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            alignments,
            reads,
            reference,
            annotation: None,
            config,
        })
    }

    /// Restrict reference windows to the exons that contain the region edges.
    pub fn set_annotation(
        &mut self,
        annotation: Arc<dyn AnnotationAccessor + Send + Sync>,
    ) -> &mut Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calculate(
        &self,
        pair: &RegionPair,
        fragment_length_mean: f64,
        fragment_length_sd: f64,
        min_read_length: usize,
        max_read_length: usize,
    ) -> Result<FusionResult> {
        let library = Library::new(
            fragment_length_mean,
            fragment_length_sd,
            min_read_length,
            max_read_length,
        );
        self.estimate(pair, &library)
    }

    pub fn estimate(&self, pair: &RegionPair, library: &Library) -> Result<FusionResult> {
        library.validate()?;
        let min_anchor = self.config.min_anchor(library.min_read_length);
        let aligner = SplitAligner::new(min_anchor, self.config.max_mismatch_fraction)?;

        // Region A is read towards the junction, region B away from it
        let reach = library.reach(self.config.window_sd_multiplier);
        let (a, b) = (pair.a(), pair.b());
        let window_a = self
            .window(a, a.strand, reach, library.max_read_length)
            .wrap_err_with(|| format!("Invalid region pair {}: {a}", pair.id()))?;
        let window_b = self
            .window(b, b.strand.flipped(), reach, library.max_read_length)
            .wrap_err_with(|| format!("Invalid region pair {}: {b}", pair.id()))?;

        let reads = self.supporting_reads(pair, library, min_anchor)?;
        let candidates: Vec<_> = reads
            .par_iter()
            .filter_map(|read| {
                aligner
                    .locate_split(&read.oriented(), &window_a.sequence, &window_b.sequence)
                    .map(|split| (read, split))
            })
            .collect();

        let result = Self::consensus(pair, &window_a, &window_b, &candidates);
        log::info!(
            "{}: {} candidate reads, {} split, {} supporting {}:{}/{}:{}",
            pair.id(),
            reads.len(),
            candidates.len(),
            result.supporting_reads(),
            result.break_a().contig(),
            result.break_a().position() + 1,
            result.break_b().contig(),
            result.break_b().position() + 1,
        );
        Ok(result)
    }

    fn window(
        &self,
        locus: &Locus<String, u64>,
        orientation: Strand,
        reach: u64,
        max_read_length: usize,
    ) -> Result<Window> {
        let length = self.reference.length(&locus.contig)?;
        ensure!(
            locus.interval.end() <= length,
            "Region exceeds the length of {} ({length})",
            locus.contig
        );

        let (start, end) = (locus.interval.start(), locus.interval.end());
        let max_read_length = max_read_length as u64;
        let edge = junction_edge(locus);
        let exon = self
            .annotation
            .as_ref()
            .and_then(|x| x.bounding_exon(&locus.contig, edge));

        let interval = match locus.strand {
            Strand::Forward => {
                let mut wend = end.saturating_add(reach).min(length);
                if let Some(exon) = exon {
                    wend = wend.min(exon.end());
                }
                Interval::new(end.saturating_sub(max_read_length), wend)?
            }
            Strand::Reverse => {
                let mut wstart = start.saturating_sub(reach);
                if let Some(exon) = exon {
                    wstart = wstart.max(exon.start());
                }
                Interval::new(wstart, start.saturating_add(max_read_length).min(length))?
            }
        };

        let mut sequence = Vec::with_capacity(interval.len() as usize);
        self.reference
            .fetch(&locus.contig, interval, orientation, &mut sequence)?;
        log::debug!(
            "{locus}: window {}:{}-{} ({} bp)",
            locus.contig,
            interval.start() + 1,
            interval.end(),
            sequence.len()
        );

        Ok(Window {
            interval,
            strand: orientation,
            sequence,
        })
    }

    /// Mates of the alignments pointing towards the junction. Mates found near A are reverse
    /// complemented to read from A into B, mates found near B already do.
    fn supporting_reads(
        &self,
        pair: &RegionPair,
        library: &Library,
        min_anchor: usize,
    ) -> Result<Vec<SupportingRead>> {
        let mut reads = Vec::new();
        let mut seen = HashSet::default();
        let (mut missing, mut filtered) = (0usize, 0usize);

        let mut buffer = Vec::new();
        for (locus, orientation) in [(pair.a(), Strand::Reverse), (pair.b(), Strand::Forward)] {
            let evidence = self
                .alignments
                .query_region(locus)
                .wrap_err_with(|| format!("Failed to query alignments in {locus}"))?;

            for (class, alignment) in evidence.iter() {
                if *alignment.strand() != locus.strand
                    || !seen.insert(alignment.mate_id().clone())
                {
                    continue;
                }

                match self.reads.fetch(alignment.mate_id(), &mut buffer) {
                    Ok(()) => {}
                    Err(err) if LookupError::is_lookup_miss(&err) => {
                        log::debug!("Skipping read: {err}");
                        missing += 1;
                        continue;
                    }
                    Err(err) => {
                        return Err(
                            err.wrap_err(format!("Failed to fetch read {}", alignment.mate_id()))
                        )
                    }
                }

                let length = buffer.len();
                if length < library.min_read_length
                    || length > library.max_read_length
                    || length < 2 * min_anchor
                {
                    filtered += 1;
                    continue;
                }

                reads.push(SupportingRead::new(
                    alignment.mate_id().clone(),
                    buffer.clone(),
                    orientation,
                    class,
                ));
            }
        }

        if missing > 0 || filtered > 0 {
            log::debug!(
                "{}: {missing} mates are missing, {filtered} have unexpected length",
                pair.id()
            );
        }
        Ok(reads)
    }

    fn consensus(
        pair: &RegionPair,
        window_a: &Window,
        window_b: &Window,
        candidates: &[(&SupportingRead, SplitCandidate)],
    ) -> FusionResult {
        let (a, b) = (pair.a(), pair.b());

        let break_a = mode(
            candidates
                .iter()
                .map(|(_, split)| window_a.coordinate(split.junction_a() - 1)),
            junction_edge(a),
        );
        let break_b = mode(
            candidates
                .iter()
                .map(|(_, split)| window_b.coordinate(*split.junction_b())),
            junction_edge(b),
        );

        let (Some(break_a), Some(break_b)) = (break_a, break_b) else {
            return FusionResult::new(
                pair.id().clone(),
                Breakpoint::new(a.contig.clone(), a.strand, window_a.interval.midpoint()),
                Breakpoint::new(b.contig.clone(), b.strand, window_b.interval.midpoint()),
                Vec::new(),
                0,
                0.0,
                0.0,
            );
        };

        // Junction inside the oriented windows
        let (p, q) = (window_a.index(break_a) + 1, window_b.index(break_b));
        let diagonal = p as isize - q as isize;
        let supporting = candidates
            .iter()
            .filter(|(_, split)| split.diagonal() == diagonal)
            .count();
        let sequence = [&window_a.sequence[..p], &window_b.sequence[q..]].concat();

        let positions = candidates
            .iter()
            .map(|(read, split)| (*read.orientation(), read.split_position(*split.offset_a())))
            .collect_vec();
        let by_orientation = |strand: Strand| {
            mean(
                positions
                    .iter()
                    .filter(|(orientation, _)| *orientation == strand)
                    .map(|(_, pos)| *pos),
            )
        };

        let split_pos_avg = mean(positions.iter().map(|(_, pos)| *pos)).unwrap_or(0.0);
        let split_min_avg = match (
            by_orientation(Strand::Forward),
            by_orientation(Strand::Reverse),
        ) {
            (Some(forward), Some(reverse)) => forward.min(reverse),
            (Some(avg), None) | (None, Some(avg)) => avg,
            (None, None) => 0.0,
        };

        FusionResult::new(
            pair.id().clone(),
            Breakpoint::new(a.contig.clone(), a.strand, break_a),
            Breakpoint::new(b.contig.clone(), b.strand, break_b),
            sequence,
            supporting,
            split_pos_avg,
            split_min_avg,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_ties() {
        // Plain majority
        assert_eq!(mode([5, 7, 7, 9].into_iter(), 100), Some(7));
        // Closest to the edge
        assert_eq!(mode([5, 7, 9, 9, 5].into_iter(), 100), Some(9));
        assert_eq!(mode([5, 7, 9, 9, 5].into_iter(), 0), Some(5));
        // Equally close, smaller coordinate
        assert_eq!(mode([4, 8].into_iter(), 6), Some(4));
        assert_eq!(mode(std::iter::empty(), 6), None);
    }

    #[test]
    fn test_window_coordinates() -> Result<()> {
        let forward = Window {
            interval: Interval::new(100, 110)?,
            strand: Strand::Forward,
            sequence: vec![b'A'; 10],
        };
        assert_eq!(forward.coordinate(0), 100);
        assert_eq!(forward.coordinate(9), 109);
        assert_eq!(forward.index(105), 5);

        let reverse = Window {
            strand: Strand::Reverse,
            ..forward
        };
        assert_eq!(reverse.coordinate(0), 109);
        assert_eq!(reverse.coordinate(9), 100);
        assert_eq!(reverse.index(109), 0);
        assert_eq!(reverse.index(reverse.coordinate(3)), 3);
        Ok(())
    }

    #[test]
    fn test_junction_edge() -> Result<()> {
        let locus: Locus<String, u64> = "chr1+:101-200".parse()?;
        assert_eq!(junction_edge(&locus), 199);
        assert_eq!(junction_edge(&locus.flipped()), 100);
        Ok(())
    }
}
