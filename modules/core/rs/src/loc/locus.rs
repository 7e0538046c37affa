use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, eyre, Report, WrapErr};

use crate::num::PrimInt;

use super::interval::{Interval, IntervalOp};
use super::strand::Strand;

/// Contig is an object that refers to an actual assembly contig. Depending on the context, can be
/// encoded by a string, a number, etc.
pub trait Contig:
    Hash + PartialEq + Eq + PartialOrd + Ord + Clone + Default + Debug + Send + Sync
{
}

impl<T: Hash + PartialEq + Eq + PartialOrd + Ord + Clone + Default + Debug + Send + Sync> Contig
    for T
{
}

/// A locus is a stranded region of a genome: contig, half-open interval and strand.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Dissolve, Constructor)]
pub struct Locus<Ctg: Contig, Idx: PrimInt> {
    pub contig: Ctg,
    pub interval: Interval<Idx>,
    pub strand: Strand,
}

impl<Ctg: Contig, Idx: PrimInt> Locus<Ctg, Idx> {
    /// The same region on the opposite strand.
    pub fn flipped(&self) -> Self {
        Self {
            contig: self.contig.clone(),
            interval: self.interval,
            strand: self.strand.flipped(),
        }
    }
}

impl<Ctg: Contig, Idx: PrimInt> Default for Locus<Ctg, Idx> {
    fn default() -> Self {
        Self {
            contig: Ctg::default(),
            interval: Interval::default(),
            strand: Strand::default(),
        }
    }
}

impl<Ctg: Contig, Idx: PrimInt> From<(Ctg, Interval<Idx>, Strand)> for Locus<Ctg, Idx> {
    fn from((contig, interval, strand): (Ctg, Interval<Idx>, Strand)) -> Self {
        Self {
            contig,
            interval,
            strand,
        }
    }
}

/// `<contig><strand>:<start>-<end>` with 1-based inclusive coordinates, e.g. `chr12+:1001-2000`.
impl Display for Locus<String, u64> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}:{}-{}",
            self.contig,
            self.strand,
            self.interval.start() + 1,
            self.interval.end()
        )
    }
}

impl FromStr for Locus<String, u64> {
    type Err = Report;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || eyre!("Invalid region {value:?}, expected <contig><strand>:<start>-<end>");

        let (head, range) = value.trim().rsplit_once(':').ok_or_else(err)?;
        let strand = head.chars().last().ok_or_else(err)?;
        let strand = Strand::try_from(strand).wrap_err_with(err)?;
        let contig = &head[..head.len() - 1];
        ensure!(!contig.is_empty(), "Empty contig name in region {value:?}");

        let (start, end) = range.split_once('-').ok_or_else(err)?;
        let start = start.trim().parse::<u64>().wrap_err_with(err)?;
        let end = end.trim().parse::<u64>().wrap_err_with(err)?;
        ensure!(start >= 1, "Region start must be 1-based: {value:?}");

        let interval = Interval::new(start - 1, end).wrap_err_with(err)?;
        Ok(Self::new(contig.to_string(), interval, strand))
    }
}
