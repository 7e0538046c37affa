use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use eyre::{OptionExt, Result, WrapErr};
use noodles::core::{region::Interval as RegionInterval, Position};
use noodles::csi::BinningIndex;
use noodles::sam::alignment::Record as _;
use noodles::{bam, bgzf, csi, sam};

use splitseq_core_rs::loc::{Interval, IntervalOp, Strand};

use super::record::{mate_ids, Alignment};

/// Coordinate-sorted BAM file together with its `.bai` index.
#[derive(Getters)]
pub struct IndexedReader {
    path: PathBuf,
    #[getter(skip)]
    inner: bam::io::Reader<bgzf::io::Reader<File>>,
    #[getter(skip)]
    index: Box<dyn BinningIndex + Send + Sync>,
    header: sam::Header,
    #[getter(skip)]
    record: bam::Record,
}

impl IndexedReader {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut bai = OsString::from(path.as_os_str());
        bai.push(".bai");
        let index = bam::bai::read(&bai)
            .wrap_err_with(|| format!("Failed to read BAM index: {:?}", bai))?;

        let file = File::open(&path)
            .wrap_err_with(|| format!("Failed to open BAM file: {}", path.display()))?;
        let mut inner = bam::io::Reader::new(file);
        let header = inner
            .read_header()
            .wrap_err_with(|| format!("Failed to read BAM header: {}", path.display()))?;

        Ok(Self {
            path,
            inner,
            index: Box::new(index),
            header,
            record: bam::Record::default(),
        })
    }

    /// Primary mapped alignments overlapping the interval, in file order. Contigs absent from the
    /// BAM header have no alignments.
    pub fn query(
        &mut self,
        contig: &str,
        interval: Interval<u64>,
        into: &mut Vec<Alignment>,
    ) -> Result<()> {
        into.clear();

        let Some(reference_sequence_id) = self
            .header
            .reference_sequences()
            .get_index_of(contig.as_bytes())
        else {
            log::debug!(
                "Contig {contig} is not present in {}, no alignments",
                self.path.display()
            );
            return Ok(());
        };

        // 1-based inclusive coordinates
        let (start, end) = (interval.start() + 1, interval.end());
        let start = Position::new(start as usize).ok_or_eyre("Invalid BAM query start")?;
        let end = Position::new(end as usize).ok_or_eyre("Invalid BAM query end")?;
        let region = RegionInterval::from(start..=end);

        let chunks = self
            .index
            .query(reference_sequence_id, region)
            .wrap_err_with(|| {
                format!(
                    "Failed to query {contig}:{start}-{end} in {}",
                    self.path.display()
                )
            })?;
        let mut reader = bam::io::Reader::from(csi::io::Query::new(self.inner.get_mut(), chunks));

        while reader.read_record(&mut self.record)? != 0 {
            let record = &self.record;

            let flags = record.flags();
            if flags.is_unmapped() || flags.is_secondary() || flags.is_supplementary() {
                continue;
            }

            // Chunks are coarse, the exact overlap must be checked for every record
            let (Some(id), Some(alignment_start), Some(alignment_end)) = (
                record.reference_sequence_id().transpose()?,
                record.alignment_start().transpose()?,
                record.alignment_end().transpose()?,
            ) else {
                continue;
            };
            if id != reference_sequence_id
                || !region.intersects((alignment_start..=alignment_end).into())
            {
                continue;
            }

            let Some(name) = record.name() else {
                continue;
            };
            let name = String::from_utf8_lossy(name.as_ref());
            let (read_id, mate_id) = mate_ids(&name, flags.is_last_segment());

            into.push(Alignment::new(
                read_id,
                mate_id,
                contig.to_string(),
                usize::from(alignment_start) as u64 - 1,
                Strand::from_reverse_flag(flags.is_reverse_complemented()),
            ));
        }
        Ok(())
    }
}
