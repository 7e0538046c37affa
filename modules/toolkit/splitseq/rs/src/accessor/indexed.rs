use std::cell::RefCell;
use std::path::{Path, PathBuf};

use derive_getters::Getters;
use eyre::{Result, WrapErr};
use thread_local::ThreadLocal;

use splitseq_collections_rs::genomic_index::GenomicIndex;
use splitseq_collections_rs::interval_tree::Bits;
use splitseq_core_rs::loc::{Interval, Locus, Strand};
use splitseq_core_rs::seq::reverse_complement_in_place;
use splitseq_core_rs::LookupError;
use splitseq_io_rs::fasta::IndexedReaderMutOp;
use splitseq_io_rs::{bam, bed, fasta, ReadRecord};

use super::{
    AlignmentAccessor, AnnotationAccessor, ReadAccessor, ReferenceAccessor, RegionEvidence,
};

type FastaHandle = Box<dyn IndexedReaderMutOp + Send + Sync>;

/// Indexed FASTA file opened lazily once per thread.
struct FastaHandles {
    path: PathBuf,
    handles: ThreadLocal<RefCell<FastaHandle>>,
}

impl FastaHandles {
    fn open(path: impl AsRef<Path>) -> Result<Self> {
        let handles = Self {
            path: path.as_ref().to_path_buf(),
            handles: ThreadLocal::new(),
        };
        // Fail early on missing files and broken indices
        handles.with(|_| Ok(()))?;
        Ok(handles)
    }

    fn with<T>(&self, op: impl FnOnce(&mut FastaHandle) -> Result<T>) -> Result<T> {
        let handle = self
            .handles
            .get_or_try(|| fasta::IndexedReader::<()>::from_path(&self.path).map(RefCell::new))?;
        op(&mut handle.borrow_mut())
    }
}

/// Reference genome backed by an indexed FASTA file (`.fai`, plus `.gzi` for BGZF files).
pub struct IndexedReference {
    fasta: FastaHandles,
}

impl IndexedReference {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let fasta = FastaHandles::open(path).wrap_err("Failed to open the reference genome")?;
        Ok(Self { fasta })
    }

    pub fn path(&self) -> &Path {
        &self.fasta.path
    }
}

impl ReferenceAccessor for IndexedReference {
    fn length(&self, seqid: &str) -> Result<u64> {
        self.fasta.with(|reader| {
            reader
                .length(seqid)
                .ok_or_else(|| LookupError::not_found("Sequence", seqid).into())
        })
    }

    fn fetch(
        &self,
        seqid: &str,
        interval: Interval<u64>,
        strand: Strand,
        into: &mut Vec<u8>,
    ) -> Result<()> {
        self.fasta.with(|reader| reader.fetch(seqid, interval, into))?;
        if strand == Strand::Reverse {
            reverse_complement_in_place(into);
        }
        Ok(())
    }
}

/// Raw read sequences stored in an indexed FASTA file and keyed by read ID (`<name>/1`, `<name>/2`).
pub struct IndexedReads {
    fasta: FastaHandles,
}

impl IndexedReads {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let fasta = FastaHandles::open(path).wrap_err("Failed to open the read sequences")?;
        Ok(Self { fasta })
    }

    pub fn path(&self) -> &Path {
        &self.fasta.path
    }
}

impl ReadAccessor for IndexedReads {
    fn fetch(&self, read_id: &str, into: &mut Vec<u8>) -> Result<()> {
        self.fasta.with(|reader| {
            if reader.length(read_id).is_none() {
                return Err(LookupError::not_found("Read", read_id).into());
            }
            reader.fetch_full_seq(read_id, into)
        })
    }
}

/// Anchored and discordant alignments stored in two coordinate-sorted, indexed BAM files.
#[derive(Getters)]
pub struct IndexedAlignments {
    anchored: PathBuf,
    discordant: PathBuf,
    #[getter(skip)]
    handles: ThreadLocal<RefCell<(bam::IndexedReader, bam::IndexedReader)>>,
}

impl IndexedAlignments {
    pub fn from_paths(anchored: impl AsRef<Path>, discordant: impl AsRef<Path>) -> Result<Self> {
        let alignments = Self {
            anchored: anchored.as_ref().to_path_buf(),
            discordant: discordant.as_ref().to_path_buf(),
            handles: ThreadLocal::new(),
        };
        alignments.handle()?;
        Ok(alignments)
    }

    fn handle(&self) -> Result<&RefCell<(bam::IndexedReader, bam::IndexedReader)>> {
        self.handles.get_or_try(|| -> Result<_> {
            let anchored = bam::IndexedReader::from_path(&self.anchored)
                .wrap_err("Failed to open anchored alignments")?;
            let discordant = bam::IndexedReader::from_path(&self.discordant)
                .wrap_err("Failed to open discordant alignments")?;
            Ok(RefCell::new((anchored, discordant)))
        })
    }
}

impl AlignmentAccessor for IndexedAlignments {
    fn query_region(&self, locus: &Locus<String, u64>) -> Result<RegionEvidence> {
        let mut handle = self.handle()?.borrow_mut();
        let (anchored, discordant) = &mut *handle;

        let mut evidence = RegionEvidence::default();
        anchored.query(&locus.contig, locus.interval, &mut evidence.anchored)?;
        discordant.query(&locus.contig, locus.interval, &mut evidence.discordant)?;

        log::debug!(
            "{locus}: {} anchored and {} discordant alignments",
            evidence.anchored.len(),
            evidence.discordant.len()
        );
        Ok(evidence)
    }
}

/// Exon boundaries loaded from a BED file. Every block of a BED12 record is an exon, BED3/BED6
/// records are exons as a whole.
#[derive(Clone, Debug, Default)]
pub struct ExonIndex {
    index: GenomicIndex<String, Bits<u64, ()>>,
}

impl ExonIndex {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut records = Vec::new();
        bed::Reader::from_path(path)?
            .read_to_end(&mut records)
            .wrap_err_with(|| format!("Failed to read exons from {}", path.display()))?;

        let index = Self::from_records(&records);
        log::info!(
            "Loaded {} exons from {} records in {}",
            index.len(),
            records.len(),
            path.display()
        );
        Ok(index)
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a bed::Record>) -> Self {
        let index = records
            .into_iter()
            .flat_map(|record| record.exons().map(move |x| (record.seqid().clone(), x, ())))
            .collect();
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl AnnotationAccessor for ExonIndex {
    fn bounding_exon(&self, seqid: &str, pos: u64) -> Option<Interval<u64>> {
        self.index
            .covering(&seqid.to_string(), pos)
            .map(|(exon, _)| exon)
    }
}
