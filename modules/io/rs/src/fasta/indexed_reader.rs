use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use ahash::HashMap;
use derive_getters::{Dissolve, Getters};
use eyre::{ensure, eyre, Result, WrapErr};
use impl_tools::autoimpl;

use splitseq_core_rs::loc::{Interval, IntervalOp};
use splitseq_core_rs::LookupError;

/// An indexed FASTA reader that can fetch sequences by reference sequence ID and interval.
#[autoimpl(for<T: trait + ?Sized> Box<T>, &mut T)]
pub trait IndexedReaderMutOp {
    /// Length of the sequence with the given ID, if it is present in the index.
    fn length(&self, seqid: &str) -> Option<u64>;

    /// Fetch the sequence for the given reference sequence ID and interval.
    fn fetch(&mut self, seqid: &str, interval: Interval<u64>, buffer: &mut Vec<u8>) -> Result<()>;

    /// Fetch the full reference sequence with the given ID.
    fn fetch_full_seq(&mut self, seqid: &str, buffer: &mut Vec<u8>) -> Result<()>;
}

/// Layout of a single sequence inside the FASTA file, as described by a `.fai` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    length: u64,
    offset: u64,
    bases_per_line: u64,
    bytes_per_line: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Dissolve, Getters)]
pub struct IndexedReader<R> {
    reader: R,
    // IDs of the reference sequences as they appear in the FASTA file
    ids: Vec<String>,
    #[getter(skip)]
    layout: Vec<Layout>,
    #[getter(skip)]
    index: HashMap<String, usize>,
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut sibling = OsString::from(path.as_os_str());
    sibling.push(".");
    sibling.push(extension);
    PathBuf::from(sibling)
}

fn is_bgzf(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|x| x.to_str()),
        Some("gz" | "bgz" | "bgzf")
    )
}

impl IndexedReader<()> {
    /// Open a FASTA file together with its `.fai` index. BGZF-compressed files (`.gz`, `.bgz`)
    /// additionally require a `.gzi` index.
    pub fn from_path(
        fasta: impl AsRef<Path>,
    ) -> Result<Box<dyn IndexedReaderMutOp + Send + Sync + 'static>> {
        let path = fasta.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open FASTA file: {}", path.display()))?;

        let fai = sibling(path, "fai");
        ensure!(fai.exists(), "fai index does not exist: {:?}", fai);
        let fai = BufReader::new(File::open(&fai)?);

        let boxed: Box<dyn IndexedReaderMutOp + Send + Sync + 'static> = if is_bgzf(path) {
            let gzi = sibling(path, "gzi");
            ensure!(gzi.exists(), "gzi index does not exist: {:?}", gzi);
            let gzi = noodles::bgzf::gzi::fs::read(&gzi)?;

            let reader = noodles::bgzf::io::indexed_reader::IndexedReader::new(file, gzi);
            Box::new(IndexedReader::new(reader, fai)?)
        } else {
            Box::new(IndexedReader::new(BufReader::new(file), fai)?)
        };
        Ok(boxed)
    }
}

impl<R: Read + Seek> IndexedReader<R> {
    pub fn new<I: BufRead>(reader: R, mut index: I) -> Result<IndexedReader<R>> {
        let mut ids = Vec::new();
        let mut layout = Vec::new();

        let mut buffer = String::new();
        while index.read_line(&mut buffer)? > 0 {
            let line = buffer.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                buffer.clear();
                continue;
            }

            let err = || eyre!("Invalid FASTA index line: {}", line);
            let mut parts = line.split('\t');

            let id = parts.next().ok_or_else(err)?;
            ensure!(!id.is_empty(), "Empty sequence ID in the FASTA index: {}", line);

            let mut number = || -> Result<u64> {
                parts
                    .next()
                    .ok_or_else(err)?
                    .parse::<u64>()
                    .wrap_err_with(err)
            };
            let seq = Layout {
                length: number()?,
                offset: number()?,
                bases_per_line: number()?,
                bytes_per_line: number()?,
            };
            ensure!(
                parts.next().is_none(),
                "Extra fields in the FASTA index, line: {}",
                line
            );

            ensure!(
                seq.length > 0,
                "Length of the reference sequence must be greater than zero, line: {}",
                line
            );
            ensure!(
                seq.bases_per_line > 0,
                "Bases per line must be greater than zero, line: {}",
                line
            );
            ensure!(
                seq.bytes_per_line > seq.bases_per_line,
                "Bytes per line must be greater than bases per line, line: {}",
                line
            );

            ids.push(id.to_string());
            layout.push(seq);
            buffer.clear();
        }

        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        ensure!(
            index.len() == ids.len(),
            "Duplicated sequence IDs in the FASTA index"
        );

        Ok(Self {
            reader,
            ids,
            layout,
            index,
        })
    }

    fn sanitize(&self, seqid: &str, interval: &Interval<u64>) -> Result<Layout> {
        let layout = self
            .index
            .get(seqid)
            .map(|x| self.layout[*x])
            .ok_or_else(|| LookupError::not_found("Sequence", seqid))?;

        let (start, end) = (interval.start(), interval.end());
        if start >= layout.length || end > layout.length {
            return Err(LookupError::OutOfRange {
                seqid: seqid.to_string(),
                start,
                end,
                length: layout.length,
            }
            .into());
        }
        Ok(layout)
    }

    fn _fetch(&mut self, layout: Layout, start: u64, end: u64, buffer: &mut Vec<u8>) -> Result<()> {
        let Layout {
            offset,
            bases_per_line,
            bytes_per_line,
            ..
        } = layout;
        let endline_bytes = bytes_per_line - bases_per_line;

        let start_line = start / bases_per_line;
        let end_line = end / bases_per_line;

        buffer.clear();
        buffer.try_reserve((end - start) as usize)?;

        let start_byte = offset + start_line * bytes_per_line + start % bases_per_line;
        self.reader.seek(std::io::SeekFrom::Start(start_byte))?;

        // The whole sequence is contained in a single line
        if start_line == end_line {
            self.reader.by_ref().take(end - start).read_to_end(buffer)?;
            return Ok(());
        }

        // First line might be incomplete
        let mut sink = std::io::sink();
        let to_read = bases_per_line * (start_line + 1) - start;
        self.reader.by_ref().take(to_read).read_to_end(buffer)?;
        std::io::copy(&mut self.reader.by_ref().take(endline_bytes), &mut sink)?;

        for _ in start_line + 1..end_line {
            self.reader
                .by_ref()
                .take(bases_per_line)
                .read_to_end(buffer)?;
            std::io::copy(&mut self.reader.by_ref().take(endline_bytes), &mut sink)?;
        }

        // Last line might be incomplete as well
        self.reader
            .by_ref()
            .take(end - end_line * bases_per_line)
            .read_to_end(buffer)?;

        ensure!(
            buffer.len() as u64 == end - start,
            "FASTA file is truncated or doesn't match its index"
        );
        Ok(())
    }
}

impl<R: Read + Seek> IndexedReaderMutOp for IndexedReader<R> {
    fn length(&self, seqid: &str) -> Option<u64> {
        self.index.get(seqid).map(|x| self.layout[*x].length)
    }

    fn fetch(&mut self, seqid: &str, interval: Interval<u64>, buffer: &mut Vec<u8>) -> Result<()> {
        let layout = self.sanitize(seqid, &interval)?;
        self._fetch(layout, interval.start(), interval.end(), buffer)
    }

    fn fetch_full_seq(&mut self, seqid: &str, buffer: &mut Vec<u8>) -> Result<()> {
        let length = self
            .length(seqid)
            .ok_or_else(|| LookupError::not_found("Sequence", seqid))?;
        self.fetch(seqid, Interval::new(0, length)?, buffer)
    }
}
