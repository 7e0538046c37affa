use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use eyre::{bail, ensure, OptionExt, Result, WrapErr};
use flate2::read::MultiGzDecoder;

use splitseq_core_rs::loc::{Interval, IntervalOp, Strand};

use super::record::Record;
use crate::ReadRecord;

pub mod parse {
    use super::*;

    pub fn seqid<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<String> {
        let seqid = parts.next().ok_or_eyre("Missing BED seqid")?;
        Ok(seqid.to_owned())
    }

    pub fn interval<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Interval<u64>> {
        let start = parts.next().ok_or_eyre("Missing BED start")?;
        let end = parts.next().ok_or_eyre("Missing BED end")?;

        let (start, end) = match (start.parse::<u64>(), end.parse::<u64>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => bail!("Invalid BED interval"),
        };
        Interval::new(start, end).wrap_err("Invalid BED interval")
    }

    pub fn name<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<String> {
        let name = parts.next().ok_or_eyre("Missing BED name")?;
        Ok(name.to_owned())
    }

    pub fn score<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<f64> {
        let score = parts.next().ok_or_eyre("Missing BED score")?;
        score.parse::<f64>().wrap_err("Invalid BED score")
    }

    pub fn strand<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<Option<Strand>> {
        let strand = parts.next().ok_or_eyre("Missing BED strand")?;
        match strand {
            "." => Ok(None),
            _ => Ok(Some(strand.parse().wrap_err("Invalid BED strand")?)),
        }
    }

    pub fn blocks<'a>(
        parts: &mut impl Iterator<Item = &'a str>,
        interval: &Interval<u64>,
    ) -> Result<Vec<Interval<u64>>> {
        let count = parts.next().ok_or_eyre("Missing BED blockCount")?;
        let count = count.parse::<usize>().wrap_err("Invalid BED blockCount")?;
        ensure!(count > 0, "BED blockCount must be greater than 0");

        let sizes = parts.next().ok_or_eyre("Missing BED blockSizes")?;
        let starts = parts.next().ok_or_eyre("Missing BED blockStarts")?;

        // Trailing commas are allowed by the format
        let mut sizes = sizes.strip_suffix(',').unwrap_or(sizes).split(',');
        let mut starts = starts.strip_suffix(',').unwrap_or(starts).split(',');

        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            let (size, start) = match (sizes.next(), starts.next()) {
                (Some(size), Some(start)) => (size, start),
                _ => bail!("BED blockCount does not match the number of blocks in the record"),
            };

            let size = size.parse::<u64>().wrap_err("Invalid BED blockSizes")?;
            let start = start.parse::<u64>().wrap_err("Invalid BED blockStarts")? + interval.start();

            let block = Interval::new(start, start + size).wrap_err("Invalid BED blocks")?;
            results.push(block);
        }

        ensure!(
            sizes.next().is_none() && starts.next().is_none(),
            "BED blockCount does not match the number of blocks in the record"
        );
        Ok(results)
    }

    /// Parse a BED3, BED6 or BED12 line. Columns beyond the recognized ones are ignored for
    /// BED7-BED11 records, which are read as BED6.
    pub fn record(line: &str) -> Result<Record> {
        let columns = line.split('\t').count();
        ensure!(columns >= 3, "BED record must have at least 3 columns");
        ensure!(columns <= 12, "BED record has too many fields");

        let mut parts = line.split('\t');
        let seqid = seqid(&mut parts)?;
        let interval = interval(&mut parts)?;

        let name = match columns {
            4.. => Some(name(&mut parts)?),
            _ => None,
        };
        if columns >= 5 {
            score(&mut parts)?;
        }
        let strand = match columns {
            6.. => strand(&mut parts)?,
            _ => None,
        };

        let blocks = match columns {
            12 => {
                // thickStart, thickEnd, itemRgb
                parts.nth(2).ok_or_eyre("Missing BED itemRgb")?;
                blocks(&mut parts, &interval)?
            }
            _ => Vec::new(),
        };

        Record::new(seqid, interval, name, strand, blocks)
    }
}

/// Line-oriented BED reader. Comments, `track` and `browser` lines are skipped.
pub struct Reader<R> {
    reader: R,
    buffer: String,
    lineno: usize,
}

impl Reader<Box<dyn BufRead + Send>> {
    /// Open a plain or gzip-compressed (`.gz`) BED file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open BED file: {}", path.display()))?;

        let reader: Box<dyn BufRead + Send> = match path.extension().and_then(|x| x.to_str()) {
            Some("gz" | "bgz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
            _ => Box::new(BufReader::new(file)),
        };
        Ok(Self::new(reader))
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            lineno: 0,
        }
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Record;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(false);
            }
            self.lineno += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            *into = parse::record(line).wrap_err_with(|| {
                format!("Failed to parse BED record at line {}: {}", self.lineno, line)
            })?;
            return Ok(true);
        }
    }
}
