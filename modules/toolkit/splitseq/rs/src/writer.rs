use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use eyre::{Result, WrapErr};

use splitseq_io_rs::WriteRecord;

use crate::result::{Breakpoint, FusionResult};

/// Tab-separated output of fusion results. Each result becomes one line in the sequences table,
/// `id, sequence, inter-length, supporting reads, split position average, split minimum
/// average`, and two lines in the breakpoints table, `id, contig, strand, position` (1-based).
pub struct Writer<S: Write, B: Write> {
    sequences: S,
    breaks: B,
}

impl Writer<BufWriter<File>, BufWriter<File>> {
    pub fn from_paths(sequences: impl AsRef<Path>, breaks: impl AsRef<Path>) -> Result<Self> {
        let create = |path: &Path| -> Result<BufWriter<File>> {
            let file = File::create(path)
                .wrap_err_with(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self::new(
            create(sequences.as_ref())?,
            create(breaks.as_ref())?,
        ))
    }
}

impl<S: Write, B: Write> Writer<S, B> {
    pub fn new(sequences: S, breaks: B) -> Self {
        Self { sequences, breaks }
    }

    pub fn into_inner(self) -> (S, B) {
        (self.sequences, self.breaks)
    }

    fn write_break(&mut self, id: &str, breakpoint: &Breakpoint) -> Result<()> {
        writeln!(
            self.breaks,
            "{}\t{}\t{}\t{}",
            id,
            breakpoint.contig(),
            breakpoint.strand(),
            breakpoint.position() + 1
        )?;
        Ok(())
    }
}

impl<S: Write, B: Write> WriteRecord for Writer<S, B> {
    type Record = FusionResult;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        write!(self.sequences, "{}\t", record.id())?;
        self.sequences.write_all(record.sequence())?;
        writeln!(
            self.sequences,
            "\t{}\t{}\t{}\t{}",
            record.inter_length(),
            record.supporting_reads(),
            record.split_pos_avg(),
            record.split_min_avg()
        )?;

        self.write_break(record.id(), record.break_a())?;
        self.write_break(record.id(), record.break_b())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sequences.flush()?;
        self.breaks.flush()?;
        Ok(())
    }
}
