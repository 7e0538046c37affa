// Format specification: https://samtools.github.io/hts-specs/BEDv1.pdf
//
// Records are read as BED3, BED6 or BED12 depending on the number of columns. BED12 blocks are
// stored in absolute coordinates:
// * blockStarts are relative to chromStart and sorted in ascending order
// * blocks must not overlap and must stay within [chromStart, chromEnd)

mod reader;
mod record;

pub use reader::{parse, Reader};
pub use record::Record;
