pub mod bam;
pub mod bed;
pub mod fasta;
mod traits;

pub use traits::{ReadRecord, WriteRecord};
