pub use interval::{Interval, IntervalOp};
pub use locus::{Contig, Locus};
pub use strand::Strand;

mod interval;
mod locus;
mod strand;
