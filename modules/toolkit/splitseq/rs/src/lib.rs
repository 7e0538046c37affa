pub use config::{Config, Library};
pub use estimator::FusionEstimator;
pub use evidence::{EvidenceClass, SupportingRead};
pub use region::RegionPair;
pub use result::{Breakpoint, FusionResult};
pub use splitseq::SplitSeq;
pub use writer::Writer;

pub mod accessor;
mod config;
mod engine;
mod estimator;
mod evidence;
pub mod region;
mod result;
mod splitseq;
mod worker;
mod writer;
