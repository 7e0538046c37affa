pub use aligner::SplitAligner;
pub use candidate::SplitCandidate;

mod aligner;
mod candidate;
