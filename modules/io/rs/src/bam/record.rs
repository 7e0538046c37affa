use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use splitseq_core_rs::loc::Strand;

/// A mapped read reduced to what is needed to nominate its mate as a split-read candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Dissolve, Constructor)]
pub struct Alignment {
    read_id: String,
    mate_id: String,
    contig: String,
    // 0-based leftmost mapped position
    start: u64,
    strand: Strand,
}

/// Derive identifiers of a read and its mate using the `<name>/1`, `<name>/2` convention. Names
/// that already carry a segment suffix take precedence over the SAM flags.
pub fn mate_ids(name: &str, is_last_segment: bool) -> (String, String) {
    if let Some(base) = name.strip_suffix("/1") {
        return (name.to_string(), format!("{base}/2"));
    }
    if let Some(base) = name.strip_suffix("/2") {
        return (name.to_string(), format!("{base}/1"));
    }

    match is_last_segment {
        false => (format!("{name}/1"), format!("{name}/2")),
        true => (format!("{name}/2"), format!("{name}/1")),
    }
}
