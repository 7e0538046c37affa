pub use indexed_reader::IndexedReader;
pub use record::{mate_ids, Alignment};

mod indexed_reader;
mod record;
