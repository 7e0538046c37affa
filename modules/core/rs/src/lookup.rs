use derive_more::{Display, Error};

/// Routine misses reported by index lookups. Wrapped into `eyre::Report` by the accessors and
/// recovered with `downcast_ref` wherever a miss must be told apart from a broken index.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum LookupError {
    #[display("{what} not found in the index: {id}")]
    NotFound { what: &'static str, id: String },
    #[display("{seqid}:{start}-{end} is out of range (sequence length: {length})")]
    OutOfRange {
        seqid: String,
        start: u64,
        end: u64,
        length: u64,
    },
}

impl LookupError {
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    /// Check whether the report was caused by a routine lookup miss.
    pub fn is_lookup_miss(report: &eyre::Report) -> bool {
        report.downcast_ref::<LookupError>().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn test_lookup_miss_is_recognized() {
        let miss: eyre::Report = LookupError::not_found("Read", "r1/2").into();
        assert!(LookupError::is_lookup_miss(&miss));
        assert_eq!(miss.to_string(), "Read not found in the index: r1/2");

        let wrapped: eyre::Result<()> = Err(LookupError::OutOfRange {
            seqid: "chr1".into(),
            start: 10,
            end: 20,
            length: 15,
        })
        .wrap_err("Failed to fetch");
        assert!(LookupError::is_lookup_miss(&wrapped.unwrap_err()));

        let other = eyre::eyre!("BAM index is corrupted");
        assert!(!LookupError::is_lookup_miss(&other));
    }
}
