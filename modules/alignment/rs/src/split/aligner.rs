use derive_getters::Getters;
use eyre::{ensure, Result};

use super::candidate::SplitCandidate;
use crate::scoring::equiv::{Classifier, Nucleotides};

/// Ungapped split aligner. Finds the offset `k` that splits a read into a prefix matching the end
/// of window A and a suffix matching the beginning of window B with the fewest mismatches.
///
/// Both windows are expected in the read orientation: window A runs towards the junction and
/// window B runs away from it. Ties are resolved towards the split closest to the read midpoint,
/// then towards the smaller offset.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct SplitAligner<C = Nucleotides> {
    min_anchor: usize,
    max_mismatch_fraction: f64,
    #[getter(skip)]
    classifier: C,
}

impl SplitAligner<Nucleotides> {
    pub fn new(min_anchor: usize, max_mismatch_fraction: f64) -> Result<Self> {
        Self::with_classifier(min_anchor, max_mismatch_fraction, Nucleotides::default())
    }
}

impl<C: Classifier<Symbol = u8>> SplitAligner<C> {
    pub fn with_classifier(
        min_anchor: usize,
        max_mismatch_fraction: f64,
        classifier: C,
    ) -> Result<Self> {
        ensure!(min_anchor > 0, "Minimum anchor length must be positive");
        ensure!(
            (0.0..=1.0).contains(&max_mismatch_fraction),
            "Maximum mismatch fraction must be within [0, 1], got {max_mismatch_fraction}"
        );
        Ok(Self {
            min_anchor,
            max_mismatch_fraction,
            classifier,
        })
    }

    #[inline(always)]
    fn mismatch(&self, s1: u8, s2: u8) -> u32 {
        self.classifier.classify(&s1, &s2).is_mismatch() as u32
    }

    /// Range of split offsets that leave at least `min_anchor` bases on both sides and fit into
    /// both windows.
    fn splits(&self, length: usize, a: usize, b: usize) -> Option<(usize, usize)> {
        let lo = self.min_anchor.max(length.saturating_sub(b));
        let hi = length.checked_sub(self.min_anchor)?.min(a);
        (lo <= hi).then_some((lo, hi))
    }

    fn select(
        &self,
        length: usize,
        candidates: impl Iterator<Item = SplitCandidate>,
    ) -> Option<SplitCandidate> {
        let best = candidates.min_by_key(|x| {
            (
                *x.mismatches(),
                (2 * x.offset_a()).abs_diff(length),
                *x.offset_a(),
            )
        })?;

        let allowed = self.max_mismatch_fraction * length as f64;
        (*best.mismatches() as f64 <= allowed).then_some(best)
    }

    /// Split the read assuming that the junction lies exactly at the end of window A and at the
    /// start of window B.
    pub fn find_split(&self, read: &[u8], a: &[u8], b: &[u8]) -> Option<SplitCandidate> {
        let length = read.len();
        let (lo, hi) = self.splits(length, a.len(), b.len())?;

        let candidates = (lo..=hi).map(|k| {
            let prefix: u32 = read[..k]
                .iter()
                .zip(&a[a.len() - k..])
                .map(|(x, y)| self.mismatch(*x, *y))
                .sum();
            let suffix: u32 = read[k..]
                .iter()
                .zip(&b[..length - k])
                .map(|(x, y)| self.mismatch(*x, *y))
                .sum();
            SplitCandidate::new(k, length - k, a.len(), 0, prefix + suffix)
        });
        self.select(length, candidates)
    }

    /// Split the read when the junction position inside each window is unknown. For every offset
    /// `k` the prefix is placed at the best junction `p` in A (ties: smallest `p`) and the suffix
    /// at the best junction `q` in B (ties: largest `q`).
    ///
    /// Both placements are computed by sweeping alignment diagonals, which takes
    /// O(L * (|A| + |B| + L)) comparisons.
    pub fn locate_split(&self, read: &[u8], a: &[u8], b: &[u8]) -> Option<SplitCandidate> {
        let length = read.len();
        let (lo, hi) = self.splits(length, a.len(), b.len())?;

        // Prefix read[..k] against a[d..d + k], junction p = d + k
        let mut best_a = vec![(u32::MAX, 0usize); hi + 1];
        for d in 0..=(a.len() - lo) {
            let mut mismatches = 0;
            for k in 1..=hi.min(a.len() - d) {
                mismatches += self.mismatch(read[k - 1], a[d + k - 1]);
                if k >= lo && mismatches < best_a[k].0 {
                    best_a[k] = (mismatches, d + k);
                }
            }
        }

        // Suffix read[k..] against b[e + k..e + length], junction q = e + k
        let mut best_b = vec![(u32::MAX, 0usize); hi + 1];
        let (emin, emax) = (-(hi as isize), b.len() as isize - length as isize);
        for e in emin..=emax {
            let mut mismatches = 0;
            for k in (lo..length).rev() {
                let q = e + k as isize;
                if q < 0 {
                    break;
                }
                mismatches += self.mismatch(read[k], b[q as usize]);
                if k <= hi && mismatches <= best_b[k].0 {
                    best_b[k] = (mismatches, q as usize);
                }
            }
        }

        let candidates = (lo..=hi).filter_map(|k| {
            let ((ma, p), (mb, q)) = (best_a[k], best_b[k]);
            (ma != u32::MAX && mb != u32::MAX)
                .then(|| SplitCandidate::new(k, length - k, p, q, ma + mb))
        });
        self.select(length, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_seq(seed: u64, length: usize) -> Vec<u8> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1) | 1;
        (0..length)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                b"ACGT"[((state >> 32) % 4) as usize]
            })
            .collect()
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(SplitAligner::new(0, 0.05).is_err());
        assert!(SplitAligner::new(10, -0.1).is_err());
        assert!(SplitAligner::new(10, 1.5).is_err());
        assert!(SplitAligner::new(10, f64::NAN).is_err());
        assert!(SplitAligner::new(1, 1.0).is_ok());
    }

    #[test]
    fn test_clean_split() {
        let (ref_a, ref_b) = (random_seq(1, 100), random_seq(2, 100));
        let read = [&ref_a[80..100], &ref_b[0..80]].concat();

        let aligner = SplitAligner::new(20, 0.05).unwrap();
        for split in [
            aligner.find_split(&read, &ref_a, &ref_b),
            aligner.locate_split(&read, &ref_a, &ref_b),
        ] {
            let split = split.unwrap();
            assert_eq!(*split.offset_a(), 20);
            assert_eq!(*split.offset_b(), 80);
            assert_eq!(*split.mismatches(), 0);
            assert_eq!(*split.junction_a(), 100);
            assert_eq!(*split.junction_b(), 0);
        }
    }

    #[test]
    fn test_junction_inside_windows() {
        let (ref_a, ref_b) = (random_seq(3, 150), random_seq(4, 150));
        // Junction after ref_a[..90] and before ref_b[40..]
        let read = [&ref_a[55..90], &ref_b[40..105]].concat();

        let aligner = SplitAligner::new(20, 0.05).unwrap();
        let split = aligner.locate_split(&read, &ref_a, &ref_b).unwrap();
        assert_eq!(*split.offset_a(), 35);
        assert_eq!(*split.offset_b(), 65);
        assert_eq!(*split.junction_a(), 90);
        assert_eq!(*split.junction_b(), 40);
        assert_eq!(*split.mismatches(), 0);
        assert_eq!(split.diagonal(), 50);

        // The fixed-junction search can't explain the read
        assert!(aligner.find_split(&read, &ref_a, &ref_b).is_none());
    }

    #[test]
    fn test_mismatches_are_tolerated() {
        let (ref_a, ref_b) = (random_seq(5, 100), random_seq(6, 100));
        let mut read = [&ref_a[60..100], &ref_b[0..60]].concat();
        for pos in [5, 50, 90] {
            read[pos] = if read[pos] == b'A' { b'C' } else { b'A' };
        }

        let split = SplitAligner::new(20, 0.05)
            .unwrap()
            .locate_split(&read, &ref_a, &ref_b)
            .unwrap();
        assert_eq!(*split.offset_a(), 40);
        assert_eq!(*split.mismatches(), 3);

        // 3 mismatches > 0.02 * 100
        let strict = SplitAligner::new(20, 0.02).unwrap();
        assert!(strict.locate_split(&read, &ref_a, &ref_b).is_none());
        assert!(strict.find_split(&read, &ref_a, &ref_b).is_none());
    }

    #[test]
    fn test_unrelated_read() {
        let (ref_a, ref_b) = (random_seq(7, 100), random_seq(8, 100));
        let read = random_seq(9, 100);

        let aligner = SplitAligner::new(20, 0.05).unwrap();
        assert!(aligner.find_split(&read, &ref_a, &ref_b).is_none());
        assert!(aligner.locate_split(&read, &ref_a, &ref_b).is_none());
    }

    #[test]
    fn test_anchor_constraints() {
        let aligner = SplitAligner::new(20, 0.05).unwrap();
        let window = random_seq(10, 100);

        // Too short to leave an anchor on both sides
        let read = window[..39].to_vec();
        assert!(aligner.find_split(&read, &window, &window).is_none());
        assert!(aligner.locate_split(&read, &window, &window).is_none());

        // Windows are shorter than the anchor
        let read = random_seq(11, 60);
        assert!(aligner.find_split(&read, &window[..19], &window).is_none());
        assert!(aligner.locate_split(&read, &window, &window[..19]).is_none());

        // Empty inputs
        assert!(aligner.find_split(b"", &window, &window).is_none());
        assert!(aligner.locate_split(&read, b"", b"").is_none());
    }

    #[test]
    fn test_ties_prefer_midpoint_then_smaller_offset() {
        let aligner = SplitAligner::new(2, 0.0).unwrap();
        let window = b"AAAAAAAAAA";

        let split = aligner.find_split(b"AAAAAAAAAA", window, window).unwrap();
        assert_eq!(*split.offset_a(), 5);

        let split = aligner.find_split(b"AAAAAAAAA", window, window).unwrap();
        assert_eq!(*split.offset_a(), 4);
        assert_eq!(*split.offset_b(), 5);

        let split = aligner.locate_split(b"AAAAAAAAA", window, window).unwrap();
        assert_eq!(*split.offset_a(), 4);
        assert_eq!(*split.junction_a(), 4);
        assert_eq!(*split.junction_b(), 10 - 5);
    }

    #[test]
    fn test_micro_homology() {
        let (x, y) = (random_seq(12, 60), random_seq(13, 60));
        let homology = b"CAG";
        let a = [&x[..], homology].concat();
        let b = [&homology[..], &y[..]].concat();

        // The read can be split anywhere inside the homology without mismatches
        let read = [&x[43..60], homology, &y[..20]].concat();
        assert_eq!(read.len(), 40);

        let aligner = SplitAligner::new(10, 0.0).unwrap();
        let split = aligner.locate_split(&read, &a, &b).unwrap();
        assert_eq!(*split.offset_a(), 20);
        assert_eq!(*split.junction_a(), 63);
        assert_eq!(*split.junction_b(), 3);
        assert_eq!(split.diagonal(), 60);
        assert_eq!(split, aligner.locate_split(&read, &a, &b).unwrap());
    }
}
