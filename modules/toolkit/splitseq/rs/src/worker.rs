use derive_getters::Dissolve;
use eyre::{eyre, Result, WrapErr};

use crate::config::Library;
use crate::estimator::FusionEstimator;
use crate::region::RegionPair;
use crate::result::FusionResult;

#[derive(Debug, Default, Dissolve)]
pub struct Worker {
    // (Index of the region pair, result)
    results: Vec<(usize, FusionResult)>,
}

impl Worker {
    pub fn reset(&mut self) {
        self.results.clear();
        self.results.shrink_to_fit();
    }

    /// Evaluate a single region pair. Takes no worker state, the estimator may yield to other
    /// tasks of the pool while it runs.
    pub fn process(
        pair: &RegionPair,
        estimator: &FusionEstimator,
        library: &Library,
    ) -> Result<FusionResult> {
        estimator
            .estimate(pair, library)
            .wrap_err_with(|| format!("Failed to process region pair {}", pair.id()))
    }

    pub fn store(&mut self, ind: usize, result: FusionResult) {
        self.results.push((ind, result));
    }

    /// Gather results from all workers in the order of region pairs.
    pub fn collapse<'a>(
        total: usize,
        workers: impl Iterator<Item = &'a mut Worker>,
    ) -> Result<Vec<FusionResult>> {
        let mut collapsed: Vec<Option<FusionResult>> = vec![None; total];
        for worker in workers {
            for (ind, result) in worker.results.drain(..) {
                collapsed[ind] = Some(result);
            }
        }

        collapsed
            .into_iter()
            .enumerate()
            .map(|(ind, result)| result.ok_or_else(|| eyre!("Region pair #{ind} wasn't processed")))
            .collect()
    }
}
