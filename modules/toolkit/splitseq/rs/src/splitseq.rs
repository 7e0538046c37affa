use eyre::Result;
use rayon::ThreadPool;

use crate::config::Library;
use crate::engine::Engine;
use crate::estimator::FusionEstimator;
use crate::region::RegionPair;
use crate::result::FusionResult;

/// Batch interface: collects region pairs and evaluates them in a thread pool.
pub struct SplitSeq {
    pool: ThreadPool,
    engine: Engine,
    estimator: FusionEstimator,
    pairs: Vec<RegionPair>,
}

impl SplitSeq {
    pub fn new(pool: ThreadPool, estimator: FusionEstimator) -> Self {
        Self {
            pool,
            engine: Engine::default(),
            estimator,
            pairs: Vec::new(),
        }
    }

    pub fn add_pair(&mut self, pair: RegionPair) -> &mut Self {
        self.pairs.push(pair);
        self
    }

    pub fn add_pairs(&mut self, pairs: impl IntoIterator<Item = RegionPair>) -> &mut Self {
        self.pairs.extend(pairs);
        self
    }

    pub fn pairs(&self) -> &[RegionPair] {
        &self.pairs
    }

    pub fn estimator(&self) -> &FusionEstimator {
        &self.estimator
    }

    pub fn reset(&mut self) {
        self.pairs.clear();
        self.engine.reset();
    }

    pub fn run(&mut self, library: &Library) -> Result<Vec<FusionResult>> {
        let pairs = std::mem::take(&mut self.pairs);
        let result = self
            .engine
            .run(&mut self.pool, &self.estimator, &pairs, library);
        self.reset();

        result
    }
}
