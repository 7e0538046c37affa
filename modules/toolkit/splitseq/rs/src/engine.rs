use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use eyre::{eyre, Result};
use rayon::ThreadPool;
use thread_local::ThreadLocal;

use crate::config::Library;
use crate::estimator::FusionEstimator;
use crate::region::RegionPair;
use crate::result::FusionResult;

use super::worker::Worker;

#[derive(Default, Debug)]
pub struct Engine {
    workers: ThreadLocal<RefCell<Worker>>,
}

impl Engine {
    pub fn reset(&mut self) {
        // Soft-reset all workers
        for w in self.workers.iter_mut() {
            w.borrow_mut().reset()
        }
    }

    /// Evaluate all region pairs in the pool, one task per pair. Results follow the order of
    /// `pairs`. The first failure stops the remaining pairs and is reported.
    pub fn run(
        &mut self,
        pool: &mut ThreadPool,
        estimator: &FusionEstimator,
        pairs: &[RegionPair],
        library: &Library,
    ) -> Result<Vec<FusionResult>> {
        self.reset();
        library.validate()?;

        let error_occured = AtomicBool::new(false);
        let errors = Mutex::new(Vec::new());

        let workers = &self.workers;
        pool.scope(|s| {
            for (ind, pair) in pairs.iter().enumerate() {
                // Terminate the loop if an error has occurred in any of the threads
                if error_occured.load(Ordering::Relaxed) {
                    return;
                }

                let (error_occured, errors) = (&error_occured, &errors);
                s.spawn(move |_| {
                    if error_occured.load(Ordering::Relaxed) {
                        return;
                    }

                    // Nested parallelism inside the estimator may run other pairs on this
                    // thread, so the worker is borrowed only to store the result
                    match Worker::process(pair, estimator, library) {
                        Ok(result) => workers.get_or_default().borrow_mut().store(ind, result),
                        Err(err) => {
                            error_occured.store(true, Ordering::Relaxed);
                            log::error!("{:?}", err);
                            if let Ok(mut errors) = errors.lock() {
                                errors.push((ind, err));
                            }
                        }
                    }
                });
            }
        });

        if error_occured.into_inner() {
            let mut errors = errors
                .into_inner()
                .map_err(|_| eyre!("Failed to collect errors of the region pairs"))?;
            errors.sort_by_key(|(ind, _)| *ind);
            return Err(match errors.into_iter().next() {
                Some((_, err)) => err,
                None => eyre!("Fusion estimation failed. See log for details."),
            });
        }

        Worker::collapse(
            pairs.len(),
            self.workers.iter_mut().map(|x| x.get_mut()),
        )
    }
}
