use std::cmp::Ordering;
use std::thread::available_parallelism;

use eyre::{Result, WrapErr};

// Negative requests count down from the number of available cores: -1 = all, -2 = all but one, ...
fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

/// Number of worker threads to use for the requested amount.
pub fn available(requested: isize) -> Result<usize> {
    let max = available_parallelism()
        .wrap_err("Failed to query the number of available cores")?
        .get() as isize;
    Ok(_normalize(requested, max))
}
