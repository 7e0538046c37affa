use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, Result};

/// Policy parameters of the estimator.
#[derive(Clone, PartialEq, Debug, Dissolve, Constructor)]
pub struct Config {
    // Reads with more mismatches than this fraction of their length are rejected
    pub max_mismatch_fraction: f64,
    // Minimum anchor on each side of the split, as a fraction of the minimum read length
    pub min_anchor_fraction: f64,
    // Reference windows reach this many standard deviations past the mean fragment length
    pub window_sd_multiplier: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_mismatch_fraction: 0.05,
            min_anchor_fraction: 0.2,
            window_sd_multiplier: 3.0,
        }
    }
}

impl Config {
    pub fn set_max_mismatch_fraction(&mut self, fraction: f64) -> &mut Self {
        self.max_mismatch_fraction = fraction;
        self
    }

    pub fn set_min_anchor_fraction(&mut self, fraction: f64) -> &mut Self {
        self.min_anchor_fraction = fraction;
        self
    }

    pub fn set_window_sd_multiplier(&mut self, multiplier: f64) -> &mut Self {
        self.window_sd_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.max_mismatch_fraction),
            "Maximum mismatch fraction must be within [0, 1], got {}",
            self.max_mismatch_fraction
        );
        ensure!(
            self.min_anchor_fraction > 0.0 && self.min_anchor_fraction <= 0.5,
            "Minimum anchor fraction must be within (0, 0.5], got {}",
            self.min_anchor_fraction
        );
        ensure!(
            self.window_sd_multiplier.is_finite() && self.window_sd_multiplier >= 0.0,
            "Window SD multiplier must be a non-negative number, got {}",
            self.window_sd_multiplier
        );
        Ok(())
    }

    /// Minimum number of bases the read must share with each side of the junction.
    pub fn min_anchor(&self, min_read_length: usize) -> usize {
        ((self.min_anchor_fraction * min_read_length as f64).floor() as usize).max(1)
    }
}

/// Read and fragment length distribution of the sequencing library.
#[derive(Clone, PartialEq, Debug, Dissolve, Constructor)]
pub struct Library {
    pub fragment_length_mean: f64,
    pub fragment_length_sd: f64,
    pub min_read_length: usize,
    pub max_read_length: usize,
}

impl Library {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.fragment_length_mean.is_finite() && self.fragment_length_mean >= 0.0,
            "Fragment length mean must be a non-negative number, got {}",
            self.fragment_length_mean
        );
        ensure!(
            self.fragment_length_sd.is_finite() && self.fragment_length_sd >= 0.0,
            "Fragment length SD must be a non-negative number, got {}",
            self.fragment_length_sd
        );
        ensure!(
            self.min_read_length > 0,
            "Minimum read length must be positive"
        );
        ensure!(
            self.min_read_length <= self.max_read_length,
            "Minimum read length ({}) exceeds the maximum read length ({})",
            self.min_read_length,
            self.max_read_length
        );
        Ok(())
    }

    /// How far past a region the fusion junction can plausibly be.
    pub fn reach(&self, sd_multiplier: f64) -> u64 {
        (self.fragment_length_mean + sd_multiplier * self.fragment_length_sd).ceil() as u64
    }
}
