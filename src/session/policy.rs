//! Policy constants for a labeling session
//!
//! Every number that shapes sample generation or the processing simulation
//! lives here as a named default and as an overridable field of
//! [`SessionPolicy`]. Derived statistics are asserted exactly in tests, so
//! nothing in the session reaches for a literal.

use crate::error::{SiftError, SiftResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Samples generated per query
pub const DEFAULT_SAMPLE_COUNT: usize = 15;
/// Probability that a generated sample is predicted `keep`
pub const DEFAULT_KEEP_PROBABILITY: f64 = 0.7;
/// Inclusive lower bound of generated confidence
pub const DEFAULT_CONFIDENCE_MIN: f64 = 0.6;
/// Exclusive upper bound of generated confidence
pub const DEFAULT_CONFIDENCE_MAX: f64 = 1.0;
/// Delay between the end of sampling and the start of processing
pub const DEFAULT_TRAINING_DELAY_MS: u64 = 3000;
/// Interval between processing ticks
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;
/// Inclusive lower bound of a processing increment
pub const DEFAULT_INCREMENT_MIN: u64 = 20;
/// Exclusive upper bound of a processing increment
pub const DEFAULT_INCREMENT_MAX: u64 = 70;
/// Share of processed items counted as kept
pub const DEFAULT_KEEP_RATIO: f64 = 0.7;
/// Accuracy reported before any item is processed
pub const DEFAULT_ACCURACY_BASE: f64 = 85.0;
/// Accuracy gained over the full run
pub const DEFAULT_ACCURACY_GAIN: f64 = 10.0;
/// Upper bound on reported accuracy
pub const DEFAULT_ACCURACY_CAP: f64 = 95.0;
/// Size of the simulated dataset
pub const DEFAULT_TOTAL_ITEMS: u64 = 12_450;

/// Overridable policy for sample generation and processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Number of samples generated per query
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Probability of a `keep` prediction
    #[serde(default = "default_keep_probability")]
    pub keep_probability: f64,

    /// Lower bound of prediction confidence (inclusive)
    #[serde(default = "default_confidence_min")]
    pub confidence_min: f64,

    /// Upper bound of prediction confidence (exclusive)
    #[serde(default = "default_confidence_max")]
    pub confidence_max: f64,

    /// Simulated training delay (milliseconds)
    #[serde(default = "default_training_delay_ms")]
    pub training_delay_ms: u64,

    /// Processing tick interval (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Smallest processing increment (inclusive)
    #[serde(default = "default_increment_min")]
    pub increment_min: u64,

    /// Largest processing increment (exclusive)
    #[serde(default = "default_increment_max")]
    pub increment_max: u64,

    /// Ratio of processed items counted as kept
    #[serde(default = "default_keep_ratio")]
    pub keep_ratio: f64,

    /// Accuracy at zero progress
    #[serde(default = "default_accuracy_base")]
    pub accuracy_base: f64,

    /// Accuracy added at full progress
    #[serde(default = "default_accuracy_gain")]
    pub accuracy_gain: f64,

    /// Accuracy ceiling
    #[serde(default = "default_accuracy_cap")]
    pub accuracy_cap: f64,

    /// Items in the simulated dataset
    #[serde(default = "default_total_items")]
    pub total_items: u64,

    /// Optional seed for the random predictor
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

fn default_keep_probability() -> f64 {
    DEFAULT_KEEP_PROBABILITY
}

fn default_confidence_min() -> f64 {
    DEFAULT_CONFIDENCE_MIN
}

fn default_confidence_max() -> f64 {
    DEFAULT_CONFIDENCE_MAX
}

fn default_training_delay_ms() -> u64 {
    DEFAULT_TRAINING_DELAY_MS
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_increment_min() -> u64 {
    DEFAULT_INCREMENT_MIN
}

fn default_increment_max() -> u64 {
    DEFAULT_INCREMENT_MAX
}

fn default_keep_ratio() -> f64 {
    DEFAULT_KEEP_RATIO
}

fn default_accuracy_base() -> f64 {
    DEFAULT_ACCURACY_BASE
}

fn default_accuracy_gain() -> f64 {
    DEFAULT_ACCURACY_GAIN
}

fn default_accuracy_cap() -> f64 {
    DEFAULT_ACCURACY_CAP
}

fn default_total_items() -> u64 {
    DEFAULT_TOTAL_ITEMS
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            keep_probability: default_keep_probability(),
            confidence_min: default_confidence_min(),
            confidence_max: default_confidence_max(),
            training_delay_ms: default_training_delay_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            increment_min: default_increment_min(),
            increment_max: default_increment_max(),
            keep_ratio: default_keep_ratio(),
            accuracy_base: default_accuracy_base(),
            accuracy_gain: default_accuracy_gain(),
            accuracy_cap: default_accuracy_cap(),
            total_items: default_total_items(),
            seed: None,
        }
    }
}

impl SessionPolicy {
    /// Training delay as a [`Duration`]
    pub fn training_delay(&self) -> Duration {
        Duration::from_millis(self.training_delay_ms)
    }

    /// Tick interval as a [`Duration`]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Validate the policy
    ///
    /// # Errors
    ///
    /// Returns `SiftError::Config` naming the first offending field
    pub fn validate(&self) -> SiftResult<()> {
        if self.sample_count == 0 {
            return Err(config_error("session.sample_count must be greater than 0"));
        }

        if self.sample_count > 1000 {
            return Err(config_error(
                "session.sample_count must be less than or equal to 1000",
            ));
        }

        if !(0.0..=1.0).contains(&self.keep_probability) {
            return Err(config_error(
                "session.keep_probability must be between 0.0 and 1.0",
            ));
        }

        let confidence_ok = self.confidence_min >= 0.0
            && self.confidence_max <= 1.0
            && self.confidence_min < self.confidence_max;
        if !confidence_ok {
            return Err(config_error(
                "session.confidence_min must be below confidence_max, both within 0.0 and 1.0",
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(config_error(
                "session.tick_interval_ms must be greater than 0",
            ));
        }

        if self.increment_min == 0 || self.increment_min >= self.increment_max {
            return Err(config_error(
                "session.increment_min must be greater than 0 and below increment_max",
            ));
        }

        if !(0.0..=1.0).contains(&self.keep_ratio) {
            return Err(config_error("session.keep_ratio must be between 0.0 and 1.0"));
        }

        if !(self.accuracy_gain >= 0.0 && self.accuracy_base <= self.accuracy_cap) {
            return Err(config_error(
                "session.accuracy_base must not exceed accuracy_cap and accuracy_gain must be non-negative",
            ));
        }

        if self.total_items == 0 {
            return Err(config_error("session.total_items must be greater than 0"));
        }

        Ok(())
    }
}

fn config_error(message: &str) -> SiftError {
    SiftError::Config(message.to_string())
}
