//! Processing statistics derived from the processed counter

use crate::session::policy::SessionPolicy;
use serde::{Deserialize, Serialize};

/// Counters shown while the simulated bulk run progresses
///
/// Only `processed` carries state; `kept`, `removed` and `accuracy` are
/// recomputed from it on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Items in the dataset, fixed when processing starts
    pub total_items: u64,
    /// Items processed so far, never above `total_items`
    pub processed: u64,
    /// Items counted as kept
    pub kept: u64,
    /// Items counted as removed
    pub removed: u64,
    /// Cosmetic accuracy percentage
    pub accuracy: f64,
}

impl ProcessingStats {
    /// Zeroed statistics for a run over `total_items`
    pub fn new(total_items: u64) -> Self {
        Self {
            total_items,
            processed: 0,
            kept: 0,
            removed: 0,
            accuracy: 0.0,
        }
    }

    /// Statistics for a given processed count
    ///
    /// `processed` is clamped to `total_items`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::session::{ProcessingStats, SessionPolicy};
    ///
    /// let stats = ProcessingStats::at(12_450, 12_450, &SessionPolicy::default());
    /// assert_eq!(stats.kept, 8715);
    /// assert_eq!(stats.removed, 3735);
    /// assert_eq!(stats.accuracy, 95.0);
    /// ```
    pub fn at(processed: u64, total_items: u64, policy: &SessionPolicy) -> Self {
        let processed = processed.min(total_items);
        let kept = kept_for(processed, policy.keep_ratio);
        Self {
            total_items,
            processed,
            kept,
            removed: processed - kept,
            accuracy: accuracy_for(processed, total_items, policy),
        }
    }

    /// Statistics after adding `increment` processed items
    pub fn advanced(&self, increment: u64, policy: &SessionPolicy) -> Self {
        Self::at(
            self.processed.saturating_add(increment),
            self.total_items,
            policy,
        )
    }

    /// Whether every item has been processed
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total_items
    }

    /// Progress as a percentage in `[0, 100]`
    pub fn percent_complete(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.processed as f64 / self.total_items as f64 * 100.0
    }
}

/// Items counted as kept for a processed count
pub fn kept_for(processed: u64, keep_ratio: f64) -> u64 {
    (processed as f64 * keep_ratio).floor() as u64
}

/// Accuracy for a processed count, capped at `policy.accuracy_cap`
pub fn accuracy_for(processed: u64, total_items: u64, policy: &SessionPolicy) -> f64 {
    let progress = if total_items == 0 {
        0.0
    } else {
        processed as f64 / total_items as f64
    };
    (policy.accuracy_base + progress * policy.accuracy_gain).min(policy.accuracy_cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zeroed() {
        let stats = ProcessingStats::new(100);
        assert_eq!(stats.total_items, 100);
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.kept, 0);
        assert_eq!(stats.removed, 0);
        assert!(!stats.is_complete());
    }

    #[test]
    fn test_overshooting_increment_clamps_to_total() {
        let policy = SessionPolicy::default();
        let stats = ProcessingStats::new(12_450).advanced(12_450 + 69, &policy);
        assert_eq!(stats.processed, 12_450);
        assert_eq!(stats.kept, 8715);
        assert_eq!(stats.removed, 3735);
        assert_eq!(stats.accuracy, 95.0);
        assert!(stats.is_complete());
    }

    #[test]
    fn test_accuracy_endpoints() {
        let policy = SessionPolicy::default();
        assert_eq!(accuracy_for(0, 12_450, &policy), 85.0);
        assert_eq!(accuracy_for(12_450, 12_450, &policy), 95.0);
    }

    #[test]
    fn test_accuracy_is_monotonic() {
        let policy = SessionPolicy::default();
        let mut previous = accuracy_for(0, 12_450, &policy);
        for processed in (0..=12_450).step_by(37) {
            let current = accuracy_for(processed, 12_450, &policy);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_accuracy_respects_cap() {
        let policy = SessionPolicy {
            accuracy_gain: 50.0,
            ..Default::default()
        };
        assert_eq!(accuracy_for(50, 100, &policy), 95.0);
    }

    #[test]
    fn test_kept_and_removed_partition_processed() {
        let policy = SessionPolicy::default();
        for processed in [1, 7, 33, 999, 5000] {
            let stats = ProcessingStats::at(processed, 12_450, &policy);
            assert_eq!(stats.kept + stats.removed, processed);
            assert_eq!(stats.kept, (processed as f64 * 0.7).floor() as u64);
        }
    }

    #[test]
    fn test_percent_complete() {
        let stats = ProcessingStats::at(50, 200, &SessionPolicy::default());
        assert_eq!(stats.percent_complete(), 25.0);
    }
}
