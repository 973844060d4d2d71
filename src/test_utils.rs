//! Test utilities for Sift
//!
//! This module provides common test helpers: fast session policies,
//! scripted drivers, and assertion helpers.

use crate::error::SiftError;
use crate::session::{Predictor, ScriptedPredictor, SessionDriver, SessionPolicy};

/// Policy with a small dataset for quick runs
///
/// # Arguments
///
/// * `sample_count` - Number of samples per query
/// * `total_items` - Size of the simulated dataset
pub fn fast_policy(sample_count: usize, total_items: u64) -> SessionPolicy {
    SessionPolicy {
        sample_count,
        total_items,
        training_delay_ms: 10,
        tick_interval_ms: 1,
        ..Default::default()
    }
}

/// Driver whose sessions replay the given increments
pub fn scripted_driver(policy: SessionPolicy, increments: Vec<u64>) -> SessionDriver {
    SessionDriver::with_predictor_factory(
        policy,
        Box::new(move || -> Box<dyn Predictor> {
            Box::new(ScriptedPredictor::new().with_increments(increments.clone()))
        }),
    )
    .expect("scripted driver policy must be valid")
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T, SiftError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', got Ok", expected),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Phase, UserLabel};

    #[test]
    fn test_fast_policy_is_valid() {
        assert!(fast_policy(3, 100).validate().is_ok());
    }

    #[test]
    fn test_assert_error_contains_passes() {
        let result: Result<(), SiftError> = Err(SiftError::RuleNotFound("7".to_string()));
        assert_error_contains(result, "Rule not found");
    }

    #[test]
    #[should_panic(expected = "got Ok")]
    fn test_assert_error_contains_panics_on_ok() {
        assert_error_contains(Ok::<(), SiftError>(()), "anything");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_driver_runs_to_completion() {
        let mut driver = scripted_driver(fast_policy(1, 60), vec![25, 25, 25]);
        let handle = driver.submit_query("images").await.unwrap();
        handle.label(UserLabel::Keep).await.unwrap();

        let finished = handle.wait_until_complete().await.unwrap();
        assert_eq!(finished.phase, Phase::Processing);
        assert_eq!(finished.stats.processed, 60);
    }
}
