//! Pluggable prediction source for a labeling session
//!
//! The session never draws random numbers itself. Everything
//! non-deterministic (predicted verdict, confidence, descriptive metadata and
//! processing increments) comes through the [`Predictor`] trait so tests can
//! script exact values.

use crate::session::policy::SessionPolicy;
use crate::session::sample::{SampleKind, SampleMetadata, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

const QUALITY_TIERS: [&str; 3] = ["High", "Medium", "Low"];
const SOURCE_TAGS: [&str; 3] = ["Web Scraping", "User Upload", "API"];

/// Predicted verdict and its confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Keep or remove
    pub verdict: Verdict,
    /// Confidence of the verdict
    pub confidence: f64,
}

/// Source of every non-deterministic value a session needs
pub trait Predictor: Send {
    /// Predict a verdict for the next generated sample
    fn predict(&mut self, policy: &SessionPolicy) -> Prediction;

    /// Produce descriptive metadata for the sample at `index`
    fn describe(&mut self, index: usize, kind: SampleKind) -> SampleMetadata;

    /// Draw the next processing increment
    fn increment(&mut self, policy: &SessionPolicy) -> u64;
}

/// Random predictor backed by a seedable RNG
#[derive(Debug)]
pub struct RandomPredictor {
    rng: StdRng,
}

impl RandomPredictor {
    /// Create a predictor seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible predictor
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::session::{Predictor, RandomPredictor, SessionPolicy};
    ///
    /// let policy = SessionPolicy::default();
    /// let mut a = RandomPredictor::with_seed(7);
    /// let mut b = RandomPredictor::with_seed(7);
    /// assert_eq!(a.predict(&policy), b.predict(&policy));
    /// ```
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a predictor honoring the policy's optional seed
    pub fn from_policy(policy: &SessionPolicy) -> Self {
        match policy.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for RandomPredictor {
    fn predict(&mut self, policy: &SessionPolicy) -> Prediction {
        let verdict = if self.rng.random_bool(policy.keep_probability) {
            Verdict::Keep
        } else {
            Verdict::Remove
        };
        let confidence = self
            .rng
            .random_range(policy.confidence_min..policy.confidence_max);
        Prediction {
            verdict,
            confidence,
        }
    }

    fn describe(&mut self, index: usize, kind: SampleKind) -> SampleMetadata {
        let size_kb = self.rng.random_range(100..600u32);
        let quality = QUALITY_TIERS[self.rng.random_range(0..QUALITY_TIERS.len())];
        let source = SOURCE_TAGS[self.rng.random_range(0..SOURCE_TAGS.len())];
        SampleMetadata {
            name: format!("sample_{}.{}", index + 1, kind.extension()),
            size: format!("{}KB", size_kb),
            format: kind.format().to_string(),
            quality: quality.to_string(),
            source: source.to_string(),
        }
    }

    fn increment(&mut self, policy: &SessionPolicy) -> u64 {
        self.rng
            .random_range(policy.increment_min..policy.increment_max)
    }
}

/// Predictor that replays queued values
///
/// When a queue runs dry the predictor falls back to `keep` at the policy's
/// minimum confidence and the policy's minimum increment.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPredictor {
    predictions: VecDeque<Prediction>,
    increments: VecDeque<u64>,
}

impl ScriptedPredictor {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue predictions in generation order
    pub fn with_predictions(mut self, predictions: impl IntoIterator<Item = Prediction>) -> Self {
        self.predictions.extend(predictions);
        self
    }

    /// Queue processing increments in tick order
    pub fn with_increments(mut self, increments: impl IntoIterator<Item = u64>) -> Self {
        self.increments.extend(increments);
        self
    }
}

impl Predictor for ScriptedPredictor {
    fn predict(&mut self, policy: &SessionPolicy) -> Prediction {
        self.predictions.pop_front().unwrap_or(Prediction {
            verdict: Verdict::Keep,
            confidence: policy.confidence_min,
        })
    }

    fn describe(&mut self, index: usize, kind: SampleKind) -> SampleMetadata {
        SampleMetadata {
            name: format!("sample_{}.{}", index + 1, kind.extension()),
            size: "100KB".to_string(),
            format: kind.format().to_string(),
            quality: QUALITY_TIERS[0].to_string(),
            source: SOURCE_TAGS[0].to_string(),
        }
    }

    fn increment(&mut self, policy: &SessionPolicy) -> u64 {
        self.increments.pop_front().unwrap_or(policy.increment_min)
    }
}
