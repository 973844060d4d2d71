//! Labeling session state machine
//!
//! A session moves strictly forward through four phases:
//!
//! ```text
//! setup -> sampling -> training -> processing
//! ```
//!
//! Every operation checks the phase first and returns
//! [`SiftError::PhaseViolation`] without touching state when it is called out
//! of order. Timers live in the driver; this type is purely synchronous.

use crate::error::{SiftError, SiftResult};
use crate::session::policy::SessionPolicy;
use crate::session::predictor::Predictor;
use crate::session::sample::{apply_label, Sample, SampleKind, UserLabel};
use crate::session::stats::ProcessingStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for a query
    Setup,
    /// Samples generated, waiting for labels
    Sampling,
    /// All samples visited, simulated training underway
    Training,
    /// Simulated bulk processing (terminal)
    Processing,
}

impl Phase {
    /// Lowercase phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Sampling => "sampling",
            Self::Training => "training",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of labeling the current sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    /// Cursor moved to the next sample
    Advanced {
        /// New cursor position
        cursor: usize,
    },
    /// The last sample was labeled; the session is now training
    SamplingComplete,
}

/// Result of one processing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// More items remain
    Running,
    /// Every item has been processed
    Complete,
}

/// State of one labeling run
pub struct LabelingSession {
    policy: SessionPolicy,
    predictor: Box<dyn Predictor>,
    phase: Phase,
    query: Option<String>,
    samples: Vec<Sample>,
    cursor: usize,
    labeled_count: usize,
    stats: ProcessingStats,
}

impl fmt::Debug for LabelingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelingSession")
            .field("phase", &self.phase)
            .field("query", &self.query)
            .field("samples", &self.samples.len())
            .field("cursor", &self.cursor)
            .field("labeled_count", &self.labeled_count)
            .field("stats", &self.stats)
            .finish()
    }
}

impl LabelingSession {
    /// Create a session in the setup phase
    ///
    /// # Errors
    ///
    /// Returns `SiftError::Config` if the policy fails
    /// [`SessionPolicy::validate`].
    pub fn new(policy: SessionPolicy, predictor: Box<dyn Predictor>) -> SiftResult<Self> {
        policy.validate()?;
        let stats = ProcessingStats::new(policy.total_items);
        Ok(Self {
            policy,
            predictor,
            phase: Phase::Setup,
            query: None,
            samples: Vec::new(),
            cursor: 0,
            labeled_count: 0,
            stats,
        })
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Query the samples were generated for
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Generated samples in display order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Index of the sample awaiting a label
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Sample awaiting a label, if sampling is underway
    pub fn current_sample(&self) -> Option<&Sample> {
        if self.phase == Phase::Sampling {
            self.samples.get(self.cursor)
        } else {
            None
        }
    }

    /// Number of samples labeled keep or remove
    pub fn labeled_count(&self) -> usize {
        self.labeled_count
    }

    /// Processing statistics
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Policy in effect for this session
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Generate the policy's default number of samples for `query`
    pub fn start(&mut self, query: &str) -> SiftResult<()> {
        self.generate_samples(query, self.policy.sample_count)
    }

    /// Generate `count` samples for `query` and enter sampling
    ///
    /// # Errors
    ///
    /// - `SiftError::EmptyQuery` if the query is empty or whitespace
    /// - `SiftError::InvalidSampleCount` if `count` is zero
    /// - `SiftError::PhaseViolation` outside the setup phase
    ///
    /// The session is unchanged on error.
    pub fn generate_samples(&mut self, query: &str, count: usize) -> SiftResult<()> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Ignoring empty query");
            return Err(SiftError::EmptyQuery);
        }
        self.require(Phase::Setup, "generate samples")?;
        if count == 0 {
            return Err(SiftError::InvalidSampleCount(count));
        }

        let kind = SampleKind::from_query(query);
        let samples = (0..count)
            .map(|index| {
                let prediction = self.predictor.predict(&self.policy);
                Sample {
                    id: Sample::id_for(index),
                    kind,
                    metadata: self.predictor.describe(index, kind),
                    ai_prediction: prediction.verdict,
                    confidence: prediction.confidence,
                    user_label: None,
                }
            })
            .collect();

        self.query = Some(query.to_string());
        self.samples = samples;
        self.cursor = 0;
        self.labeled_count = 0;
        self.phase = Phase::Sampling;

        tracing::info!(query = %query, kind = %kind, count, "Generated samples");
        Ok(())
    }

    /// Label the sample at the cursor
    ///
    /// # Errors
    ///
    /// Returns `SiftError::PhaseViolation` outside the sampling phase,
    /// including after the last sample has been labeled.
    pub fn label_current(&mut self, label: UserLabel) -> SiftResult<LabelOutcome> {
        self.require(Phase::Sampling, "label sample")?;

        self.samples = apply_label(&self.samples, self.cursor, label);
        if label.is_decision() {
            self.labeled_count += 1;
        }
        tracing::debug!(cursor = self.cursor, %label, "Labeled sample");

        if self.cursor + 1 < self.samples.len() {
            self.cursor += 1;
            Ok(LabelOutcome::Advanced {
                cursor: self.cursor,
            })
        } else {
            self.phase = Phase::Training;
            tracing::info!(
                labeled = self.labeled_count,
                samples = self.samples.len(),
                "Sampling complete, training"
            );
            Ok(LabelOutcome::SamplingComplete)
        }
    }

    /// Label a sample addressed by id
    ///
    /// Only the sample at the cursor can be labeled.
    ///
    /// # Errors
    ///
    /// - `SiftError::PhaseViolation` outside the sampling phase
    /// - `SiftError::SampleNotCurrent` if `id` is not the current sample
    pub fn label_sample(&mut self, id: &str, label: UserLabel) -> SiftResult<LabelOutcome> {
        self.require(Phase::Sampling, "label sample")?;
        match self.samples.get(self.cursor) {
            Some(sample) if sample.id == id => self.label_current(label),
            _ => Err(SiftError::SampleNotCurrent(id.to_string())),
        }
    }

    /// Leave training and start the processing run
    ///
    /// # Errors
    ///
    /// Returns `SiftError::PhaseViolation` outside the training phase.
    pub fn begin_processing(&mut self) -> SiftResult<()> {
        self.require(Phase::Training, "start processing")?;
        self.stats = ProcessingStats::at(0, self.policy.total_items, &self.policy);
        self.phase = Phase::Processing;
        tracing::info!(total_items = self.stats.total_items, "Processing started");
        Ok(())
    }

    /// Advance processing by an increment drawn from the predictor
    ///
    /// # Errors
    ///
    /// See [`LabelingSession::advance_by`].
    pub fn tick(&mut self) -> SiftResult<TickOutcome> {
        self.require(Phase::Processing, "advance processing")?;
        if self.stats.is_complete() {
            return Err(SiftError::ProcessingComplete);
        }
        let increment = self.predictor.increment(&self.policy);
        self.advance_by(increment)
    }

    /// Advance processing by an explicit increment
    ///
    /// The processed count is clamped to the total.
    ///
    /// # Errors
    ///
    /// - `SiftError::PhaseViolation` outside the processing phase
    /// - `SiftError::ProcessingComplete` once every item is processed
    pub fn advance_by(&mut self, increment: u64) -> SiftResult<TickOutcome> {
        self.require(Phase::Processing, "advance processing")?;
        if self.stats.is_complete() {
            return Err(SiftError::ProcessingComplete);
        }

        self.stats = self.stats.advanced(increment, &self.policy);
        tracing::trace!(
            processed = self.stats.processed,
            total = self.stats.total_items,
            "Processing tick"
        );

        if self.stats.is_complete() {
            tracing::info!(
                kept = self.stats.kept,
                removed = self.stats.removed,
                "Processing complete"
            );
            Ok(TickOutcome::Complete)
        } else {
            Ok(TickOutcome::Running)
        }
    }

    /// Whether the run reached its terminal state
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Processing && self.stats.is_complete()
    }

    fn require(&self, expected: Phase, operation: &'static str) -> SiftResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SiftError::PhaseViolation {
                operation,
                expected: expected.as_str(),
                actual: self.phase.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::predictor::{Prediction, ScriptedPredictor};
    use crate::session::sample::Verdict;
    use crate::test_utils::assert_error_contains;

    fn session() -> LabelingSession {
        LabelingSession::new(SessionPolicy::default(), Box::new(ScriptedPredictor::new())).unwrap()
    }

    fn session_in_processing(total_items: u64) -> LabelingSession {
        let policy = SessionPolicy {
            sample_count: 1,
            total_items,
            ..Default::default()
        };
        let mut session = LabelingSession::new(policy, Box::new(ScriptedPredictor::new())).unwrap();
        session.start("images").unwrap();
        session.label_current(UserLabel::Keep).unwrap();
        session.begin_processing().unwrap();
        session
    }

    #[test]
    fn test_new_session_is_in_setup() {
        let session = session();
        assert_eq!(session.phase(), Phase::Setup);
        assert!(session.samples().is_empty());
        assert!(session.current_sample().is_none());
    }

    #[test]
    fn test_new_session_rejects_invalid_policy() {
        let policy = SessionPolicy {
            keep_probability: 1.5,
            ..Default::default()
        };
        assert_error_contains(
            LabelingSession::new(policy, Box::new(ScriptedPredictor::new())),
            "keep_probability",
        );

        let policy = SessionPolicy {
            increment_min: 50,
            increment_max: 50,
            ..Default::default()
        };
        assert_error_contains(
            LabelingSession::new(policy, Box::new(ScriptedPredictor::new())),
            "increment_min",
        );
    }

    #[test]
    fn test_generate_samples_enters_sampling() {
        let mut session = session();
        session.generate_samples("street images", 15).unwrap();
        assert_eq!(session.phase(), Phase::Sampling);
        assert_eq!(session.samples().len(), 15);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.query(), Some("street images"));
        assert_eq!(session.current_sample().map(|s| s.id.as_str()), Some("sample-0"));
    }

    #[test]
    fn test_generate_samples_uses_predictor_values() {
        let predictor = ScriptedPredictor::new().with_predictions([
            Prediction {
                verdict: Verdict::Remove,
                confidence: 0.91,
            },
            Prediction {
                verdict: Verdict::Keep,
                confidence: 0.62,
            },
        ]);
        let mut session =
            LabelingSession::new(SessionPolicy::default(), Box::new(predictor)).unwrap();
        session.generate_samples("contract documents", 2).unwrap();

        let samples = session.samples();
        assert_eq!(samples[0].ai_prediction, Verdict::Remove);
        assert_eq!(samples[0].confidence, 0.91);
        assert_eq!(samples[1].ai_prediction, Verdict::Keep);
        assert!(samples.iter().all(|s| s.kind == SampleKind::Document));
        assert_eq!(samples[1].metadata.name, "sample_2.pdf");
    }

    #[test]
    fn test_empty_query_leaves_setup() {
        let mut session = session();
        assert!(matches!(
            session.generate_samples("", 15),
            Err(SiftError::EmptyQuery)
        ));
        assert!(matches!(session.start("   \t"), Err(SiftError::EmptyQuery)));
        assert_eq!(session.phase(), Phase::Setup);
        assert!(session.samples().is_empty());
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut session = session();
        assert!(matches!(
            session.generate_samples("images", 0),
            Err(SiftError::InvalidSampleCount(0))
        ));
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn test_generate_twice_is_phase_violation() {
        let mut session = session();
        session.start("images").unwrap();
        let err = session.start("videos").unwrap_err();
        assert!(matches!(err, SiftError::PhaseViolation { .. }));
        assert_eq!(session.query(), Some("images"));
    }

    #[test]
    fn test_labeled_count_excludes_skips() {
        let mut session = session();
        session.generate_samples("images", 4).unwrap();
        let labels = [
            UserLabel::Keep,
            UserLabel::Skip,
            UserLabel::Remove,
            UserLabel::Skip,
        ];
        for (i, label) in labels.iter().enumerate() {
            let outcome = session.label_current(*label).unwrap();
            if i < 3 {
                assert_eq!(outcome, LabelOutcome::Advanced { cursor: i + 1 });
                assert_eq!(session.phase(), Phase::Sampling);
            } else {
                assert_eq!(outcome, LabelOutcome::SamplingComplete);
            }
        }
        assert_eq!(session.labeled_count(), 2);
        assert_eq!(session.phase(), Phase::Training);
        let recorded: Vec<_> = session.samples().iter().map(|s| s.user_label).collect();
        assert_eq!(recorded, labels.iter().copied().map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_label_after_sampling_is_rejected() {
        let mut session = session();
        session.generate_samples("images", 1).unwrap();
        session.label_current(UserLabel::Keep).unwrap();

        let before: Vec<_> = session.samples().to_vec();
        let err = session.label_current(UserLabel::Remove).unwrap_err();
        assert!(matches!(
            err,
            SiftError::PhaseViolation {
                expected: "sampling",
                actual: "training",
                ..
            }
        ));
        assert_eq!(session.samples(), before.as_slice());
        assert_eq!(session.labeled_count(), 1);
    }

    #[test]
    fn test_label_in_setup_is_rejected() {
        let mut session = session();
        assert!(session.label_current(UserLabel::Keep).is_err());
    }

    #[test]
    fn test_label_sample_by_id() {
        let mut session = session();
        session.generate_samples("images", 3).unwrap();

        assert!(matches!(
            session.label_sample("sample-2", UserLabel::Keep),
            Err(SiftError::SampleNotCurrent(_))
        ));
        assert_eq!(session.cursor(), 0);

        let outcome = session.label_sample("sample-0", UserLabel::Keep).unwrap();
        assert_eq!(outcome, LabelOutcome::Advanced { cursor: 1 });
    }

    #[test]
    fn test_begin_processing_requires_training() {
        let mut session = session();
        assert!(session.begin_processing().is_err());
        session.generate_samples("images", 1).unwrap();
        assert!(session.begin_processing().is_err());
        session.label_current(UserLabel::Skip).unwrap();
        session.begin_processing().unwrap();
        assert_eq!(session.phase(), Phase::Processing);
        assert_eq!(session.stats().processed, 0);
        assert_eq!(session.stats().accuracy, 85.0);
    }

    #[test]
    fn test_tick_before_processing_is_rejected() {
        let mut session = session();
        session.generate_samples("images", 1).unwrap();
        session.label_current(UserLabel::Keep).unwrap();
        assert!(matches!(
            session.tick(),
            Err(SiftError::PhaseViolation { .. })
        ));
    }

    #[test]
    fn test_overshooting_tick_clamps_and_completes() {
        let mut session = session_in_processing(12_450);
        let outcome = session.advance_by(12_450).unwrap();
        assert_eq!(outcome, TickOutcome::Complete);

        let stats = session.stats();
        assert_eq!(stats.processed, 12_450);
        assert_eq!(stats.kept, 8715);
        assert_eq!(stats.removed, 3735);
        assert_eq!(stats.accuracy, 95.0);
        assert!(session.is_complete());
    }

    #[test]
    fn test_tick_after_completion_is_rejected() {
        let mut session = session_in_processing(100);
        session.advance_by(150).unwrap();
        assert!(matches!(session.tick(), Err(SiftError::ProcessingComplete)));
        assert_eq!(session.stats().processed, 100);
        assert_eq!(session.phase(), Phase::Processing);
    }

    #[test]
    fn test_ticks_run_until_exactly_total() {
        let mut session = session_in_processing(100);
        // scripted predictor falls back to increment_min (20)
        let mut ticks = 0;
        while session.tick().unwrap() == TickOutcome::Running {
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(session.stats().processed, 100);
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(Phase::Setup < Phase::Sampling);
        assert!(Phase::Sampling < Phase::Training);
        assert!(Phase::Training < Phase::Processing);
        assert_eq!(Phase::Training.to_string(), "training");
    }
}
