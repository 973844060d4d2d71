//! Sample labeling and simulated processing
//!
//! [`LabelingSession`] is the synchronous state machine; [`SessionDriver`]
//! owns the current session and runs its timers.

pub mod driver;
pub mod policy;
pub mod predictor;
pub mod sample;
pub mod state;
pub mod stats;

pub use driver::{PredictorFactory, SessionDriver, SessionHandle, SessionSnapshot};
pub use policy::SessionPolicy;
pub use predictor::{Prediction, Predictor, RandomPredictor, ScriptedPredictor};
pub use sample::{apply_label, Sample, SampleKind, SampleMetadata, UserLabel, Verdict};
pub use state::{LabelOutcome, LabelingSession, Phase, TickOutcome};
pub use stats::ProcessingStats;
