//! Timer-driven ownership of labeling sessions
//!
//! A [`SessionHandle`] is the single owner of one [`LabelingSession`]: every
//! mutation goes through its mutex, and the delayed training-to-processing
//! hop plus the processing tick loop run as one spawned task tied to the
//! handle's [`CancellationToken`].
//!
//! The [`SessionDriver`] keeps the current handle and replaces it on each new
//! query. Replacement cancels the old token and then takes the old lock once,
//! so no scheduled step can mutate the retired session afterwards.
//!
//! Every successful mutation publishes a [`SessionSnapshot`] on a
//! `tokio::sync::watch` channel for renderers to follow. A schedule task that
//! stops before processing completes, by error or panic, closes its handle so
//! followers are released.

use crate::error::{SiftError, SiftResult};
use crate::session::policy::SessionPolicy;
use crate::session::predictor::{Predictor, RandomPredictor};
use crate::session::sample::{Sample, UserLabel};
use crate::session::state::{LabelOutcome, LabelingSession, Phase, TickOutcome};
use crate::session::stats::ProcessingStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Builds a fresh predictor for each new session
pub type PredictorFactory = Box<dyn Fn() -> Box<dyn Predictor> + Send + Sync>;

/// Render-ready copy of a session's visible state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: Uuid,
    /// When the session was created
    pub started_at: DateTime<Utc>,
    /// Query the samples were generated for
    pub query: Option<String>,
    /// Current phase
    pub phase: Phase,
    /// Samples with their labels
    pub samples: Vec<Sample>,
    /// Index of the sample awaiting a label
    pub cursor: usize,
    /// Samples labeled keep or remove
    pub labeled_count: usize,
    /// Processing statistics
    pub stats: ProcessingStats,
}

impl SessionSnapshot {
    fn capture(id: Uuid, started_at: DateTime<Utc>, session: &LabelingSession) -> Self {
        Self {
            session_id: id,
            started_at,
            query: session.query().map(str::to_string),
            phase: session.phase(),
            samples: session.samples().to_vec(),
            cursor: session.cursor(),
            labeled_count: session.labeled_count(),
            stats: *session.stats(),
        }
    }

    /// Sample awaiting a label, if sampling is underway
    pub fn current_sample(&self) -> Option<&Sample> {
        if self.phase == Phase::Sampling {
            self.samples.get(self.cursor)
        } else {
            None
        }
    }

    /// Whether the run reached its terminal state
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Processing && self.stats.is_complete()
    }
}

struct HandleInner {
    id: Uuid,
    started_at: DateTime<Utc>,
    policy: SessionPolicy,
    session: Mutex<LabelingSession>,
    cancellation: CancellationToken,
    updates: watch::Sender<SessionSnapshot>,
}

/// Shared, cancellable owner of one session
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("cancelled", &self.inner.cancellation.is_cancelled())
            .finish()
    }
}

impl SessionHandle {
    /// Wrap a session in a new handle
    pub fn new(session: LabelingSession) -> Self {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let policy = session.policy().clone();
        let (updates, _) = watch::channel(SessionSnapshot::capture(id, started_at, &session));
        Self {
            inner: Arc::new(HandleInner {
                id,
                started_at,
                policy,
                session: Mutex::new(session),
                cancellation: CancellationToken::new(),
                updates,
            }),
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether the session has been replaced, shut down, or its schedule failed
    pub fn is_closed(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Resolves once the handle is closed
    pub async fn closed(&self) {
        self.inner.cancellation.cancelled().await
    }

    /// Current visible state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.inner.session.lock().await;
        SessionSnapshot::capture(self.inner.id, self.inner.started_at, &session)
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Label the sample at the cursor
    ///
    /// Labeling the last sample schedules the training delay and the
    /// processing run.
    ///
    /// # Errors
    ///
    /// - `SiftError::SessionClosed` if the handle was retired
    /// - any error from [`LabelingSession::label_current`]
    pub async fn label(&self, label: UserLabel) -> SiftResult<LabelOutcome> {
        let outcome = self.mutate(|session| session.label_current(label)).await?;
        if outcome == LabelOutcome::SamplingComplete {
            self.schedule_processing();
        }
        Ok(outcome)
    }

    /// Label a sample by id; it must be the current sample
    ///
    /// # Errors
    ///
    /// - `SiftError::SessionClosed` if the handle was retired
    /// - any error from [`LabelingSession::label_sample`]
    pub async fn label_sample(&self, id: &str, label: UserLabel) -> SiftResult<LabelOutcome> {
        let outcome = self
            .mutate(|session| session.label_sample(id, label))
            .await?;
        if outcome == LabelOutcome::SamplingComplete {
            self.schedule_processing();
        }
        Ok(outcome)
    }

    /// Wait for the processing run to finish
    ///
    /// Returns `None` if the session is closed first.
    pub async fn wait_until_complete(&self) -> Option<SessionSnapshot> {
        let mut updates = self.subscribe();
        loop {
            {
                let snapshot = updates.borrow_and_update();
                if snapshot.is_complete() {
                    return Some(snapshot.clone());
                }
            }
            tokio::select! {
                _ = self.closed() => return None,
                changed = updates.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    /// Cancel pending timers and fence off in-flight mutations
    pub async fn close(&self) {
        if self.inner.cancellation.is_cancelled() {
            return;
        }
        self.inner.cancellation.cancel();
        // a step holding the lock finishes before close returns
        let _session = self.inner.session.lock().await;
        tracing::debug!(session_id = %self.inner.id, "Session closed");
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut LabelingSession) -> SiftResult<T>,
    ) -> SiftResult<T> {
        let mut session = self.inner.session.lock().await;
        if self.inner.cancellation.is_cancelled() {
            return Err(SiftError::SessionClosed);
        }
        let result = f(&mut *session)?;
        self.inner.updates.send_replace(SessionSnapshot::capture(
            self.inner.id,
            self.inner.started_at,
            &session,
        ));
        Ok(result)
    }

    fn schedule_processing(&self) {
        let handle = self.clone();
        tokio::spawn(async move { handle.run_schedule().await });
    }

    async fn run_schedule(self) {
        let token = self.inner.cancellation.clone();
        // any exit other than a finished run, including a panic, closes the handle
        let guard = token.clone().drop_guard();
        let session_id = self.inner.id;
        let delay = self.inner.policy.training_delay();
        let period = self.inner.policy.tick_interval();

        tracing::debug!(%session_id, ?delay, "Training scheduled");
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(%session_id, "Training cancelled");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        if let Err(e) = self.mutate(LabelingSession::begin_processing).await {
            log_step_error(session_id, &e);
            return;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(%session_id, "Processing cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.mutate(LabelingSession::tick).await {
                Ok(TickOutcome::Running) => {}
                Ok(TickOutcome::Complete) => {
                    guard.disarm();
                    break;
                }
                Err(e) => {
                    log_step_error(session_id, &e);
                    return;
                }
            }
        }
        tracing::info!(%session_id, "Processing run finished");
    }
}

fn log_step_error(session_id: Uuid, error: &SiftError) {
    match error {
        SiftError::SessionClosed => {
            tracing::debug!(%session_id, "Scheduled step skipped for closed session")
        }
        other => tracing::warn!(%session_id, "Scheduled step failed: {}", other),
    }
}

/// Owner of the current session
///
/// Submitting a query replaces the session wholesale; nothing carries over.
pub struct SessionDriver {
    policy: SessionPolicy,
    predictor_factory: PredictorFactory,
    current: SessionHandle,
}

impl SessionDriver {
    /// Create a driver using the random predictor
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::session::{Phase, SessionDriver, SessionPolicy};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let driver = SessionDriver::new(SessionPolicy::default()).unwrap();
    /// assert_eq!(driver.snapshot().await.phase, Phase::Setup);
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `SiftError::Config` if the policy fails validation.
    pub fn new(policy: SessionPolicy) -> SiftResult<Self> {
        let seed_policy = policy.clone();
        Self::with_predictor_factory(
            policy,
            Box::new(move || -> Box<dyn Predictor> {
                Box::new(RandomPredictor::from_policy(&seed_policy))
            }),
        )
    }

    /// Create a driver with a custom predictor source
    ///
    /// # Errors
    ///
    /// Returns `SiftError::Config` if the policy fails validation.
    pub fn with_predictor_factory(
        policy: SessionPolicy,
        predictor_factory: PredictorFactory,
    ) -> SiftResult<Self> {
        let current = SessionHandle::new(LabelingSession::new(
            policy.clone(),
            predictor_factory(),
        )?);
        Ok(Self {
            policy,
            predictor_factory,
            current,
        })
    }

    /// Handle to the current session
    pub fn current(&self) -> SessionHandle {
        self.current.clone()
    }

    /// Current visible state
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.current.snapshot().await
    }

    /// Start a fresh session for `query`
    ///
    /// The previous session is closed, cancelling any pending training delay
    /// or processing ticks.
    ///
    /// # Errors
    ///
    /// Returns `SiftError::EmptyQuery` for an empty or whitespace query; the
    /// current session is left as it was.
    pub async fn submit_query(&mut self, query: &str) -> SiftResult<SessionHandle> {
        if query.trim().is_empty() {
            return Err(SiftError::EmptyQuery);
        }

        let mut session = LabelingSession::new(self.policy.clone(), (self.predictor_factory)())?;
        session.start(query)?;
        let replacement = SessionHandle::new(session);

        self.current.close().await;
        tracing::info!(
            previous = %self.current.id(),
            session_id = %replacement.id(),
            "Session replaced"
        );
        self.current = replacement;
        Ok(self.current.clone())
    }

    /// Label the current sample of the current session
    ///
    /// # Errors
    ///
    /// See [`SessionHandle::label`].
    pub async fn label(&self, label: UserLabel) -> SiftResult<LabelOutcome> {
        self.current.label(label).await
    }

    /// Label a sample of the current session by id
    ///
    /// # Errors
    ///
    /// See [`SessionHandle::label_sample`].
    pub async fn label_sample(&self, id: &str, label: UserLabel) -> SiftResult<LabelOutcome> {
        self.current.label_sample(id, label).await
    }

    /// Close the current session
    pub async fn shutdown(&self) {
        self.current.close().await;
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.current.inner.cancellation.cancel();
    }
}
