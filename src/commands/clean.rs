//! `sift clean`: run a labeling session end to end
//!
//! Labels supplied on the command line are applied in order; any samples
//! left over take the AI prediction. The command then follows the session
//! through training and processing and prints a summary.

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::session::{
    Phase, Sample, SessionDriver, SessionHandle, SessionPolicy, SessionSnapshot, UserLabel,
};
use colored::Colorize;

/// Arguments of the clean command
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Search query
    pub query: String,
    /// Labels in sample order
    pub labels: Vec<UserLabel>,
    /// Sample count override
    pub count: Option<usize>,
    /// Predictor seed override
    pub seed: Option<u64>,
    /// Tick interval override (milliseconds)
    pub tick_ms: Option<u64>,
    /// Training delay override (milliseconds)
    pub training_delay_ms: Option<u64>,
    /// Print JSON instead of text
    pub json: bool,
}

impl CleanOptions {
    /// Apply the command-line overrides to a policy
    pub fn apply_to(&self, mut policy: SessionPolicy) -> SessionPolicy {
        if let Some(count) = self.count {
            policy.sample_count = count;
        }
        if let Some(seed) = self.seed {
            policy.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            policy.tick_interval_ms = tick_ms;
        }
        if let Some(delay) = self.training_delay_ms {
            policy.training_delay_ms = delay;
        }
        policy
    }
}

/// Pick a label for every sample
///
/// Explicit labels are used in order; the rest follow the AI prediction.
/// Extra labels are ignored.
pub fn plan_labels(samples: &[Sample], explicit: &[UserLabel]) -> Vec<UserLabel> {
    if explicit.len() > samples.len() {
        tracing::warn!(
            "{} labels given for {} samples; ignoring the extra labels",
            explicit.len(),
            samples.len()
        );
    }
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            explicit
                .get(i)
                .copied()
                .unwrap_or_else(|| sample.ai_prediction.into())
        })
        .collect()
}

/// Run the clean command
///
/// # Errors
///
/// Returns error if the policy is invalid, the query is empty, or the run
/// is interrupted.
pub async fn run_clean(config: Config, options: CleanOptions) -> Result<()> {
    let policy = options.apply_to(config.session);
    let mut driver = SessionDriver::new(policy)?;
    let handle = driver.submit_query(&options.query).await?;
    let snapshot = handle.snapshot().await;
    tracing::info!(session_id = %handle.id(), "Session started");

    if !options.json {
        println!(
            "\n{} {} samples for \"{}\"\n",
            "Sampling".bold(),
            snapshot.samples.len(),
            options.query.trim()
        );
    }

    let labels = plan_labels(&snapshot.samples, &options.labels);
    for (sample, label) in snapshot.samples.iter().zip(labels) {
        if !options.json {
            println!("{}", format_sample_line(sample, label));
        }
        handle.label(label).await?;
    }

    if !options.json {
        println!("\n{}", "Training on your labels...".cyan());
    }

    let finished = tokio::select! {
        finished = follow_progress(&handle, !options.json) => finished,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, shutting down session");
            driver.shutdown().await;
            None
        }
    };
    let finished = finished.ok_or(SiftError::SessionClosed)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&finished).map_err(SiftError::from)?);
    } else {
        print_summary(&finished);
    }
    Ok(())
}

/// Follow a session until processing completes
///
/// Prints a line at each ten percent of progress when `verbose_output` is set.
/// Returns `None` if the session closes before completing.
async fn follow_progress(handle: &SessionHandle, verbose_output: bool) -> Option<SessionSnapshot> {
    let mut updates = handle.subscribe();
    let mut last_bucket = None;
    loop {
        {
            let snapshot = updates.borrow_and_update();
            if snapshot.phase == Phase::Processing && verbose_output {
                let bucket = (snapshot.stats.percent_complete() / 10.0).floor() as u64;
                if last_bucket.map_or(true, |last| bucket > last) {
                    last_bucket = Some(bucket);
                    println!("{}", format_progress_line(&snapshot));
                }
            }
            if snapshot.is_complete() {
                return Some(snapshot.clone());
            }
        }
        tokio::select! {
            _ = handle.closed() => return None,
            changed = updates.changed() => {
                if changed.is_err() {
                    return None;
                }
            }
        }
    }
}

fn format_sample_line(sample: &Sample, label: UserLabel) -> String {
    let label_text = match label {
        UserLabel::Keep => "keep".green(),
        UserLabel::Remove => "remove".red(),
        UserLabel::Skip => "skip".yellow(),
    };
    format!(
        "  {:<10} {:<16} {:>7} {:<7} AI: {:<6} ({:>3.0}%)  -> {}",
        sample.id,
        sample.metadata.name,
        sample.metadata.size,
        sample.metadata.quality,
        sample.ai_prediction.to_string(),
        sample.confidence * 100.0,
        label_text
    )
}

fn format_progress_line(snapshot: &SessionSnapshot) -> String {
    let stats = &snapshot.stats;
    format!(
        "  {:>3.0}%  processed {}/{}  kept {}  removed {}  accuracy {:.1}%",
        stats.percent_complete(),
        stats.processed,
        stats.total_items,
        stats.kept,
        stats.removed,
        stats.accuracy
    )
}

fn print_summary(snapshot: &SessionSnapshot) {
    let stats = &snapshot.stats;
    println!("\n{}", "Cleaning complete".green().bold());
    println!(
        "  Labeled samples: {} of {}",
        snapshot.labeled_count,
        snapshot.samples.len()
    );
    println!("  Items processed: {}", stats.processed);
    println!("  Kept:            {}", stats.kept.to_string().green());
    println!("  Removed:         {}", stats.removed.to_string().red());
    println!("  Accuracy:        {:.1}%", stats.accuracy);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SampleKind, SampleMetadata, Verdict};

    fn sample(index: usize, prediction: Verdict) -> Sample {
        Sample {
            id: Sample::id_for(index),
            kind: SampleKind::Image,
            metadata: SampleMetadata {
                name: format!("sample_{}.jpg", index + 1),
                size: "150KB".to_string(),
                format: "JPEG".to_string(),
                quality: "Low".to_string(),
                source: "API".to_string(),
            },
            ai_prediction: prediction,
            confidence: 0.7,
            user_label: None,
        }
    }

    #[test]
    fn test_plan_labels_falls_back_to_prediction() {
        let samples = vec![
            sample(0, Verdict::Keep),
            sample(1, Verdict::Remove),
            sample(2, Verdict::Keep),
        ];
        let labels = plan_labels(&samples, &[UserLabel::Skip]);
        assert_eq!(
            labels,
            vec![UserLabel::Skip, UserLabel::Remove, UserLabel::Keep]
        );
    }

    #[test]
    fn test_plan_labels_ignores_extra_labels() {
        let samples = vec![sample(0, Verdict::Keep)];
        let labels = plan_labels(&samples, &[UserLabel::Remove, UserLabel::Keep]);
        assert_eq!(labels, vec![UserLabel::Remove]);
    }

    #[test]
    fn test_options_override_policy() {
        let options = CleanOptions {
            query: "images".to_string(),
            count: Some(4),
            seed: Some(11),
            tick_ms: Some(1),
            training_delay_ms: Some(0),
            ..Default::default()
        };
        let policy = options.apply_to(SessionPolicy::default());
        assert_eq!(policy.sample_count, 4);
        assert_eq!(policy.seed, Some(11));
        assert_eq!(policy.tick_interval_ms, 1);
        assert_eq!(policy.training_delay_ms, 0);
        assert_eq!(policy.total_items, 12_450);
    }

    #[test]
    fn test_format_sample_line_includes_metadata() {
        colored::control::set_override(false);
        let line = format_sample_line(&sample(0, Verdict::Remove), UserLabel::Keep);
        assert!(line.contains("sample-0"));
        assert!(line.contains("sample_1.jpg"));
        assert!(line.contains("AI: remove"));
        assert!(line.contains("( 70%)"));
        assert!(line.ends_with("-> keep"));
    }

    #[tokio::test]
    async fn test_run_clean_rejects_empty_query() {
        let options = CleanOptions {
            query: "   ".to_string(),
            json: true,
            ..Default::default()
        };
        let err = run_clean(Config::default(), options).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiftError>(),
            Some(SiftError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_run_clean_rejects_invalid_policy() {
        let mut config = Config::default();
        config.session.keep_probability = 1.5;
        let options = CleanOptions {
            query: "images".to_string(),
            json: true,
            ..Default::default()
        };
        let err = run_clean(config, options).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiftError>(),
            Some(SiftError::Config(_))
        ));
    }
}
