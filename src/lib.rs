//! Sift - sample labeling and simulated AI data cleaning
//!
//! This library models the "AI cleaning" workflow of a dataset curation
//! tool: a batch of samples is generated for a query, the user labels each
//! one, a simulated training delay elapses, and a simulated bulk run counts
//! through the whole dataset.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Labeling state machine, predictor interface, and the timer-driven driver
//! - `rules`: Manual cleaning rules
//! - `sources`: Data source catalog
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `logging`: Tracing subscriber setup
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use sift::session::{SessionDriver, UserLabel};
//! use sift::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut driver = SessionDriver::new(config.session.clone())?;
//!     let handle = driver.submit_query("street images").await?;
//!     while handle.snapshot().await.current_sample().is_some() {
//!         handle.label(UserLabel::Keep).await?;
//!     }
//!     let finished = handle.wait_until_complete().await;
//!     println!("{:?}", finished.map(|s| s.stats));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod rules;
pub mod session;
pub mod sources;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SiftError};
pub use session::{LabelingSession, Phase, SessionDriver};

#[cfg(test)]
pub mod test_utils;
