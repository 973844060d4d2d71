//! Samples shown to the user during the sampling phase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media kind of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Still image
    Image,
    /// Document (PDF and similar)
    Document,
    /// Video clip
    Video,
    /// Audio clip
    Audio,
    /// Plain text
    Text,
}

impl SampleKind {
    /// Derive the kind from a search query by keyword
    ///
    /// Matching is case-insensitive and checks "image", "document" and
    /// "video" in that order. Anything else is treated as images.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::session::SampleKind;
    ///
    /// assert_eq!(SampleKind::from_query("Cat VIDEOS"), SampleKind::Video);
    /// assert_eq!(SampleKind::from_query("sunsets"), SampleKind::Image);
    /// ```
    pub fn from_query(query: &str) -> Self {
        let query = query.to_lowercase();
        if query.contains("image") {
            Self::Image
        } else if query.contains("document") {
            Self::Document
        } else if query.contains("video") {
            Self::Video
        } else {
            Self::Image
        }
    }

    /// Display format name for samples of this kind
    pub fn format(&self) -> &'static str {
        match self {
            Self::Image => "JPEG",
            Self::Document => "PDF",
            Self::Video => "MP4",
            Self::Audio => "MP3",
            Self::Text => "TXT",
        }
    }

    /// File extension for samples of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Document => "pdf",
            Self::Video => "mp4",
            Self::Audio => "mp3",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// Keep/remove decision predicted for a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Keep the item in the cleaned dataset
    Keep,
    /// Drop the item
    Remove,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// Label a user gives to a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLabel {
    /// Keep the item
    Keep,
    /// Remove the item
    Remove,
    /// No decision; does not count as labeled
    Skip,
}

impl UserLabel {
    /// Whether this label counts toward the labeled total
    pub fn is_decision(&self) -> bool {
        !matches!(self, Self::Skip)
    }
}

impl From<Verdict> for UserLabel {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Keep => Self::Keep,
            Verdict::Remove => Self::Remove,
        }
    }
}

impl std::str::FromStr for UserLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep" | "k" => Ok(Self::Keep),
            "remove" | "r" => Ok(Self::Remove),
            "skip" | "s" => Ok(Self::Skip),
            other => Err(format!(
                "Invalid label: {}. Must be one of: keep, remove, skip",
                other
            )),
        }
    }
}

impl fmt::Display for UserLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Remove => write!(f, "remove"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Descriptive fields of a sample, fixed once generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetadata {
    /// File name
    pub name: String,
    /// Human-readable size, e.g. `"240KB"`
    pub size: String,
    /// Format name, e.g. `"JPEG"`
    pub format: String,
    /// Quality tier
    pub quality: String,
    /// Origin of the item
    pub source: String,
}

/// One unit of data awaiting a keep/remove/skip decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Identifier unique within the session
    pub id: String,
    /// Media kind
    pub kind: SampleKind,
    /// Descriptive metadata
    pub metadata: SampleMetadata,
    /// Predicted decision
    pub ai_prediction: Verdict,
    /// Prediction confidence in `[confidence_min, confidence_max)`
    pub confidence: f64,
    /// Label given by the user, if any
    pub user_label: Option<UserLabel>,
}

impl Sample {
    /// Identifier for the sample at `index`
    pub fn id_for(index: usize) -> String {
        format!("sample-{}", index)
    }
}

/// Return a copy of `samples` with the one at `cursor` labeled
///
/// The input is left untouched. A cursor past the end yields an unchanged
/// copy.
///
/// # Examples
///
/// ```
/// use sift::session::{apply_label, UserLabel};
///
/// let labeled = apply_label(&[], 0, UserLabel::Keep);
/// assert!(labeled.is_empty());
/// ```
pub fn apply_label(samples: &[Sample], cursor: usize, label: UserLabel) -> Vec<Sample> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            if i == cursor {
                Sample {
                    user_label: Some(label),
                    ..sample.clone()
                }
            } else {
                sample.clone()
            }
        })
        .collect()
}
