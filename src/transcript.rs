use serde::{Deserialize, Serialize};

/// A timed span of transcript text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Spoken text
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new segment with trimmed text
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into().trim().to_string(),
        }
    }
}

/// Where a transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    /// Pre-existing caption track
    Captions,
    /// Speech-to-text inference
    Asr,
}

impl TranscriptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptSource::Captions => "captions",
            TranscriptSource::Asr => "asr",
        }
    }
}

/// Complete result of transcript acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Timed segments in document/temporal order
    pub segments: Vec<TranscriptSegment>,
    /// Provenance of the segments
    pub source: TranscriptSource,
    /// Stable media identifier when one could be read off the URL
    pub video_id: Option<String>,
}
