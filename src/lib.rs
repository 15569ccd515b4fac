//! Transcript Search
//!
//! Turns a video's spoken audio (or existing caption tracks) into a
//! timestamped transcript and locates keyword occurrences with surrounding
//! context and time-coded links back to the source media.

pub mod acquisition;
pub mod artifacts;
pub mod captions;
pub mod config;
pub mod media;
pub mod search;
pub mod timestamp;
pub mod transcript;
pub mod transcription;

// Re-export main types for easy access
pub use crate::acquisition::TranscriptAcquirer;
pub use crate::artifacts::{ArtifactStore, MatchRecord};
pub use crate::config::Config;
pub use crate::media::{extract_video_id, MediaProvider, YtDlpCli};
pub use crate::search::{search_transcript, search_transcript_with_window, SearchHit};
pub use crate::timestamp::{display_timestamp, watch_link};
pub use crate::transcript::{TranscriptResult, TranscriptSegment, TranscriptSource};
pub use crate::transcription::{
    FallbackTranscriber, ModelSize, PythonWhisperEngine, TranscriptionEngine, WhisperCppEngine,
};

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types for the transcript pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Recoverable: the acquisition orchestrator falls back to audio
    /// transcription when caption tracks cannot be retrieved or parsed.
    #[error("Caption tracks unavailable: {0}")]
    CaptionsUnavailable(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
