use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::transcript::TranscriptSegment;
use crate::{PipelineError, Result};

/// Whisper model size: larger is slower but more accurate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
        }
    }
}

impl Default for ModelSize {
    fn default() -> Self {
        ModelSize::Small
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSize {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            other => Err(PipelineError::Configuration(format!(
                "unknown model size: {}",
                other
            ))),
        }
    }
}

/// A speech-to-text engine behind a single call contract
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Transcribe `audio` into timed segments. A missing language hint means
    /// auto-detect.
    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: ModelSize,
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Ordered engine chain: each engine is tried in sequence, first success
/// wins. An engine failure is logged and the next engine takes over; only
/// when every engine has failed does the error surface.
pub struct FallbackTranscriber {
    engines: Vec<Box<dyn TranscriptionEngine>>,
}

impl FallbackTranscriber {
    pub fn new(engines: Vec<Box<dyn TranscriptionEngine>>) -> Self {
        Self { engines }
    }

    /// Default engine order: whisper.cpp first, Python whisper as fallback
    pub fn with_default_engines() -> Self {
        Self::new(vec![
            Box::new(super::whisper::WhisperCppEngine::new()),
            Box::new(super::whisper::PythonWhisperEngine::new()),
        ])
    }

    pub async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: ModelSize,
    ) -> Result<Vec<TranscriptSegment>> {
        if self.engines.is_empty() {
            return Err(PipelineError::Transcription(
                "no transcription engines configured".to_string(),
            ));
        }

        let mut last_error = String::new();
        for engine in &self.engines {
            info!("🎤 Transcribing with {} ({} model)", engine.name(), model_size);
            match engine.transcribe(audio, language, model_size).await {
                Ok(segments) => {
                    info!("✅ {} produced {} segments", engine.name(), segments.len());
                    return Ok(segments);
                }
                Err(e) => {
                    warn!("{} failed: {}", engine.name(), e);
                    last_error = e.to_string();
                }
            }
        }

        Err(PipelineError::Transcription(format!(
            "all engines failed, last error: {}",
            last_error
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubEngine {
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl TranscriptionEngine for StubEngine {
        fn name(&self) -> &str {
            self.name
        }

        async fn transcribe(
            &self,
            _audio: &Path,
            _language: Option<&str>,
            _model_size: ModelSize,
        ) -> Result<Vec<TranscriptSegment>> {
            if self.fail {
                Err(PipelineError::Transcription(format!("{} is down", self.name)))
            } else {
                Ok(vec![TranscriptSegment::new(0.0, 1.0, "ok")])
            }
        }
    }

    #[test]
    fn test_model_size_round_trip() {
        for size in [ModelSize::Tiny, ModelSize::Base, ModelSize::Small, ModelSize::Medium] {
            assert_eq!(size.as_str().parse::<ModelSize>().unwrap(), size);
        }
        assert_eq!("MEDIUM".parse::<ModelSize>().unwrap(), ModelSize::Medium);
    }

    #[test]
    fn test_unknown_model_size_rejected() {
        assert!("large".parse::<ModelSize>().is_err());
        assert!("".parse::<ModelSize>().is_err());
    }

    #[test]
    fn test_fallback_uses_second_engine() {
        tokio_test::block_on(async {
            let transcriber = FallbackTranscriber::new(vec![
                Box::new(StubEngine { name: "primary", fail: true }),
                Box::new(StubEngine { name: "secondary", fail: false }),
            ]);

            let segments = transcriber
                .transcribe(Path::new("audio.m4a"), None, ModelSize::Small)
                .await
                .unwrap();
            assert_eq!(segments.len(), 1);
        });
    }

    #[tokio::test]
    async fn test_all_engines_failing_is_fatal() {
        let transcriber = FallbackTranscriber::new(vec![
            Box::new(StubEngine { name: "primary", fail: true }),
            Box::new(StubEngine { name: "secondary", fail: true }),
        ]);

        let err = transcriber
            .transcribe(Path::new("audio.m4a"), None, ModelSize::Small)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(_)));
        assert!(err.to_string().contains("secondary is down"));
    }

    #[tokio::test]
    async fn test_no_engines_is_fatal() {
        let transcriber = FallbackTranscriber::new(Vec::new());
        let err = transcriber
            .transcribe(Path::new("audio.m4a"), None, ModelSize::Small)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(_)));
    }
}
