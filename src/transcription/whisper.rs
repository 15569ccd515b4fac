use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use super::engine::{ModelSize, TranscriptionEngine};
use crate::transcript::TranscriptSegment;
use crate::{PipelineError, Result};

/// whisper.cpp command-line engine. Probes for `whisper-cli` (current binary
/// name) and falls back to the older `whisper-cpp` name.
pub struct WhisperCppEngine {
    /// Directory holding `ggml-<size>.bin` model files
    model_dir: PathBuf,
    /// Worker threads
    threads: u32,
}

impl WhisperCppEngine {
    pub fn new() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            threads: 4,
        }
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    async fn resolve_command() -> Option<&'static str> {
        for cmd_name in ["whisper-cli", "whisper-cpp"] {
            if check_command_available(cmd_name).await {
                return Some(cmd_name);
            }
        }
        None
    }
}

impl Default for WhisperCppEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionEngine for WhisperCppEngine {
    fn name(&self) -> &str {
        "whisper.cpp"
    }

    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: ModelSize,
    ) -> Result<Vec<TranscriptSegment>> {
        let Some(program) = Self::resolve_command().await else {
            return Err(PipelineError::Transcription(
                "no whisper.cpp binary on PATH".to_string(),
            ));
        };

        let scratch = TempDir::new()?;
        let out_base = scratch.path().join("transcript");
        let model_path = self.model_dir.join(format!("ggml-{}.bin", model_size));

        let mut cmd = Command::new(program);
        cmd.arg("-f")
            .arg(audio)
            .arg("-oj")
            .arg("-of")
            .arg(&out_base)
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("-m")
            .arg(&model_path);
        if let Some(language) = language {
            cmd.arg("-l").arg(language);
        }

        debug!("Running {}: {:?}", program, cmd);
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(PipelineError::Transcription(format!(
                "{} exited with {}",
                program, output.status
            )));
        }

        let json = tokio::fs::read_to_string(out_base.with_extension("json")).await?;
        parse_cpp_output(&json)
    }
}

/// Python OpenAI Whisper command-line engine
pub struct PythonWhisperEngine {
    program: String,
}

impl PythonWhisperEngine {
    pub fn new() -> Self {
        Self {
            program: "whisper".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for PythonWhisperEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionEngine for PythonWhisperEngine {
    fn name(&self) -> &str {
        "openai-whisper"
    }

    async fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: ModelSize,
    ) -> Result<Vec<TranscriptSegment>> {
        if !check_command_available(&self.program).await {
            return Err(PipelineError::Transcription(format!(
                "{} not available",
                self.program
            )));
        }

        let scratch = TempDir::new()?;
        let mut cmd = Command::new(&self.program);
        cmd.arg(audio)
            .arg("--model")
            .arg(model_size.as_str())
            .arg("--output_dir")
            .arg(scratch.path())
            .arg("--output_format")
            .arg("json")
            .arg("--verbose")
            .arg("False")
            .arg("--fp16")
            .arg("False")
            .arg("--temperature")
            .arg("0.0");
        if let Some(language) = language {
            cmd.arg("--language").arg(language);
        }

        debug!("Running {}: {:?}", self.program, cmd);
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(PipelineError::Transcription(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        // Output JSON is named after the audio file stem
        let stem = audio.file_stem().unwrap_or_default();
        let json_path = scratch.path().join(stem).with_extension("json");
        let json = tokio::fs::read_to_string(&json_path).await?;
        parse_python_output(&json)
    }
}

async fn check_command_available(cmd_name: &str) -> bool {
    Command::new(cmd_name)
        .arg("--help")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// whisper.cpp JSON output (`-oj`)
#[derive(Debug, Deserialize)]
struct CppOutput {
    #[serde(default)]
    transcription: Vec<CppSegment>,
}

#[derive(Debug, Deserialize)]
struct CppSegment {
    timestamps: CppTimestamps,
    text: String,
}

#[derive(Debug, Deserialize)]
struct CppTimestamps {
    from: String,
    to: String,
}

fn parse_cpp_output(json: &str) -> Result<Vec<TranscriptSegment>> {
    let output: CppOutput = serde_json::from_str(json)?;
    let mut segments = Vec::with_capacity(output.transcription.len());
    for seg in output.transcription {
        let start = parse_clock_timestamp(&seg.timestamps.from)?;
        let end = parse_clock_timestamp(&seg.timestamps.to)?;
        segments.push(TranscriptSegment::new(start, end, seg.text));
    }
    Ok(segments)
}

/// Python whisper JSON output (`--output_format json`)
#[derive(Debug, Deserialize)]
struct PythonOutput {
    #[serde(default)]
    segments: Vec<PythonSegment>,
}

#[derive(Debug, Deserialize)]
struct PythonSegment {
    start: f64,
    end: f64,
    text: String,
}

fn parse_python_output(json: &str) -> Result<Vec<TranscriptSegment>> {
    let output: PythonOutput = serde_json::from_str(json)?;
    Ok(output
        .segments
        .into_iter()
        .map(|seg| TranscriptSegment::new(seg.start, seg.end, seg.text))
        .collect())
}

/// Parse a `HH:MM:SS,mmm` clock timestamp into seconds
fn parse_clock_timestamp(timestamp: &str) -> Result<f64> {
    let invalid = || PipelineError::Transcription(format!("invalid timestamp: {}", timestamp));

    let (clock, millis) = timestamp.split_once(',').ok_or_else(invalid)?;
    let fields: Vec<&str> = clock.split(':').collect();
    if fields.len() != 3 {
        return Err(invalid());
    }

    let hours: f64 = fields[0].parse().map_err(|_| invalid())?;
    let minutes: f64 = fields[1].parse().map_err(|_| invalid())?;
    let seconds: f64 = fields[2].parse().map_err(|_| invalid())?;
    let millis: f64 = millis.parse().map_err(|_| invalid())?;

    Ok(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}
