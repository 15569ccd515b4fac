pub mod engine;
pub mod whisper;

pub use engine::{FallbackTranscriber, ModelSize, TranscriptionEngine};
pub use whisper::{PythonWhisperEngine, WhisperCppEngine};
