use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup failures: model assets missing or the engine refusing to
/// load. Reported once; never produced while the request loop is running.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("model directory not found: {0}")]
    MissingModelDir(PathBuf),
    #[error("model file missing: {name} in {dir}")]
    MissingAsset { name: &'static str, dir: PathBuf },
    #[error("failed to load model: {0}")]
    EngineLoad(String),
}

/// Per-request failures. Each one is local to a single request: the loop
/// converts it into an error envelope and keeps reading.
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("audio_file is required")]
    MissingAudioFile,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("transcription failed: {0}")]
    Engine(String),
}
