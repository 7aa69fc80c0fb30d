use serde::{Deserialize, Serialize};

use crate::shared::constants::{BEAM_SIZE, VAD_MIN_SILENCE_MS, VAD_SPEECH_PAD_MS, VAD_THRESHOLD};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    #[default]
    Transcribe,
    Translate,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Transcribe => write!(f, "transcribe"),
            Task::Translate => write!(f, "translate"),
        }
    }
}

/// Caller-supplied overrides, exactly as they appeared on the request line.
///
/// Absence is meaningful for every field: `normalize` is the only place
/// defaults are applied, so an omitted flag and an explicit value stay
/// distinguishable until then.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranscriptionOptions {
    pub language: Option<String>,
    pub task: Task,
    pub initial_prompt: Option<String>,
    pub condition_on_previous_text: Option<bool>,
    pub compression_ratio_threshold: Option<f64>,
}

/// Voice-activity tuning. Fixed constants, not surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VadParams {
    pub threshold: f32,
    pub min_silence_ms: u32,
    pub speech_pad_ms: u32,
}

impl VadParams {
    pub fn tuned() -> Self {
        Self {
            threshold: VAD_THRESHOLD,
            min_silence_ms: VAD_MIN_SILENCE_MS,
            speech_pad_ms: VAD_SPEECH_PAD_MS,
        }
    }
}

/// Canonical transcription configuration handed to the engine.
///
/// The confidence floors are `None` meaning explicitly disabled: the engine
/// must transcribe every time range rather than silently drop one it judges
/// to be noise. `compression_ratio_threshold` stays at the engine default
/// unless the caller opted back in with a concrete value.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionConfig {
    pub beam_size: usize,
    pub language: Option<String>,
    pub task: Task,
    pub initial_prompt: String,
    pub condition_on_previous_text: bool,
    pub vad: VadParams,
    pub no_speech_threshold: Option<f64>,
    pub log_prob_threshold: Option<f64>,
    pub compression_ratio_threshold: Option<f64>,
}

impl TranscriptionOptions {
    /// Map overrides to the canonical configuration. Pure and deterministic:
    /// identical input always yields an identical config.
    pub fn normalize(&self) -> TranscriptionConfig {
        TranscriptionConfig {
            beam_size: BEAM_SIZE,
            language: self.language.clone(),
            task: self.task,
            initial_prompt: self
                .initial_prompt
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_default(),
            // Cross-segment continuity on by default; callers transcribing
            // noisy non-narrative audio send false to stop hallucinated
            // repeats compounding across segments.
            condition_on_previous_text: self.condition_on_previous_text.unwrap_or(true),
            vad: VadParams::tuned(),
            no_speech_threshold: None,
            log_prob_threshold: None,
            compression_ratio_threshold: self.compression_ratio_threshold,
        }
    }
}
