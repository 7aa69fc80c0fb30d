use std::path::Path;

use crate::transcription::domain::engine::SpeechEngine;
use crate::transcription::domain::error::TranscribeError;
use crate::transcription::domain::observer::TranscriptionObserver;
use crate::transcription::domain::options::TranscriptionConfig;
use crate::transcription::domain::transcript::TranscriptionResult;

/// Orchestrates one transcription against the process-wide engine handle.
///
/// Borrows the handle rather than owning it: the handle outlives every
/// request, and one use case is constructed per request.
pub struct TranscribeUseCase<'a> {
    engine: &'a dyn SpeechEngine,
}

impl<'a> TranscribeUseCase<'a> {
    pub fn new(engine: &'a dyn SpeechEngine) -> Self {
        Self { engine }
    }

    /// Run one transcription to completion.
    ///
    /// `duration_hint` is the caller-supplied total length in seconds;
    /// values <= 0 suppress progress delivery. Progress per request is
    /// strictly increasing, deduplicated, and clamped to 100.0 — the hint
    /// is advisory, so percentages may saturate early or never reach 100
    /// when it diverges from the real audio length.
    pub fn run(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
        duration_hint: f64,
        observer: &mut dyn TranscriptionObserver,
    ) -> Result<TranscriptionResult, TranscribeError> {
        // 1. Fail fast before the engine is ever invoked
        if !audio.exists() {
            return Err(TranscribeError::NotFound(audio.to_path_buf()));
        }

        // 2. One engine call yields the lazy sequence plus metadata
        let (segments, info) = self.engine.transcribe(audio, config)?;

        // 3. Drain exactly once, in order, delivering synchronously as each
        //    segment finalizes
        let mut collected = Vec::new();
        let mut text = String::new();
        let mut last_pct = -1.0f64;

        for segment in segments {
            let segment = segment?;
            text.push_str(&segment.text);
            observer.on_segment(&segment);

            if duration_hint > 0.0 {
                let pct = progress_pct(segment.end, duration_hint);
                if pct > last_pct {
                    last_pct = pct;
                    observer.on_progress(pct);
                }
            }

            collected.push(segment);
        }

        log::debug!(
            "drained {} segments ({} chars) from {}",
            collected.len(),
            text.len(),
            audio.display()
        );

        // 4. Sequence exhausted; hand back the accumulated result
        Ok(TranscriptionResult::new(info, collected, text))
    }
}

/// Percentage of `duration_hint` covered up to `end`, rounded to one
/// decimal place and clamped to 100.0.
fn progress_pct(end: f64, duration_hint: f64) -> f64 {
    let pct = (end / duration_hint * 100.0 * 10.0).round() / 10.0;
    pct.min(100.0)
}
