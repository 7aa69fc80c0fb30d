use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::shared::constants::ENGINE_SAMPLE_RATE;
use crate::transcription::domain::engine::{SegmentStream, SpeechEngine};
use crate::transcription::domain::error::{StartupError, TranscribeError};
use crate::transcription::domain::options::{Task, TranscriptionConfig};
use crate::transcription::domain::segment::Segment;
use crate::transcription::domain::transcript::TranscriptionInfo;

use super::model_assets::{DeviceConfig, ModelAssets};

/// Speech engine backed by whisper.cpp via whisper-rs.
///
/// The context is built exactly once at startup and held for the process
/// lifetime; each `transcribe` call creates a fresh inference state against
/// it. Calls must be serialized by the caller.
pub struct WhisperEngine {
    ctx: WhisperContext,
    device: DeviceConfig,
}

impl WhisperEngine {
    /// Load the model from a pre-provisioned asset directory.
    pub fn load(model_dir: &Path) -> Result<Self, StartupError> {
        let assets = ModelAssets::resolve(model_dir)?;
        let device = DeviceConfig::from_env();
        log::info!(
            "loading model from {} (device={}, compute_type={})",
            assets.dir().display(),
            device.device,
            device.compute_type
        );

        let weights = assets
            .weights()
            .to_str()
            .ok_or_else(|| {
                StartupError::EngineLoad(format!(
                    "invalid model path: {}",
                    assets.weights().display()
                ))
            })?
            .to_string();

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(device.use_gpu());
        let ctx = WhisperContext::new_with_params(&weights, ctx_params)
            .map_err(|e| StartupError::EngineLoad(format!("{e}")))?;

        Ok(Self { ctx, device })
    }

    pub fn device(&self) -> &DeviceConfig {
        &self.device
    }

    fn build_params<'p>(&self, config: &'p TranscriptionConfig) -> FullParams<'p, 'p> {
        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: config.beam_size as std::os::raw::c_int,
            patience: -1.0,
        });

        if let Some(ref lang) = config.language {
            params.set_language(Some(lang.as_str()));
        }
        params.set_translate(config.task == Task::Translate);
        if !config.initial_prompt.is_empty() {
            params.set_initial_prompt(&config.initial_prompt);
        }
        params.set_no_context(!config.condition_on_previous_text);

        // Confidence floors disabled: a speculative or repeated transcription
        // beats a silently dropped time range.
        params.set_no_speech_thold(1.0);
        params.set_logprob_thold(f32::NEG_INFINITY);
        // whisper.cpp expresses the repetition guard as an entropy threshold;
        // only a caller opting back in tightens it.
        if let Some(thold) = config.compression_ratio_threshold {
            params.set_entropy_thold(thold as f32);
        }

        params.set_token_timestamps(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        params
    }
}

impl SpeechEngine for WhisperEngine {
    fn transcribe(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
    ) -> Result<(SegmentStream<'_>, TranscriptionInfo), TranscribeError> {
        log::debug!(
            "transcribe {} (beam={}, vad {}/{}ms/{}ms)",
            audio.display(),
            config.beam_size,
            config.vad.threshold,
            config.vad.min_silence_ms,
            config.vad.speech_pad_ms
        );

        let samples = load_audio(audio)?;
        let duration = samples.len() as f64 / ENGINE_SAMPLE_RATE as f64;

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscribeError::Engine(format!("failed to create state: {e}")))?;

        let params = self.build_params(config);
        state
            .full(params, &samples)
            .map_err(|e| TranscribeError::Engine(format!("inference failed: {e}")))?;

        let segments = collect_segments(&state);
        let info = TranscriptionInfo {
            // whisper-rs does not surface autodetection metadata, so the
            // configured language is all we can report.
            language: config.language.clone(),
            language_probability: None,
            duration,
        };

        Ok((Box::new(segments.into_iter().map(Ok)), info))
    }
}

fn collect_segments(state: &whisper_rs::WhisperState) -> Vec<Segment> {
    let mut segments = Vec::new();
    let num_segments = state.full_n_segments();

    for seg_idx in 0..num_segments {
        let segment = match state.get_segment(seg_idx) {
            Some(s) => s,
            None => continue,
        };

        let mut text = String::new();
        let mut start_cs: Option<i64> = None;
        let mut end_cs: i64 = 0;

        for tok_idx in 0..segment.n_tokens() {
            let token = match segment.get_token(tok_idx) {
                Some(t) => t,
                None => continue,
            };
            let tok_text = match token.to_str() {
                Ok(t) => t,
                Err(_) => continue,
            };

            // Special tokens ([_BEG_], <|endoftext|>, ...) carry no speech.
            let trimmed = tok_text.trim();
            if trimmed.starts_with('[') || trimmed.starts_with('<') {
                continue;
            }

            let data = token.token_data();
            if start_cs.is_none() {
                start_cs = Some(data.t0);
            }
            end_cs = end_cs.max(data.t1);
            text.push_str(tok_text);
        }

        let Some(start_cs) = start_cs else { continue };
        if text.is_empty() {
            continue;
        }

        // Token timestamps are in centiseconds.
        segments.push(Segment::new(
            start_cs as f64 / 100.0,
            end_cs as f64 / 100.0,
            text,
        ));
    }

    segments
}

/// Decode a WAV file to 16 kHz mono f32.
///
/// Container/codec variety beyond WAV is an upstream collaborator's job;
/// the worker only ever sees pre-extracted audio.
fn load_audio(path: &Path) -> Result<Vec<f32>, TranscribeError> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| TranscribeError::Engine(format!("failed to open audio: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| TranscribeError::Engine(format!("failed to decode audio: {e}")))?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()
                .map_err(|e| TranscribeError::Engine(format!("failed to decode audio: {e}")))?
        }
    };

    let mono: Vec<f32> = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok(resample(&mono, spec.sample_rate, ENGINE_SAMPLE_RATE))
}

/// Nearest-neighbor resample. Adequate for speech recognition input.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return samples.to_vec();
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = (samples.len() as f64 * ratio) as usize;
    (0..new_len)
        .map(|i| {
            let src_idx = (i as f64 / ratio) as usize;
            samples.get(src_idx).copied().unwrap_or(0.0)
        })
        .collect()
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
