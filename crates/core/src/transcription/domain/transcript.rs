use serde::Serialize;

use super::segment::Segment;

/// Engine-reported metadata for one transcription.
///
/// `language` and `language_probability` are `None` when the engine cannot
/// surface autodetection results; they serialize as null on the wire.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionInfo {
    pub language: Option<String>,
    pub language_probability: Option<f64>,
    pub duration: f64,
}

/// Final outcome of draining one segment sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub language: Option<String>,
    pub language_probability: Option<f64>,
    pub duration: f64,
    pub segments: Vec<Segment>,
    /// Exact concatenation of each segment's text in emission order,
    /// no separator inserted.
    pub text: String,
}

impl TranscriptionResult {
    pub fn new(info: TranscriptionInfo, segments: Vec<Segment>, text: String) -> Self {
        Self {
            language: info.language,
            language_probability: info.language_probability,
            duration: info.duration,
            segments,
            text,
        }
    }
}
