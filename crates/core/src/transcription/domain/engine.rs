use std::path::Path;

use super::error::TranscribeError;
use super::options::TranscriptionConfig;
use super::segment::Segment;
use super::transcript::TranscriptionInfo;

/// The engine's lazy segment sequence. Finite, yielded in non-decreasing
/// start order, and consumable exactly once — it is not restartable, and
/// consuming it is the only way inference proceeds.
pub type SegmentStream<'a> = Box<dyn Iterator<Item = Result<Segment, TranscribeError>> + 'a>;

/// Domain interface for the speech-recognition engine.
///
/// Implementations load their model once at construction and hold it for the
/// process lifetime; `transcribe` must be cheap to call repeatedly against
/// the same handle. Overlapping calls are unsupported — the caller
/// serializes requests.
pub trait SpeechEngine: Send {
    fn transcribe(
        &self,
        audio: &Path,
        config: &TranscriptionConfig,
    ) -> Result<(SegmentStream<'_>, TranscriptionInfo), TranscribeError>;
}
