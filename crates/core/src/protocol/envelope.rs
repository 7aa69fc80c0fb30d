use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::transcription::domain::options::TranscriptionOptions;
use crate::transcription::domain::segment::Segment;
use crate::transcription::domain::transcript::TranscriptionResult;

/// One decoded request line.
///
/// `id` is an opaque correlation token echoed verbatim on every response
/// line; callers may send numbers, strings, or nothing (null). The request
/// lives only for the duration of handling its line.
#[derive(Clone, Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub audio_file: Option<String>,
    /// Total audio length in seconds; 0 disables progress reporting.
    #[serde(default, deserialize_with = "lenient_duration")]
    pub duration: f64,
    #[serde(flatten)]
    pub options: TranscriptionOptions,
}

/// Callers have historically sent `duration` as a number, a numeric string,
/// or null; accept all three.
fn lenient_duration<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid duration: {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "invalid duration: {other}"
        ))),
    }
}

/// One server-mode response line, tagged by kind.
///
/// For a given request id, zero or more `progress`/`segment` lines stream
/// out first; exactly one `result` line follows and is always last.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Progress { id: Value, progress_pct: f64 },
    Segment { id: Value, data: Segment },
    Result {
        id: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<Box<TranscriptionResult>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Response {
    pub fn result_ok(id: Value, result: TranscriptionResult) -> Self {
        Response::Result {
            id,
            result: Some(Box::new(result)),
            error: None,
        }
    }

    pub fn result_err(id: Value, message: impl Into<String>) -> Self {
        Response::Result {
            id,
            result: None,
            error: Some(message.into()),
        }
    }
}

/// One-shot mode emits a single bare object: the result fields themselves,
/// or `{"error": ...}` — no type tagging, no streaming events.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OneShotOutput {
    Ok(Box<TranscriptionResult>),
    Err { error: String },
}
