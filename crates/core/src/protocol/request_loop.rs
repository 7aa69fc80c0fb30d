use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::Value;

use crate::pipeline::transcribe_use_case::TranscribeUseCase;
use crate::transcription::domain::engine::SpeechEngine;
use crate::transcription::domain::error::TranscribeError;
use crate::transcription::domain::observer::NullObserver;
use crate::transcription::domain::options::TranscriptionOptions;

use super::emitter::{ResponseWriter, StreamingObserver};
use super::envelope::{OneShotOutput, Request, Response};

/// Server mode: read one request per line until end-of-input.
///
/// Requests are handled strictly sequentially — one engine call runs to
/// completion before the next line is read. A bad line never terminates the
/// loop; it yields an error result and reading continues. Only an I/O
/// failure on the streams themselves ends the loop early.
pub fn run_server(
    engine: &dyn SpeechEngine,
    input: impl BufRead,
    output: impl Write,
) -> io::Result<()> {
    let mut writer = ResponseWriter::new(output);
    log::info!("entering request loop");

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(engine, line, &mut writer);
        writer.emit(&response)?;
    }

    log::info!("input closed, leaving request loop");
    Ok(())
}

/// Handle one non-blank line: every outcome, success or failure, becomes
/// exactly one result envelope carrying the originating id when one could
/// be parsed.
fn handle_line<W: Write>(
    engine: &dyn SpeechEngine,
    line: &str,
    writer: &mut ResponseWriter<W>,
) -> Response {
    // Decode to a raw value first so a later validation failure can still
    // echo the caller's id.
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Response::result_err(Value::Null, format!("invalid request: {e}")),
    };
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    let request: Request = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => return Response::result_err(id, format!("invalid request: {e}")),
    };

    let Some(audio_file) = request.audio_file.filter(|f| !f.is_empty()) else {
        return Response::result_err(id, TranscribeError::MissingAudioFile.to_string());
    };

    let config = request.options.normalize();
    let mut observer = StreamingObserver::new(writer, id.clone());

    match TranscribeUseCase::new(engine).run(
        Path::new(&audio_file),
        &config,
        request.duration,
        &mut observer,
    ) {
        Ok(result) => Response::result_ok(id, result),
        Err(e) => {
            log::warn!("request failed: {e}");
            Response::result_err(id, e.to_string())
        }
    }
}

/// One-shot mode: transcribe a single file with default options and emit
/// exactly one bare JSON object, success or failure.
pub fn run_one_shot(
    engine: &dyn SpeechEngine,
    audio: &Path,
    output: impl Write,
) -> io::Result<()> {
    let mut writer = ResponseWriter::new(output);
    let config = TranscriptionOptions::default().normalize();

    let out = match TranscribeUseCase::new(engine).run(audio, &config, 0.0, &mut NullObserver) {
        Ok(result) => OneShotOutput::Ok(Box::new(result)),
        Err(e) => OneShotOutput::Err {
            error: e.to_string(),
        },
    };
    writer.emit_one_shot(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::domain::engine::SegmentStream;
    use crate::transcription::domain::options::TranscriptionConfig;
    use crate::transcription::domain::segment::Segment;
    use crate::transcription::domain::transcript::TranscriptionInfo;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // ─── Stubs ───

    struct StubEngine {
        segments: Vec<Segment>,
        duration: f64,
        invocations: Arc<Mutex<Vec<(PathBuf, TranscriptionConfig)>>>,
    }

    impl StubEngine {
        fn yielding(segments: Vec<Segment>, duration: f64) -> Self {
            Self {
                segments,
                duration,
                invocations: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SpeechEngine for StubEngine {
        fn transcribe(
            &self,
            audio: &Path,
            config: &TranscriptionConfig,
        ) -> Result<(SegmentStream<'_>, TranscriptionInfo), TranscribeError> {
            self.invocations
                .lock()
                .unwrap()
                .push((audio.to_path_buf(), config.clone()));
            let info = TranscriptionInfo {
                language: Some("en".to_string()),
                language_probability: Some(0.97),
                duration: self.duration,
            };
            Ok((
                Box::new(self.segments.clone().into_iter().map(Ok)),
                info,
            ))
        }
    }

    fn existing_audio() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        std::fs::write(&path, b"riff").unwrap();
        let path = path.to_str().unwrap().to_string();
        (dir, path)
    }

    fn serve(engine: &dyn SpeechEngine, input: &str) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        run_server(engine, Cursor::new(input.to_string()), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    // ─── Tests ───

    #[test]
    fn test_end_to_end_streaming_sequence() {
        let (_dir, path) = existing_audio();
        let engine = StubEngine::yielding(
            vec![Segment::new(0.0, 4.0, "a"), Segment::new(4.0, 9.0, "b")],
            10.0,
        );
        let input = format!(r#"{{"id": 1, "audio_file": "{path}", "duration": 10}}"#);

        let out = serve(&engine, &input);

        let kinds: Vec<&str> = out.iter().map(|v| v["type"].as_str().unwrap()).collect();
        assert_eq!(
            kinds,
            vec!["segment", "progress", "segment", "progress", "result"]
        );
        assert_eq!(out[1]["progress_pct"], 40.0);
        assert_eq!(out[3]["progress_pct"], 90.0);
        assert_eq!(out[4]["result"]["text"], "ab");
        // Every line echoes the originating id; the result is last.
        assert!(out.iter().all(|v| v["id"] == 1));
        let results: Vec<_> = out.iter().filter(|v| v["type"] == "result").collect();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let (_dir, path) = existing_audio();
        let engine = StubEngine::yielding(vec![Segment::new(0.0, 1.0, "x")], 1.0);
        let input = format!("\n  \n{{\"id\": 1, \"audio_file\": \"{path}\"}}\n\n");

        let out = serve(&engine, &input);
        assert_eq!(out.iter().filter(|v| v["type"] == "result").count(), 1);
    }

    #[test]
    fn test_malformed_line_yields_error_with_null_id() {
        let engine = StubEngine::yielding(vec![], 0.0);
        let out = serve(&engine, "this is not json");

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["type"], "result");
        assert!(out[0]["id"].is_null());
        assert!(out[0]["error"].as_str().unwrap().contains("invalid request"));
    }

    #[test]
    fn test_missing_audio_file_preserves_id() {
        let engine = StubEngine::yielding(vec![], 0.0);
        let out = serve(&engine, r#"{"id": "job-9", "duration": 5}"#);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], "job-9");
        assert_eq!(out[0]["error"], "audio_file is required");
        assert!(engine.invocations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_nonexistent_audio_reports_not_found_without_engine_call() {
        let engine = StubEngine::yielding(vec![], 0.0);
        let out = serve(
            &engine,
            r#"{"id": 2, "audio_file": "/nonexistent/a.wav"}"#,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 2);
        assert!(out[0]["error"].as_str().unwrap().contains("file not found"));
        assert!(engine.invocations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line_does_not_poison_the_next() {
        let (_dir, path) = existing_audio();
        let engine = StubEngine::yielding(vec![Segment::new(0.0, 1.0, "ok")], 1.0);
        let input = format!("{{broken\n{{\"id\": 3, \"audio_file\": \"{path}\"}}\n");

        let out = serve(&engine, &input);

        assert_eq!(out.len(), 3); // error result, segment, success result
        assert!(out[0]["id"].is_null());
        assert!(out[0]["error"].is_string());
        assert_eq!(out[2]["id"], 3);
        assert_eq!(out[2]["result"]["text"], "ok");
    }

    #[test]
    fn test_request_options_reach_the_engine() {
        let (_dir, path) = existing_audio();
        let engine = StubEngine::yielding(vec![], 1.0);
        let input = format!(
            r#"{{"id": 1, "audio_file": "{path}", "language": "ja", "task": "translate", "condition_on_previous_text": false}}"#
        );

        serve(&engine, &input);

        let invocations = engine.invocations.lock().unwrap();
        assert_eq!(invocations.len(), 1);
        let config = &invocations[0].1;
        assert_eq!(config.language.as_deref(), Some("ja"));
        assert!(!config.condition_on_previous_text);
    }

    #[test]
    fn test_eof_terminates_cleanly() {
        let engine = StubEngine::yielding(vec![], 0.0);
        let out = serve(&engine, "");
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_shot_success_is_single_bare_object() {
        let (_dir, path) = existing_audio();
        let engine = StubEngine::yielding(
            vec![Segment::new(0.0, 4.0, "a"), Segment::new(4.0, 9.0, "b")],
            10.0,
        );
        let mut out = Vec::new();

        run_one_shot(&engine, Path::new(&path), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        let json: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert!(json.get("type").is_none());
        assert_eq!(json["text"], "ab");
        assert_eq!(json["segments"].as_array().unwrap().len(), 2);
        assert_eq!(json["language"], "en");
    }

    #[test]
    fn test_one_shot_failure_is_bare_error_object() {
        let engine = StubEngine::yielding(vec![], 0.0);
        let mut out = Vec::new();

        run_one_shot(&engine, Path::new("/nonexistent/a.wav"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let json: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert!(json["error"].as_str().unwrap().contains("file not found"));
        assert!(json.get("type").is_none());
    }
}
