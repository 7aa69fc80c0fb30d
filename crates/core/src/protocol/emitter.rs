use std::io::{self, Write};

use serde_json::Value;

use crate::transcription::domain::observer::TranscriptionObserver;
use crate::transcription::domain::segment::Segment;

use super::envelope::{OneShotOutput, Response};

/// Serializes protocol messages to the output stream, one self-contained
/// JSON line per message, flushed immediately so callers see progress as it
/// happens rather than when a buffer fills.
pub struct ResponseWriter<W: Write> {
    out: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, response: &Response) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, response)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    /// One-shot mode: a single bare object, no type tagging.
    pub fn emit_one_shot(&mut self, output: &OneShotOutput) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, output)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Bridges the drain-loop observer to protocol lines for one request,
/// stamping every event with that request's id.
pub struct StreamingObserver<'a, W: Write> {
    writer: &'a mut ResponseWriter<W>,
    id: Value,
}

impl<'a, W: Write> StreamingObserver<'a, W> {
    pub fn new(writer: &'a mut ResponseWriter<W>, id: Value) -> Self {
        Self { writer, id }
    }
}

impl<W: Write> TranscriptionObserver for StreamingObserver<'_, W> {
    fn on_segment(&mut self, segment: &Segment) {
        let line = Response::Segment {
            id: self.id.clone(),
            data: segment.clone(),
        };
        if let Err(e) = self.writer.emit(&line) {
            log::error!("failed to emit segment line: {e}");
        }
    }

    fn on_progress(&mut self, pct: f64) {
        let line = Response::Progress {
            id: self.id.clone(),
            progress_pct: pct,
        };
        if let Err(e) = self.writer.emit(&line) {
            log::error!("failed to emit progress line: {e}");
        }
    }
}
