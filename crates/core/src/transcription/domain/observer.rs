use super::segment::Segment;

/// Cross-cutting observer for streaming delivery during a drain.
///
/// Decouples the orchestration from the output mechanism: the server wires
/// this to the protocol writer, tests wire it to a recorder. Delivery is
/// synchronous — the orchestrator calls back on its own execution context
/// before consuming the next segment.
pub trait TranscriptionObserver {
    /// A segment finalized. Called once per segment, in order.
    fn on_segment(&mut self, segment: &Segment) {
        let _ = segment;
    }

    /// Progress advanced. `pct` is in [0, 100], strictly greater than any
    /// previously delivered value for this request.
    fn on_progress(&mut self, pct: f64) {
        let _ = pct;
    }
}

/// Observer that discards all events. Used by one-shot mode and by tests
/// that only care about the final result.
pub struct NullObserver;

impl TranscriptionObserver for NullObserver {}
