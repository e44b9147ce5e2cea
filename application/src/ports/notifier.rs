//! Chat notification port
//!
//! Defines the output surface the excluded UI layer consumes: a loading
//! flag, the completed response, and the typewriter partials.
//! Implementations live in the presentation layer (console, mobile UI).

/// Callback surface for chat lifecycle events.
///
/// All methods default to no-ops so implementations only override what
/// they render.
pub trait ChatNotifier: Send + Sync {
    /// Toggled true immediately before a generation request is issued
    /// and false on its completion, success or failure.
    fn on_loading(&self, _loading: bool) {}

    /// Called once with the full response text when generation succeeds.
    fn on_response(&self, _text: &str) {}

    /// Called for each growing-prefix partial from the typewriter.
    fn on_stream_chunk(&self, _partial: &str) {}

    /// Called when the typewriter has emitted the full text.
    fn on_stream_end(&self) {}
}

/// No-op notifier for when no UI is attached.
pub struct NoNotifier;

impl ChatNotifier for NoNotifier {}

/// Fans every event out to multiple notifiers (e.g., console + JSONL
/// transcript log).
pub struct CompositeNotifier {
    notifiers: Vec<std::sync::Arc<dyn ChatNotifier>>,
}

impl CompositeNotifier {
    pub fn new(notifiers: Vec<std::sync::Arc<dyn ChatNotifier>>) -> Self {
        Self { notifiers }
    }
}

impl ChatNotifier for CompositeNotifier {
    fn on_loading(&self, loading: bool) {
        for n in &self.notifiers {
            n.on_loading(loading);
        }
    }

    fn on_response(&self, text: &str) {
        for n in &self.notifiers {
            n.on_response(text);
        }
    }

    fn on_stream_chunk(&self, partial: &str) {
        for n in &self.notifiers {
            n.on_stream_chunk(partial);
        }
    }

    fn on_stream_end(&self) {
        for n in &self.notifiers {
            n.on_stream_end();
        }
    }
}
