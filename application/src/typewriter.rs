//! Streaming simulator (typewriter effect)
//!
//! Re-emits an already-complete response as a strictly growing sequence
//! of whitespace-token prefixes, one token per timer tick, for perceived
//! responsiveness. Distinct from true incremental model decoding: the
//! backend used here only returns complete responses.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

/// Default tick interval between token emissions.
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

/// Handle for consuming a simulated stream.
///
/// Wraps an `mpsc::Receiver<String>`; the channel closes after the final
/// (full-text) emission. Dropping the handle stops the producing task on
/// its next send, releasing the timer.
pub struct TypewriterHandle {
    receiver: mpsc::Receiver<String>,
}

impl TypewriterHandle {
    /// Receive the next partial, or `None` once the full text has been
    /// emitted.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Drain the stream, returning the last emitted partial (the
    /// normalized full text), or `None` for an empty stream.
    pub async fn collect_last(mut self) -> Option<String> {
        let mut last = None;
        while let Some(partial) = self.receiver.recv().await {
            last = Some(partial);
        }
        last
    }
}

/// Start a simulated stream over `full_text` with the given tick.
///
/// Tokenization splits on runs of whitespace and newlines, dropping
/// empty tokens. Exactly `tokens.len()` values are emitted — each one
/// token longer than the last, joined by single spaces — after which the
/// channel closes. An empty `full_text` yields a stream that completes
/// immediately with zero emissions.
///
/// Every call is independent: its own timer, its own cursor. Concurrent
/// streams do not interfere.
pub fn simulate(full_text: &str, tick: Duration) -> TypewriterHandle {
    let tokens: Vec<String> = full_text.split_whitespace().map(str::to_string).collect();
    let (tx, rx) = mpsc::channel(1);

    if !tokens.is_empty() {
        tokio::spawn(async move {
            // First emission lands one tick after start, like a periodic
            // timer that fires after its initial period.
            let start = time::Instant::now() + tick;
            let mut interval = time::interval_at(start, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut prefix = String::new();
            for token in tokens {
                interval.tick().await;
                if !prefix.is_empty() {
                    prefix.push(' ');
                }
                prefix.push_str(&token);
                // Consumer dropped the handle; stop and release the timer
                if tx.send(prefix.clone()).await.is_err() {
                    return;
                }
            }
        });
    }

    TypewriterHandle { receiver: rx }
}
