//! JSONL file writer for chat events.
//!
//! Each chat lifecycle event is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended via a buffered writer. Stream
//! partials are not logged — only turns and loading transitions — so the
//! log stays one line per meaningful event.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use vault_application::ports::notifier::ChatNotifier;

/// A single logged chat event.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatLogEvent {
    Loading { loading: bool },
    Response { text: String },
    StreamEnd,
}

/// JSONL chat logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`. Also
/// usable directly as a [`ChatNotifier`], typically composed with a
/// console notifier.
pub struct JsonlTranscriptLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create chat log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create chat log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a JSON line with a timestamp.
    pub fn log(&self, event: ChatLogEvent) {
        #[derive(Serialize)]
        struct Line<'a> {
            timestamp: String,
            #[serde(flatten)]
            event: &'a ChatLogEvent,
        }

        let line = Line {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event: &event,
        };

        let json = match serde_json::to_string(&line) {
            Ok(j) => j,
            Err(e) => {
                warn!("Could not serialize chat log event: {}", e);
                return;
            }
        };

        let mut writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writeln!(writer, "{}", json) {
            warn!("Could not write chat log line: {}", e);
        }
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writer.flush() {
            warn!("Could not flush chat log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

impl ChatNotifier for JsonlTranscriptLogger {
    fn on_loading(&self, loading: bool) {
        self.log(ChatLogEvent::Loading { loading });
    }

    fn on_response(&self, text: &str) {
        self.log(ChatLogEvent::Response {
            text: text.to_string(),
        });
    }

    fn on_stream_end(&self) {
        self.log(ChatLogEvent::StreamEnd);
    }
}
