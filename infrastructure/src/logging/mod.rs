//! Chat event logging

mod jsonl;

pub use jsonl::{ChatLogEvent, JsonlTranscriptLogger};
