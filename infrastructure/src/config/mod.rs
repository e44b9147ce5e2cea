//! Configuration loading

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileModelConfig, FileStreamConfig};
pub use loader::ConfigLoader;
