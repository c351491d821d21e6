use std::path::PathBuf;
use thiserror::Error;

/// Conditions callers match on. Everything else travels as a plain `anyhow::Error`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no dataset files found in {}", dir.display())]
    NoDatasets { dir: PathBuf },

    #[error("dataset file already exists: {}", path.display())]
    DatasetExists { path: PathBuf },

    #[error("database profile `{name}` is not defined")]
    UnknownProfile { name: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config {
            message: message.into(),
        }
    }
}
