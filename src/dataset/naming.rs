// src/dataset/naming.rs

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use glob::{glob, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::PipelineError;

/// strftime layout of the timestamp embedded in every dataset filename.
/// Fixed-width and zero-padded, so name order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const PREFIX: &str = "random_data_";
const EXTENSION: &str = "csv";

static DATASET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^random_data_(\d{8}_\d{6})\.csv$").expect("static regex"));

/// `random_data_<YYYYMMDD>_<HHMMSS>.csv` for the given wall-clock time.
pub fn dataset_file_name(generated_at: NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        PREFIX,
        generated_at.format(TIMESTAMP_FORMAT),
        EXTENSION
    )
}

/// Recover the generation time from a dataset filename.
/// Returns `None` for anything that is not a dataset file.
pub fn parse_generated_at(file_name: &str) -> Option<NaiveDateTime> {
    let caps = DATASET_NAME.captures(file_name)?;
    NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), TIMESTAMP_FORMAT).ok()
}

/// All dataset files in `dir`, sorted by filename ascending.
/// Other files (including stray CSVs) are skipped.
pub fn list_datasets(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        PREFIX,
        EXTENSION
    );

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("invalid glob pattern {}", pattern))? {
        let path = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        if parse_generated_at(&name).is_none() {
            debug!(file = %name, "skipping non-dataset file");
            continue;
        }
        files.push((name, path));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().map(|(_, p)| p).collect())
}

/// The lexicographically last dataset file in `dir`.
///
/// Fails with [`PipelineError::NoDatasets`] when the directory holds none.
pub fn latest_dataset(dir: &Path) -> Result<PathBuf> {
    list_datasets(dir)?.pop().ok_or_else(|| {
        PipelineError::NoDatasets {
            dir: dir.to_path_buf(),
        }
        .into()
    })
}
