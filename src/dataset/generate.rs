// src/dataset/generate.rs

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use rand::Rng;
use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::info;

use super::naming::dataset_file_name;
use super::record::generate_records;
use crate::error::PipelineError;

/// Write one dataset file into `dir` (created if missing) and return its path.
///
/// The file is opened with create-new semantics: a second call inside the same
/// second fails with [`PipelineError::DatasetExists`] rather than replacing data.
pub fn write_dataset<R: Rng>(
    dir: &Path,
    generated_at: NaiveDateTime,
    rng: &mut R,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating dataset directory {}", dir.display()))?;

    let path = dir.join(dataset_file_name(generated_at));
    let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(PipelineError::DatasetExists { path }.into());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("creating dataset file {}", path.display())));
        }
    };

    let records = generate_records(rng);
    let mut writer = csv::Writer::from_writer(file);
    for rec in &records {
        writer
            .serialize(rec)
            .with_context(|| format!("writing row {} to {}", rec.id, path.display()))?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing {}: {}", path.display(), e.error()))?;
    file.sync_all()
        .with_context(|| format!("syncing {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "dataset generated");
    Ok(path)
}

/// The `generate_csv` task: thread RNG, local wall-clock time.
#[tracing::instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn generate_dataset(dir: &Path) -> Result<PathBuf> {
    let now = Local::now().naive_local();
    write_dataset(dir, now, &mut rand::thread_rng())
}

/// Write just the `id,name,age,city` header line, for hand-built fixtures.
#[cfg(test)]
pub(crate) fn write_header<W: std::io::Write>(out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(super::record::COLUMNS)?;
    writer.flush()?;
    Ok(())
}
