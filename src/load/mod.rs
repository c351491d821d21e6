// src/load/mod.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::{Backend, DatabaseProfile};
use crate::dataset::{latest_dataset, Record, COLUMNS};
use crate::error::PipelineError;

pub mod duck;
pub mod pg;

pub use duck::DuckWarehouse;
pub use pg::PostgresWarehouse;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("static regex")
});

/// A table name that is safe to splice into SQL: `table` or `schema.table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable(String);

impl TargetTable {
    pub fn new(name: impl Into<String>) -> Result<Self, PipelineError> {
        let name = name.into();
        if IDENTIFIER.is_match(&name) {
            Ok(TargetTable(name))
        } else {
            Err(PipelineError::config(format!(
                "`{}` is not a valid table identifier",
                name
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `id, name, age, city`, the positional column list used by every COPY.
    pub fn column_list() -> String {
        COLUMNS.join(", ")
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a finished load left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub file: PathBuf,
    pub rows: u64,
}

/// A database that can hold the people table.
///
/// `replace_from_csv` must clear the table and bulk-copy the file inside one
/// transaction: when the copy fails the previous contents stay in place.
pub trait Warehouse {
    /// `CREATE TABLE IF NOT EXISTS` with the four people columns.
    fn ensure_table(&mut self, table: &TargetTable) -> Result<()>;

    /// Replace the table's rows with the data rows of `csv` (header skipped).
    /// Returns the number of rows copied.
    fn replace_from_csv(&mut self, table: &TargetTable, csv: &Path) -> Result<u64>;

    fn row_count(&mut self, table: &TargetTable) -> Result<u64>;

    /// All rows ordered by `id`.
    fn fetch_rows(&mut self, table: &TargetTable) -> Result<Vec<Record>>;
}

/// Connect to whatever the profile points at.
pub fn open_warehouse(profile: &DatabaseProfile) -> Result<Box<dyn Warehouse>> {
    match &profile.backend {
        Backend::Duckdb { path } => Ok(Box::new(DuckWarehouse::open(path)?)),
        Backend::Postgres { .. } => {
            let url = profile.backend.postgres_url()?;
            Ok(Box::new(PostgresWarehouse::connect(&url)?))
        }
    }
}

/// The `load_csv` task for an explicit file.
#[tracing::instrument(level = "info", skip_all, fields(table = %table, file = %file.display()))]
pub fn load_dataset(
    warehouse: &mut dyn Warehouse,
    table: &TargetTable,
    file: &Path,
) -> Result<LoadReport> {
    // surface a missing file before anything touches the table
    let meta =
        fs::metadata(file).with_context(|| format!("opening dataset {}", file.display()))?;
    if !meta.is_file() {
        anyhow::bail!("dataset {} is not a regular file", file.display());
    }

    let rows = warehouse
        .replace_from_csv(table, file)
        .with_context(|| format!("loading {} into {}", file.display(), table))?;

    info!(rows, "dataset loaded");
    Ok(LoadReport {
        file: file.to_path_buf(),
        rows,
    })
}

/// The `load_csv` task without a handed-over file: pick the latest in `dir`.
///
/// Discovery runs first, so an empty directory fails with
/// [`PipelineError::NoDatasets`] and leaves the table untouched.
pub fn load_latest(
    warehouse: &mut dyn Warehouse,
    table: &TargetTable,
    dir: &Path,
) -> Result<LoadReport> {
    let latest = latest_dataset(dir)?;
    info!(file = %latest.display(), "selected latest dataset");
    load_dataset(warehouse, table, &latest)
}
