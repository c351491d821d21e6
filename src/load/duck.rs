use anyhow::{Context, Result};
use duckdb::Connection;
use std::{fs, path::Path};
use tracing::debug;

use super::{TargetTable, Warehouse};
use crate::dataset::Record;

/// Embedded DuckDB target, used for local runs and tests.
pub struct DuckWarehouse {
    conn: Connection,
}

impl DuckWarehouse {
    /// Open a DuckDB database on disk at `path`, creating the file (and its
    /// parent directory) if it doesn't exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening duckdb database {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Open a DuckDB in‐memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory duckdb")?;
        Ok(Self { conn })
    }
}

/// Single quotes doubled for use inside a SQL string literal.
fn sql_literal(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "''")
}

impl Warehouse for DuckWarehouse {
    fn ensure_table(&mut self, table: &TargetTable) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER,
                    name VARCHAR,
                    age INTEGER,
                    city VARCHAR
                );"
            ))
            .with_context(|| format!("creating table {}", table))?;
        Ok(())
    }

    fn replace_from_csv(&mut self, table: &TargetTable, csv: &Path) -> Result<u64> {
        let copy = format!(
            "COPY {table} ({columns}) FROM '{file}' (FORMAT csv, HEADER true, DELIMITER ',');",
            columns = TargetTable::column_list(),
            file = sql_literal(csv),
        );

        // rolled back on drop unless committed
        let tx = self.conn.transaction().context("starting transaction")?;
        tx.execute_batch(&format!("DELETE FROM {table};"))
            .with_context(|| format!("clearing {}", table))?;
        debug!(%table, "cleared");
        tx.execute_batch(&copy)
            .with_context(|| format!("bulk copy into {}", table))?;
        let rows: i64 = tx
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |r| r.get(0))
            .with_context(|| format!("counting rows in {}", table))?;
        tx.commit().context("committing load")?;

        Ok(rows as u64)
    }

    fn row_count(&mut self, table: &TargetTable) -> Result<u64> {
        let rows: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |r| r.get(0))
            .with_context(|| format!("counting rows in {}", table))?;
        Ok(rows as u64)
    }

    fn fetch_rows(&mut self, table: &TargetTable) -> Result<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, name, age, city FROM {table} ORDER BY id;"
            ))
            .with_context(|| format!("preparing select on {}", table))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Record {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    age: row.get(2)?,
                    city: row.get(3)?,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()
            .with_context(|| format!("reading rows from {}", table))?;
        Ok(rows)
    }
}
