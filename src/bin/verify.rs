// src/bin/verify.rs
//
// Compare the latest dataset file against what the target table holds.

use anyhow::{Context, Result};
use random_people::{
    dataset::{latest_dataset, list_datasets, Record},
    load::open_warehouse,
    PipelineConfig,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    // 1) Configuration, same sources as the main binary
    let config_path = std::env::var_os("RANDOM_PEOPLE_CONFIG").map(PathBuf::from);
    let cfg = PipelineConfig::load(config_path.as_deref())?.with_overrides(
        std::env::var_os("RANDOM_PEOPLE_DATA_DIR").map(PathBuf::from),
        std::env::var("RANDOM_PEOPLE_PROFILE").ok(),
    );
    let profile = cfg.active_profile()?;
    let table = cfg.target_table()?;

    // 2) Latest file and its data rows
    let archived = list_datasets(&cfg.data_dir)?.len();
    let latest = latest_dataset(&cfg.data_dir)?;
    let mut rdr = csv::Reader::from_path(&latest)
        .with_context(|| format!("opening {}", latest.display()))?;
    let file_rows: Vec<Record> = rdr
        .deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| format!("parsing {}", latest.display()))?;

    // 3) Table contents
    let mut warehouse = open_warehouse(profile)?;
    let table_rows = warehouse.fetch_rows(&table)?;

    // 4) Print summary table
    println!("{: <30} {}", "Data dir", cfg.data_dir.display());
    println!("{: <30} {}", "Files archived", archived);
    println!("{: <30} {}", "Latest file", latest.display());
    println!("{: <30} {}", "Target table", table);
    println!("{:-<55}", "");
    println!("{: <30} {:>10}", "Rows in latest file", file_rows.len());
    println!("{: <30} {:>10}", "Rows in table", table_rows.len());

    if file_rows == table_rows {
        println!("OK: table matches {}", latest.display());
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "table {} does not match {}",
            table,
            latest.display()
        ))
    }
}
