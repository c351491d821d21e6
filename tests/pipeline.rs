use anyhow::Result;
use random_people::{
    config::{Backend, DatabaseProfile, PipelineConfig},
    dag::{load_task, run_pipeline},
    dataset::{list_datasets, Record, ROWS_PER_FILE},
    load::{open_warehouse, TargetTable},
    PipelineError,
};
use std::{
    fs,
    path::Path,
    thread,
    time::{Duration, Instant},
};
use tempfile::tempdir;

fn local_config(root: &Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::default().with_overrides(Some(root.join("random_csvs")), None);
    cfg.profiles.insert(
        cfg.profile.clone(),
        DatabaseProfile {
            backend: Backend::Duckdb {
                path: root.join("warehouse.duckdb"),
            },
            table: "random_people".into(),
        },
    );
    cfg.dag.retry_delay_secs = 0;
    cfg
}

fn table_rows(cfg: &PipelineConfig) -> Result<Vec<Record>> {
    let mut wh = open_warehouse(cfg.active_profile()?)?;
    wh.fetch_rows(&TargetTable::new("random_people")?)
}

fn file_rows(path: &Path) -> Result<Vec<Record>> {
    let mut rdr = csv::Reader::from_path(path)?;
    Ok(rdr.deserialize().collect::<Result<_, _>>()?)
}

#[test]
fn test_run_generates_and_loads_same_file() -> Result<()> {
    let tmp = tempdir()?;
    let cfg = local_config(tmp.path());
    cfg.validate()?;

    let first = run_pipeline(&cfg)?;
    assert_eq!(first.rows, ROWS_PER_FILE as u64);
    assert_eq!(table_rows(&cfg)?, file_rows(&first.dataset)?);

    // next run lands in a later second and replaces the snapshot
    thread::sleep(Duration::from_millis(1_100));
    let second = run_pipeline(&cfg)?;
    assert_ne!(first.dataset, second.dataset);
    assert!(first.dataset.exists(), "older files are never deleted");
    assert_eq!(list_datasets(&cfg.data_dir)?, vec![first.dataset, second.dataset.clone()]);
    assert_eq!(table_rows(&cfg)?, file_rows(&second.dataset)?);
    Ok(())
}

#[test]
fn test_load_without_file_uses_latest() -> Result<()> {
    let tmp = tempdir()?;
    let cfg = local_config(tmp.path());
    fs::create_dir_all(&cfg.data_dir)?;
    fs::write(
        cfg.data_dir.join("random_data_20250101_100000.csv"),
        "id,name,age,city\n1,Anu,20,NYC\n",
    )?;
    fs::write(
        cfg.data_dir.join("random_data_20250101_120000.csv"),
        "id,name,age,city\n1,Sai,30,Dallas\n",
    )?;

    let report = load_task(&cfg, None)?;
    assert!(report.file.ends_with("random_data_20250101_120000.csv"));
    assert_eq!(
        table_rows(&cfg)?,
        vec![Record {
            id: 1,
            name: "Sai".into(),
            age: 30,
            city: "Dallas".into(),
        }]
    );
    Ok(())
}

#[test]
fn test_load_on_empty_directory_is_not_found() -> Result<()> {
    let tmp = tempdir()?;
    let mut cfg = local_config(tmp.path());
    cfg.dag.retries = 0;
    fs::create_dir_all(&cfg.data_dir)?;

    let err = load_task(&cfg, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoDatasets { .. })
    ));
    // the table was created but never cleared or filled
    assert!(table_rows(&cfg)?.is_empty());
    Ok(())
}

#[test]
fn test_standalone_load_does_not_wait_out_retry_delay() -> Result<()> {
    let tmp = tempdir()?;
    let mut cfg = local_config(tmp.path());
    cfg.dag.retries = 1;
    cfg.dag.retry_delay_secs = 300;
    fs::create_dir_all(&cfg.data_dir)?;

    let started = Instant::now();
    let err = load_task(&cfg, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoDatasets { .. })
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[test]
fn test_unreachable_database_is_an_error() -> Result<()> {
    let tmp = tempdir()?;
    let blocker = tmp.path().join("not_a_dir");
    fs::write(&blocker, "plain file")?;

    let mut cfg = local_config(tmp.path());
    cfg.profiles.insert(
        cfg.profile.clone(),
        DatabaseProfile {
            backend: Backend::Duckdb {
                path: blocker.join("warehouse.duckdb"),
            },
            table: "random_people".into(),
        },
    );
    fs::create_dir_all(&cfg.data_dir)?;
    let dataset = cfg.data_dir.join("random_data_20250101_120000.csv");
    fs::write(&dataset, "id,name,age,city\n1,Sai,30,Dallas\n")?;

    let started = Instant::now();
    assert!(load_task(&cfg, Some(dataset.as_path())).is_err());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(dataset.exists());
    Ok(())
}

#[test]
fn test_unknown_profile_fails_before_any_step() {
    let tmp = tempdir().unwrap();
    let cfg = local_config(tmp.path()).with_overrides(None, Some("postgres_sai".into()));
    assert!(cfg.validate().is_err());
    assert!(load_task(&cfg, None).is_err());
    assert!(!tmp.path().join("warehouse.duckdb").exists());
}
