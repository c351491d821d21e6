// src/dag/runner.rs

use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    thread,
};
use tracing::{error, info, warn};

use super::{RetryPolicy, TaskId, TaskState};
use crate::config::PipelineConfig;
use crate::dataset::generate_dataset;
use crate::load::{load_dataset, load_latest, open_warehouse, LoadReport};

/// Result of a full Generate → Load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub dataset: PathBuf,
    pub rows: u64,
}

/// Call `step` until it succeeds or `policy` runs out of attempts, sleeping
/// `policy.delay` between attempts. The last error is returned unchanged.
pub fn run_task<T>(
    task: TaskId,
    policy: &RetryPolicy,
    mut step: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match step() {
            Ok(value) => {
                info!(
                    task = task.as_str(),
                    attempt,
                    state = TaskState::Success.as_str(),
                    "task finished"
                );
                return Ok(value);
            }
            Err(e) => match TaskState::after_failure(attempt, attempts) {
                TaskState::UpForRetry => {
                    warn!(
                        task = task.as_str(),
                        attempt,
                        delay = ?policy.delay,
                        error = %format!("{:#}", e),
                        state = TaskState::UpForRetry.as_str(),
                        "task failed; retrying"
                    );
                    thread::sleep(policy.delay);
                    attempt += 1;
                }
                _ => return Err(e),
            },
        }
    }
}

/// Log the terminal failure of `task` with the configured recipients.
fn report_failure(cfg: &PipelineConfig, task: TaskId, err: &anyhow::Error) {
    error!(
        task = task.as_str(),
        dag = %cfg.dag.dag_id,
        recipients = ?cfg.dag.failure_recipients(),
        state = TaskState::Failed.as_str(),
        "task failed: {:#}",
        err
    );
}

fn generate_once(cfg: &PipelineConfig) -> Result<PathBuf> {
    generate_dataset(&cfg.data_dir)
}

/// One load attempt on its own connection, dropped before returning.
fn load_once(cfg: &PipelineConfig, file: Option<&Path>) -> Result<LoadReport> {
    let profile = cfg.active_profile()?;
    let table = cfg.target_table()?;
    let mut warehouse = open_warehouse(profile)?;
    if cfg.create_table {
        warehouse.ensure_table(&table)?;
    }
    match file {
        Some(path) => load_dataset(&mut *warehouse, &table, path),
        None => load_latest(&mut *warehouse, &table, &cfg.data_dir),
    }
}

/// `generate_csv`, a single attempt. Retries belong to whoever schedules it.
pub fn generate_task(cfg: &PipelineConfig) -> Result<PathBuf> {
    generate_once(cfg).map_err(|e| {
        report_failure(cfg, TaskId::GenerateCsv, &e);
        e
    })
}

/// `load_csv`, a single attempt. Loads `file` when given, otherwise the
/// latest dataset in the data directory.
pub fn load_task(cfg: &PipelineConfig, file: Option<&Path>) -> Result<LoadReport> {
    load_once(cfg, file).map_err(|e| {
        report_failure(cfg, TaskId::LoadCsv, &e);
        e
    })
}

/// Generate, then load exactly the file that was generated. Each task gets
/// the DAG's retry policy, since no scheduler sits between them here.
#[tracing::instrument(level = "info", skip_all, fields(dag = %cfg.dag.dag_id))]
pub fn run_pipeline(cfg: &PipelineConfig) -> Result<RunSummary> {
    let policy = cfg.dag.retry_policy();

    let dataset = run_task(TaskId::GenerateCsv, &policy, || generate_once(cfg)).map_err(|e| {
        report_failure(cfg, TaskId::GenerateCsv, &e);
        e
    })?;
    let report = run_task(TaskId::LoadCsv, &policy, || {
        load_once(cfg, Some(dataset.as_path()))
    })
    .map_err(|e| {
        report_failure(cfg, TaskId::LoadCsv, &e);
        e
    })?;

    Ok(RunSummary {
        dataset: report.file,
        rows: report.rows,
    })
}
