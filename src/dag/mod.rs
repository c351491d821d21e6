// src/dag/mod.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod runner;
pub mod state;

pub use runner::{generate_task, load_task, run_pipeline, run_task, RunSummary};
pub use state::TaskState;

/// The two tasks of the workflow, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskId {
    GenerateCsv,
    LoadCsv,
}

impl TaskId {
    pub const ALL: [TaskId; 2] = [TaskId::GenerateCsv, TaskId::LoadCsv];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::GenerateCsv => "generate_csv",
            TaskId::LoadCsv => "load_csv",
        }
    }

    pub fn upstream(&self) -> Option<TaskId> {
        match self {
            TaskId::GenerateCsv => None,
            TaskId::LoadCsv => Some(TaskId::GenerateCsv),
        }
    }
}

/// Scheduler-facing description of the workflow. None of these values change
/// how a step behaves except `retries` / `retry_delay_secs`, which the local
/// `run` command honours too. Standalone `generate` / `load` run once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagSpec {
    pub dag_id: String,
    pub description: String,
    pub owner: String,
    pub schedule: String,
    pub start_date: NaiveDate,
    pub catchup: bool,
    pub depends_on_past: bool,
    pub retries: u32,
    pub retry_delay_secs: u64,
    pub email_on_failure: bool,
    pub email: Vec<String>,
}

impl Default for DagSpec {
    fn default() -> Self {
        Self {
            dag_id: "random_data_to_postgres".into(),
            description: "Generate random CSVs and load into Postgres".into(),
            owner: "data-eng".into(),
            schedule: "@daily".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid start date"),
            catchup: false,
            depends_on_past: false,
            retries: 1,
            retry_delay_secs: 300,
            email_on_failure: true,
            email: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

#[derive(Serialize)]
struct TaskDoc {
    task_id: &'static str,
    upstream: Option<&'static str>,
}

#[derive(Serialize)]
struct DagDoc<'a> {
    #[serde(flatten)]
    spec: &'a DagSpec,
    tasks: Vec<TaskDoc>,
}

impl DagSpec {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    /// Who hears about a failed task, if anyone.
    pub fn failure_recipients(&self) -> &[String] {
        if self.email_on_failure {
            &self.email
        } else {
            &[]
        }
    }

    /// YAML handed to the external scheduler, task graph included.
    pub fn to_yaml(&self) -> Result<String> {
        let doc = DagDoc {
            spec: self,
            tasks: TaskId::ALL
                .iter()
                .map(|t| TaskDoc {
                    task_id: t.as_str(),
                    upstream: t.upstream().map(|u| u.as_str()),
                })
                .collect(),
        };
        serde_yaml::to_string(&doc).context("serializing dag spec")
    }
}
