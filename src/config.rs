// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::dag::DagSpec;
use crate::error::PipelineError;
use crate::load::TargetTable;

pub const DEFAULT_DATA_DIR: &str = "random_csvs";
pub const DEFAULT_PROFILE: &str = "local";
pub const DEFAULT_TABLE: &str = "random_people";

/// Where the rows go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
    /// Either `url` inline or `url_env` naming the variable that holds it.
    Postgres {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url_env: Option<String>,
    },
    Duckdb {
        path: PathBuf,
    },
}

impl Backend {
    /// Resolve the connection string of a postgres backend.
    pub fn postgres_url(&self) -> Result<String, PipelineError> {
        match self {
            Backend::Postgres { url: Some(url), .. } => Ok(url.clone()),
            Backend::Postgres {
                url: None,
                url_env: Some(var),
            } => std::env::var(var).map_err(|_| {
                PipelineError::config(format!("environment variable `{}` is not set", var))
            }),
            Backend::Postgres { .. } => Err(PipelineError::config(
                "postgres profile needs `url` or `url_env`",
            )),
            Backend::Duckdb { .. } => Err(PipelineError::config(
                "duckdb profile has no postgres url",
            )),
        }
    }
}

/// A named database target: backend plus the table to replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseProfile {
    #[serde(flatten)]
    pub backend: Backend,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_profiles() -> BTreeMap<String, DatabaseProfile> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        DEFAULT_PROFILE.to_string(),
        DatabaseProfile {
            backend: Backend::Duckdb {
                path: PathBuf::from("random_people.duckdb"),
            },
            table: default_table(),
        },
    );
    profiles
}

fn default_true() -> bool {
    true
}

/// Everything both steps need, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory the generator writes to and the loader reads from.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Key into `profiles`.
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_profiles")]
    pub profiles: BTreeMap<String, DatabaseProfile>,
    /// Issue `CREATE TABLE IF NOT EXISTS` before loading.
    #[serde(default = "default_true")]
    pub create_table: bool,
    #[serde(default)]
    pub dag: DagSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profile: default_profile(),
            profiles: default_profiles(),
            create_table: true,
            dag: DagSpec::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing pipeline config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The file at `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line / environment overrides on top of the file values.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, profile: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(name) = profile {
            self.profile = name;
        }
        self
    }

    pub fn active_profile(&self) -> Result<&DatabaseProfile, PipelineError> {
        self.profiles
            .get(&self.profile)
            .ok_or_else(|| PipelineError::UnknownProfile {
                name: self.profile.clone(),
            })
    }

    pub fn target_table(&self) -> Result<TargetTable, PipelineError> {
        TargetTable::new(self.active_profile()?.table.clone())
    }

    /// Fail fast before any step runs: the data directory must be creatable and
    /// writable, the profile must exist and name a usable table and backend.
    pub fn validate(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            PipelineError::config(format!(
                "cannot create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;
        tempfile::Builder::new()
            .prefix(".write-check")
            .tempfile_in(&self.data_dir)
            .map_err(|e| {
                PipelineError::config(format!(
                    "data directory {} is not writable: {}",
                    self.data_dir.display(),
                    e
                ))
            })?;

        let profile = self.active_profile()?;
        self.target_table()?;
        if let Backend::Postgres { .. } = profile.backend {
            profile.backend.postgres_url()?;
        }
        Ok(())
    }
}
