//! Migrator configuration.
//!
//! # Responsibility
//! - Deserialize run settings from an optional TOML file.
//! - Resolve derived locations (logs, checklist, sqlite file).
//!
//! # Invariants
//! - Every field has a default; an empty file equals `MigratorConfig::default()`.
//! - An explicitly requested file must exist.

use crate::hierarchy::checklist::DEFAULT_CHECKLIST_FILE;
use crate::hierarchy::graph::CategoryTags;
use crate::hierarchy::prune::PruneConfig;
use crate::hierarchy::reclassify::{default_rules, ReclassificationRule};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "paravault.toml";
const DEFAULT_OUTPUT_ROOT: &str = "output";
const DEFAULT_SQLITE_FILE: &str = "paravault.db";
const LOG_DIR_NAME: &str = "logs";

/// Backend used for batch snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    /// Directory holding snapshot folders.
    pub output_root: PathBuf,
    /// Checklist file; relative paths live under `output_root`.
    pub checklist_path: PathBuf,
    pub store: StoreKind,
    /// Database file for `store = "sqlite"`; defaults under `output_root`.
    pub sqlite_path: Option<PathBuf>,
    /// Prefix category roots with `1 `..`4 ` in output paths.
    pub ordinal_prefixes: bool,
    pub log_level: Option<String>,
    /// Log directory; defaults to `<output_root>/logs`.
    pub log_dir: Option<PathBuf>,
    pub category_tags: CategoryTags,
    pub prune: PruneConfig,
    /// Ordered reclassification rules; first match wins.
    pub reclassify_rules: Vec<ReclassificationRule>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            checklist_path: PathBuf::from(DEFAULT_CHECKLIST_FILE),
            store: StoreKind::default(),
            sqlite_path: None,
            ordinal_prefixes: true,
            log_level: None,
            log_dir: None,
            category_tags: CategoryTags::default(),
            prune: PruneConfig::default(),
            reclassify_rules: default_rules(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(PathBuf),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "config file `{}` does not exist", path.display()),
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Missing(_) => None,
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl MigratorConfig {
    /// Loads configuration.
    ///
    /// `explicit` must exist. Without it, `paravault.toml` in the working
    /// directory is used when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Missing(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "event=config_load module=config status=ok store={:?} rules={}",
            config.store,
            config.reclassify_rules.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Absolute log directory.
    pub fn resolved_log_dir(&self) -> PathBuf {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| self.output_root.join(LOG_DIR_NAME));
        absolutize(dir)
    }

    pub fn checklist_location(&self) -> PathBuf {
        if self.checklist_path.is_absolute() {
            self.checklist_path.clone()
        } else {
            self.output_root.join(&self.checklist_path)
        }
    }

    pub fn sqlite_location(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.output_root.join(DEFAULT_SQLITE_FILE))
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
