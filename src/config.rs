use crate::model::{DEFAULT_DURATION_MINUTES, SLOTS_PER_DAY};
use crate::storage::{default_database_path, project_dirs};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_BANNER_SECONDS: u64 = 24 * 60 * 60;
const MAX_TICK_SECONDS: u64 = 60 * 60;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub viewport_height: usize,
    pub banner_seconds: u64,
    pub tick_seconds: u64,
    pub default_duration: u32,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            viewport_height: 6,
            banner_seconds: 3,
            tick_seconds: 60,
            default_duration: DEFAULT_DURATION_MINUTES,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `path`, or the per-user config file when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
        Self::parse(&data).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn parse(data: &str) -> Result<Self> {
        let config: Config = if data.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(data)?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_duration == 0 {
            bail!("default_duration must be a positive number of minutes");
        }
        if self.banner_seconds > MAX_BANNER_SECONDS {
            bail!("banner_seconds must be at most {}", MAX_BANNER_SECONDS);
        }
        if self.tick_seconds > MAX_TICK_SECONDS {
            bail!("tick_seconds must be at most {}", MAX_TICK_SECONDS);
        }
        Ok(())
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height.clamp(1, SLOTS_PER_DAY)
    }

    pub fn banner_duration(&self) -> chrono::Duration {
        let secs = self.banner_seconds.min(MAX_BANNER_SECONDS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or_else(chrono::Duration::zero)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.clamp(1, MAX_TICK_SECONDS))
    }

    pub fn database_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        match cli_override.or(self.database.as_deref()) {
            Some(path) => Ok(path.to_path_buf()),
            None => default_database_path(),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("slotplan.log")),
        }
    }
}

fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.yml"))
}
