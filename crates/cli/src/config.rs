//! Settings resolution: CLI flag, then environment, then `grantscope.toml`,
//! then built-in defaults.

use anyhow::{Context as AnyhowContext, Result};
use grantscope_protocol::{PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "grantscope.toml";
pub const CONFIG_ENV: &str = "GRANTSCOPE_CONFIG";
pub const DATA_ENV: &str = "GRANTSCOPE_DATA";
pub const DEFAULT_DATA_PATH: &str = "grantscope-records.json";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    data_path: Option<PathBuf>,
    default_per_page: Option<usize>,
    max_per_page: Option<usize>,
    refresh_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl Paging {
    pub fn request(&self, page: Option<usize>, per_page: Option<usize>) -> PageRequest {
        PageRequest::bounded(page, per_page, self.default_per_page, self.max_per_page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub paging: Paging,
    pub refresh_secs: Option<u64>,
    pub config_path: Option<PathBuf>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let explicit = overrides
            .config
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let data_override = overrides
            .data
            .clone()
            .or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from));
        Self::resolve(explicit, Path::new(CONFIG_FILE_NAME), data_override)
    }

    /// An explicit config path must exist; the default one is optional.
    fn resolve(
        explicit: Option<PathBuf>,
        default_path: &Path,
        data_override: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path),
            None if default_path.is_file() => Some(default_path.to_path_buf()),
            None => None,
        };
        let raw = match &config_path {
            Some(path) => read_raw(path)?,
            None => RawConfig::default(),
        };
        Ok(merge(raw, config_path, data_override))
    }
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn merge(raw: RawConfig, config_path: Option<PathBuf>, data_override: Option<PathBuf>) -> Settings {
    // Relative data paths in a config file are anchored at the file's directory.
    let from_file = raw.data_path.map(|data| match config_path.as_deref().and_then(Path::parent) {
        Some(dir) if data.is_relative() => dir.join(data),
        _ => data,
    });
    let data_path = data_override
        .or(from_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

    let max_per_page = raw.max_per_page.unwrap_or(MAX_PER_PAGE).max(1);
    let default_per_page = raw
        .default_per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, max_per_page);

    Settings {
        data_path,
        paging: Paging {
            default_per_page,
            max_per_page,
        },
        refresh_secs: raw.refresh_secs.filter(|secs| *secs > 0),
        config_path,
    }
}
