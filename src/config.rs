use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analysis::trend::Granularity;

/// Env var naming a JSON config file.
pub const CONFIG_ENV: &str = "ORDER_SCOPE_CONFIG";
/// Config file picked up from the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "order-scope.json";

/// Dashboard settings. Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset opened at startup.
    pub dataset_path: PathBuf,
    /// Directory the export action writes into.
    pub export_dir: PathBuf,
    pub trend_granularity: Granularity,
    pub top_n: usize,
    pub category_top_n: usize,
    /// Categories pre-selected when "all categories" is switched off.
    pub initial_category_count: usize,
    /// Export the derived `discount` / `discount_status` columns too.
    pub export_derived_columns: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("main_dataset.csv"),
            export_dir: PathBuf::from("."),
            trend_granularity: Granularity::Weekly,
            top_n: 10,
            category_top_n: 10,
            initial_category_count: 5,
            export_derived_columns: false,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config: `$ORDER_SCOPE_CONFIG`, else `./order-scope.json`
    /// if it exists, else defaults. A dataset path argument wins over all.
    pub fn resolve(dataset_arg: Option<PathBuf>) -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        if let Some(path) = dataset_arg {
            config.dataset_path = path;
        }
        log::debug!("Resolved config: {config:?}");
        Ok(config)
    }
}
