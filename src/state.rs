use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::analysis::trend::Granularity;
use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::export::{self, ExportOptions};
use crate::data::filter::{DateRange, FilterParams, FilteredView};
use crate::data::model::Dataset;
use crate::pipeline::{self, AnalysisSettings, Outcome};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

pub const NO_DATA_MESSAGE: &str =
    "No data available for the selected filters. Please adjust your selection.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub settings: AnalysisSettings,

    cache: DatasetCache,

    /// Path of the loaded (or last attempted) dataset.
    pub dataset_path: Option<PathBuf>,

    /// Normalized dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Earliest and latest purchase date; bounds for the date pickers.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,

    /// Current filter selection.
    pub filters: Option<FilterParams>,

    /// "Select all categories" switch.
    pub all_categories: bool,

    pub category_colors: CategoryColors,

    /// Result of the last pipeline run.
    pub outcome: Option<Outcome>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    /// Warning about the loaded dataset itself (e.g. a column with no
    /// numbers). Shown again when the empty-view warning clears.
    load_note: Option<String>,

    /// Append `discount` and `discount_status` when exporting.
    pub export_derived: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            settings: AnalysisSettings::from(&config),
            export_derived: config.export_derived_columns,
            config,
            cache: DatasetCache::new(),
            dataset_path: None,
            dataset: None,
            date_bounds: None,
            filters: None,
            all_categories: true,
            category_colors: CategoryColors::default(),
            outcome: None,
            status: None,
            load_note: None,
        }
    }

    /// Load `path` through the cache. On failure the previous dataset is
    /// dropped and nothing further is computed until a load succeeds.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.dataset_path = Some(path.to_path_buf());
        let loaded = self
            .cache
            .load(path)
            .with_context(|| format!("loading dataset {}", path.display()));

        match loaded {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} order lines with columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.dataset = None;
                self.date_bounds = None;
                self.filters = None;
                self.outcome = None;
                self.status = Some(Status::Error(format!("{e:#}")));
                Err(e)
            }
        }
    }

    /// Re-read the current path from disk, bypassing the cache.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.dataset_path.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.open(&path)
    }

    /// Ingest a normalized dataset: select everything, then compute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.date_bounds = dataset.date_bounds();
        self.filters = FilterParams::select_all(&dataset);
        self.all_categories = true;
        self.category_colors = CategoryColors::new(&dataset.categories);

        let notes: Vec<String> = dataset.fallbacks().map(|s| s.to_string()).collect();
        self.load_note = if dataset.is_empty() {
            Some("The dataset has no order lines; nothing to show.".to_string())
        } else if self.filters.is_none() {
            Some("No row has a parseable order_purchase_timestamp; nothing to show.".to_string())
        } else if notes.is_empty() {
            None
        } else {
            Some(notes.join("; "))
        };
        self.status = self.load_note.clone().map(Status::Warning);

        self.dataset = Some(dataset);
        self.refresh();
    }

    /// Run the pipeline for the current selection.
    pub fn refresh(&mut self) {
        let (Some(dataset), Some(filters)) = (&self.dataset, &self.filters) else {
            self.outcome = None;
            return;
        };
        let outcome = pipeline::run(dataset, filters, &self.settings);
        let showing_empty =
            matches!(&self.status, Some(Status::Warning(m)) if m == NO_DATA_MESSAGE);
        if outcome == Outcome::Empty {
            self.status = Some(Status::Warning(NO_DATA_MESSAGE.to_string()));
        } else if showing_empty {
            self.status = self.load_note.clone().map(Status::Warning);
        }
        self.outcome = Some(outcome);
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if let Some(filters) = &mut self.filters {
            filters.date_range = DateRange::new(start, end);
            self.refresh();
        }
    }

    /// Switch between every category and the first
    /// `initial_category_count` of them.
    pub fn set_all_categories(&mut self, all: bool) {
        self.all_categories = all;
        let (Some(dataset), Some(filters)) = (&self.dataset, &mut self.filters) else {
            return;
        };
        filters.categories = if all {
            dataset.categories.clone()
        } else {
            dataset
                .categories
                .iter()
                .take(self.config.initial_category_count)
                .cloned()
                .collect()
        };
        self.refresh();
    }

    /// Toggle a single category in the selection.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(filters) = &mut self.filters {
            if !filters.categories.remove(category) {
                filters.categories.insert(category.to_string());
            }
            self.refresh();
        }
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.settings.granularity != granularity {
            self.settings.granularity = granularity;
            self.refresh();
        }
    }

    pub fn visible_rows(&self) -> usize {
        match &self.outcome {
            Some(Outcome::Report(report)) => report.visible_indices.len(),
            _ => 0,
        }
    }

    /// Default export target: `filtered_data_<today>.csv` in the export dir.
    pub fn default_export_path(&self) -> PathBuf {
        export::default_export_path_today(&self.config.export_dir)
    }

    /// Write the current filtered view to `path`.
    pub fn export(&mut self, path: &Path) -> Result<usize> {
        let (Some(dataset), Some(Outcome::Report(report))) = (&self.dataset, &self.outcome) else {
            anyhow::bail!("Nothing to export for the current selection");
        };
        let view = FilteredView::from_indices(dataset, report.visible_indices.clone());
        let options = ExportOptions {
            include_derived: self.export_derived,
        };
        let rows = export::write_csv(&view, path, options).context("exporting filtered data")?;
        self.status = Some(Status::Info(format!(
            "Filtered data saved as '{}' ({rows} rows)",
            path.display()
        )));
        Ok(rows)
    }
}
