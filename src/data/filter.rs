use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, OrderRecord};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Inclusive date range, compared against the date part of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The two user inputs of the dashboard: a date range and the allowed categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    pub date_range: DateRange,
    /// An empty set selects nothing.
    pub categories: BTreeSet<String>,
}

impl FilterParams {
    /// Everything selected: the dataset's full date span and every category.
    /// `None` when no row has a usable timestamp.
    pub fn select_all(dataset: &Dataset) -> Option<Self> {
        let (start, end) = dataset.date_bounds()?;
        Some(FilterParams {
            date_range: DateRange::new(start, end),
            categories: dataset.categories.clone(),
        })
    }

    /// A record passes when it has a timestamp, its date is in range, and its
    /// category is selected.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        let Some(date) = record.date() else {
            return false;
        };
        self.date_range.contains(date) && self.categories.contains(&record.category)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – indices into a shared dataset
// ---------------------------------------------------------------------------

/// The subset of a [`Dataset`] selected by a [`FilterParams`].
///
/// Holds row indices only; the dataset is borrowed and never modified.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Rebuild a view from indices produced by an earlier [`filter`] call.
    /// Indices past the end of the dataset are dropped.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        let indices = indices.into_iter().filter(|&i| i < dataset.len()).collect();
        FilteredView { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a OrderRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    /// Apply `params` again to this view's rows.
    #[cfg(test)]
    pub fn refine(&self, params: &FilterParams) -> FilteredView<'a> {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| params.matches(&self.dataset.records[i]))
            .collect();
        FilteredView {
            dataset: self.dataset,
            indices,
        }
    }
}

/// Select the rows of `dataset` that pass `params`.
pub fn filter<'a>(dataset: &'a Dataset, params: &FilterParams) -> FilteredView<'a> {
    let indices: Vec<usize> = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| params.matches(record))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "Filter {}..={} over {} categories kept {} of {} rows",
        params.date_range.start,
        params.date_range.end,
        params.categories.len(),
        indices.len(),
        dataset.len()
    );

    FilteredView { dataset, indices }
}
