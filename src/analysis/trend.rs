use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

use super::{require_samples, AnalysisError};
use crate::data::filter::FilteredView;
use crate::data::model::PRICE;

/// Bucket width for the sales trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    /// Calendar weeks ending on Sunday, labeled by that Sunday.
    #[default]
    Weekly,
}

impl Granularity {
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
        }
    }

    fn step(self) -> Duration {
        match self {
            Granularity::Daily => Duration::days(1),
            Granularity::Weekly => Duration::days(7),
        }
    }

    /// The bucket label `date` falls into.
    pub fn bucket(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                let to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
                date + Duration::days(to_sunday)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub bucket: NaiveDate,
    pub sales: f64,
}

/// Summed `price` per time bucket in ascending order.
///
/// Buckets are contiguous from the first to the last non-empty one; buckets
/// in between with no sales are present with 0.
pub fn sales_trend(
    view: &FilteredView<'_>,
    granularity: Granularity,
) -> Result<Vec<TrendPoint>, AnalysisError> {
    require_samples(view, PRICE)?;

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in view.records() {
        if let Some(date) = r.date() {
            *sums.entry(granularity.bucket(date)).or_insert(0.0) += r.price;
        }
    }

    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Ok(Vec::new());
    };

    let mut points = Vec::new();
    let mut bucket = first;
    while bucket <= last {
        points.push(TrendPoint {
            bucket,
            sales: sums.get(&bucket).copied().unwrap_or(0.0),
        });
        bucket += granularity.step();
    }
    Ok(points)
}
