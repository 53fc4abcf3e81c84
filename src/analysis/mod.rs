//! Aggregation library: pure reducers over a filtered view.
//!
//! ```text
//!   FilteredView
//!        │
//!        ├──► kpi          totals, average, unique products
//!        ├──► ranking      top products, category performance
//!        ├──► trend        daily / weekly sales buckets
//!        ├──► discount     with vs without discount
//!        └──► correlation  price × quantity, price/freight/weight matrix
//! ```
//!
//! Every reducer reads the view only; any order, any subset.

pub mod correlation;
pub mod discount;
pub mod kpi;
pub mod ranking;
pub mod stats;
pub mod trend;

use thiserror::Error;

use crate::data::filter::FilteredView;

/// A reducer could not run for this request. The dataset is unaffected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Column '{0}' is not present in the dataset")]
    MissingColumn(&'static str),

    #[error("Column '{0}' has no numeric values in the dataset")]
    NoNumericValues(&'static str),
}

/// Err when `column` had no parseable value and was filled with 0.0 on load;
/// any figure built from it would be meaningless.
pub(crate) fn require_samples(
    view: &FilteredView<'_>,
    column: &'static str,
) -> Result<(), AnalysisError> {
    if view.dataset().fell_back(column) {
        Err(AnalysisError::NoNumericValues(column))
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::data::filter::{filter, FilterParams, FilteredView};
    use crate::data::model::{Column, Dataset, Fill, ImputationSummary, OrderRecord, SchemaColumn};

    /// One order line at noon on `date`.
    pub fn order(
        date: &str,
        category: &str,
        product_id: &str,
        price: f64,
        payment: f64,
        quantity: f64,
    ) -> OrderRecord {
        OrderRecord {
            timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(12, 0, 0),
            product_id: product_id.to_string(),
            category: category.to_string(),
            price,
            freight_value: price / 10.0,
            product_weight_g: 100.0,
            payment_value: Some(payment),
            quantity: Some(quantity),
            passthrough: Vec::new(),
        }
    }

    pub fn dataset(records: Vec<OrderRecord>) -> Dataset {
        let columns = [
            ("order_purchase_timestamp", Column::Timestamp),
            ("product_id", Column::ProductId),
            ("product_category_name", Column::Category),
            ("price", Column::Price),
            ("payment_value", Column::PaymentValue),
            ("freight_value", Column::FreightValue),
            ("product_weight_g", Column::ProductWeight),
            ("quantity", Column::Quantity),
        ]
        .into_iter()
        .map(|(name, kind)| SchemaColumn {
            name: name.to_string(),
            kind,
        })
        .collect();
        Dataset::new(columns, records, Vec::new(), false)
    }

    /// Mark `column` as having had no numeric values on load, with every
    /// cell filled with 0.0.
    pub fn zero_filled(mut ds: Dataset, column: &'static str) -> Dataset {
        let set = |r: &mut OrderRecord| match column {
            "price" => r.price = 0.0,
            "freight_value" => r.freight_value = 0.0,
            "product_weight_g" => r.product_weight_g = 0.0,
            other => panic!("not an imputed column: {other}"),
        };
        ds.records.iter_mut().for_each(set);
        ds.imputation.push(ImputationSummary {
            column,
            parsed: 0,
            imputed: ds.records.len(),
            fill: Fill::ZeroFallback,
        });
        ds
    }

    /// Every timestamped row of `ds`.
    pub fn all_of(ds: &Dataset) -> FilteredView<'_> {
        let params = FilterParams::select_all(ds).unwrap();
        filter(ds, &params)
    }
}
