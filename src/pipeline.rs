//! One synchronous recomputation pass: filter, then every reducer.
//!
//! The UI calls [`run`] with the current filter parameters whenever they
//! change; nothing here holds UI state or touches the dataset mutably.

use crate::analysis::correlation::{self, CorrelationMatrix};
use crate::analysis::discount::{self, DiscountGroup};
use crate::analysis::kpi::{self, KpiSummary};
use crate::analysis::ranking::{self, CategoryPerformance, ProductSales};
use crate::analysis::stats::Statistic;
use crate::analysis::trend::{self, Granularity, TrendPoint};
use crate::analysis::AnalysisError;
use crate::config::DashboardConfig;
use crate::data::filter::{filter, FilterParams};
use crate::data::model::Dataset;

/// Knobs the reducers take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub top_n: usize,
    pub category_top_n: usize,
    pub granularity: Granularity,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            category_top_n: 10,
            granularity: Granularity::Weekly,
        }
    }
}

impl From<&DashboardConfig> for AnalysisSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            top_n: config.top_n,
            category_top_n: config.category_top_n,
            granularity: config.trend_granularity,
        }
    }
}

/// Everything the presentation layer draws for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    /// Rows of the dataset in the filtered view.
    pub visible_indices: Vec<usize>,
    pub kpi: KpiSummary,
    /// Price-based sections fail when `price` had no numeric values.
    pub top_products: Result<Vec<ProductSales>, AnalysisError>,
    pub granularity: Granularity,
    pub trend: Result<Vec<TrendPoint>, AnalysisError>,
    /// Also fails when the dataset has no `payment_value`.
    pub discount: Result<Vec<DiscountGroup>, AnalysisError>,
    pub price_quantity: Statistic,
    pub scatter: Vec<(f64, f64)>,
    pub categories: Result<CategoryPerformance, AnalysisError>,
    pub correlation: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The filters matched nothing; nothing was aggregated.
    Empty,
    Report(Box<DashboardReport>),
}

/// Filter `dataset` with `params` and run every reducer over the result.
pub fn run(dataset: &Dataset, params: &FilterParams, settings: &AnalysisSettings) -> Outcome {
    let view = filter(dataset, params);
    if view.is_empty() {
        log::warn!("No data available for the selected filters");
        return Outcome::Empty;
    }

    log::debug!("Building report over {} rows", view.len());
    let report = DashboardReport {
        kpi: kpi::kpi_summary(&view),
        top_products: ranking::top_products(&view, settings.top_n),
        granularity: settings.granularity,
        trend: trend::sales_trend(&view, settings.granularity),
        discount: discount::discount_impact(&view),
        price_quantity: correlation::price_quantity(&view),
        scatter: correlation::price_quantity_points(&view),
        categories: ranking::category_performance(&view, settings.category_top_n),
        correlation: correlation::price_freight_weight(&view),
        visible_indices: view.into_indices(),
    };

    let skipped = [
        ("Top products", report.top_products.as_ref().err()),
        ("Sales trend", report.trend.as_ref().err()),
        ("Discount analysis", report.discount.as_ref().err()),
        ("Category performance", report.categories.as_ref().err()),
    ];
    for (section, err) in skipped {
        if let Some(e) = err {
            log::warn!("{section} skipped: {e}");
        }
    }

    Outcome::Report(Box::new(report))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::analysis::discount::DiscountStatus;
    use crate::analysis::stats::UndefinedReason;
    use crate::data::filter::DateRange;
    use crate::data::model::{RawTable, PRICE};
    use crate::data::normalize::normalize;

    fn raw() -> RawTable {
        RawTable {
            headers: [
                "order_purchase_timestamp",
                "product_id",
                "product_category_name",
                "price",
                "payment_value",
                "quantity",
                "freight_value",
                "product_weight_g",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            rows: [
                ["2024-01-01 09:00:00", "p1", "toys", "10", "8", "2", "1", "100"],
                ["2024-01-08 10:00:00", "p2", "toys", "20", "20", "1", "2", "250"],
                ["2024-02-01 11:00:00", "p3", "books", "5", "5", "1", "1", "400"],
            ]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
        }
    }

    fn january(categories: &[&str]) -> FilterParams {
        FilterParams {
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn end_to_end_january_toys() {
        let ds = normalize(&raw()).unwrap();
        let Outcome::Report(report) = run(&ds, &january(&["toys"]), &AnalysisSettings::default())
        else {
            panic!("expected a report");
        };

        assert_eq!(report.visible_indices, vec![0, 1]);
        assert_eq!(report.kpi.total_sales, Statistic::Defined(30.0));
        assert_eq!(report.kpi.average_order_value, Statistic::Defined(15.0));

        let groups = report.discount.as_ref().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].status, DiscountStatus::WithDiscount);
        assert_eq!(
            (groups[0].price_sum, groups[0].payment_sum, groups[0].quantity_sum),
            (10.0, 8.0, 2.0)
        );
        assert_eq!(groups[1].status, DiscountStatus::WithoutDiscount);
        assert_eq!(
            (groups[1].price_sum, groups[1].payment_sum, groups[1].quantity_sum),
            (20.0, 20.0, 1.0)
        );

        assert_eq!(report.top_products.as_ref().unwrap()[0].product_id, "p2");
        assert_eq!(report.trend.as_ref().unwrap().len(), 2);
        assert_eq!(report.categories.as_ref().unwrap().by_total.len(), 1);
    }

    #[test]
    fn empty_selection_skips_aggregation() {
        let ds = normalize(&raw()).unwrap();
        assert_eq!(
            run(&ds, &january(&[]), &AnalysisSettings::default()),
            Outcome::Empty
        );
        assert_eq!(
            run(&ds, &january(&["books"]), &AnalysisSettings::default()),
            Outcome::Empty
        );
    }

    #[test]
    fn missing_payment_column_only_fails_discount() {
        let mut table = raw();
        table.headers[4] = "voucher_code".to_string();
        let ds = normalize(&table).unwrap();
        let Outcome::Report(report) = run(&ds, &january(&["toys"]), &AnalysisSettings::default())
        else {
            panic!("expected a report");
        };
        assert!(report.discount.is_err());
        assert_eq!(report.kpi.total_sales, Statistic::Defined(30.0));
        assert!(report.top_products.is_ok());
    }

    #[test]
    fn unparseable_price_column_is_not_reported_as_zero() {
        let mut table = raw();
        for (row, price) in table.rows.iter_mut().zip(["abc", "", "n/a"]) {
            row[3] = price.to_string();
        }
        let ds = normalize(&table).unwrap();
        let Outcome::Report(report) = run(&ds, &january(&["toys"]), &AnalysisSettings::default())
        else {
            panic!("expected a report");
        };

        let undefined = Statistic::Undefined(UndefinedReason::NoSamples);
        assert_eq!(report.kpi.total_sales, undefined);
        assert_eq!(report.kpi.average_order_value, undefined);
        assert_eq!(report.kpi.total_orders, 3.0);
        assert_eq!(report.price_quantity, undefined);
        assert!(report.scatter.is_empty());

        let missing = AnalysisError::NoNumericValues(PRICE);
        assert_eq!(report.categories, Err(missing.clone()));
        assert_eq!(report.top_products, Err(missing.clone()));
        assert_eq!(report.trend, Err(missing));
        assert!(report.correlation.get(1, 2).is_defined());
    }
}
