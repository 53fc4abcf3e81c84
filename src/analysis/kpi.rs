use std::collections::HashSet;

use super::stats::{mean, Statistic, UndefinedReason};
use crate::data::filter::FilteredView;
use crate::data::model::PRICE;

/// Headline numbers for a filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    /// Sum of `price`. Undefined when the column had no numeric values.
    pub total_sales: Statistic,
    /// Mean of `price` per order line.
    pub average_order_value: Statistic,
    /// Sum of `quantity`; cells that were not numbers count as nothing.
    pub total_orders: f64,
    /// Distinct `product_id` values.
    pub unique_products: usize,
}

pub fn kpi_summary(view: &FilteredView<'_>) -> KpiSummary {
    let (total_sales, average_order_value) = if view.dataset().fell_back(PRICE) {
        let undefined = Statistic::Undefined(UndefinedReason::NoSamples);
        (undefined, undefined)
    } else {
        (
            Statistic::Defined(view.records().map(|r| r.price).sum()),
            mean(view.records().map(|r| r.price)),
        )
    };
    let total_orders: f64 = view.records().filter_map(|r| r.quantity).sum();
    let unique_products = view
        .records()
        .map(|r| r.product_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    KpiSummary {
        total_sales,
        average_order_value,
        total_orders,
        unique_products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{all_of, dataset, order, zero_filled};
    use crate::data::filter::{filter, DateRange, FilterParams};
    use chrono::NaiveDate;

    #[test]
    fn january_toys_summary() {
        let ds = dataset(vec![
            order("2024-01-01", "toys", "p1", 10.0, 8.0, 2.0),
            order("2024-01-08", "toys", "p2", 20.0, 20.0, 1.0),
            order("2024-02-01", "books", "p3", 5.0, 5.0, 1.0),
        ]);
        let params = FilterParams {
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
            categories: ["toys".to_string()].into_iter().collect(),
        };
        let view = filter(&ds, &params);
        assert_eq!(view.len(), 2);

        let kpi = kpi_summary(&view);
        assert_eq!(kpi.total_sales, Statistic::Defined(30.0));
        assert_eq!(kpi.average_order_value, Statistic::Defined(15.0));
        assert_eq!(kpi.total_orders, 3.0);
        assert_eq!(kpi.unique_products, 2);
    }

    #[test]
    fn repeated_products_count_once() {
        let ds = dataset(vec![
            order("2024-01-01", "toys", "p1", 10.0, 10.0, 1.0),
            order("2024-01-02", "toys", "p1", 10.0, 10.0, 4.0),
        ]);
        let kpi = kpi_summary(&all_of(&ds));
        assert_eq!(kpi.unique_products, 1);
        assert_eq!(kpi.total_orders, 5.0);
    }

    #[test]
    fn empty_view_has_undefined_average() {
        let ds = dataset(Vec::new());
        let view = crate::data::filter::FilteredView::from_indices(&ds, Vec::new());
        let kpi = kpi_summary(&view);
        assert_eq!(kpi.total_sales, Statistic::Defined(0.0));
        assert_eq!(
            kpi.average_order_value,
            Statistic::Undefined(UndefinedReason::NoSamples)
        );
    }

    #[test]
    fn price_without_numeric_values_is_undefined() {
        let ds = zero_filled(
            dataset(vec![
                order("2024-01-01", "toys", "p1", 10.0, 10.0, 1.0),
                order("2024-01-02", "toys", "p2", 20.0, 20.0, 2.0),
            ]),
            "price",
        );
        let kpi = kpi_summary(&all_of(&ds));
        let undefined = Statistic::Undefined(UndefinedReason::NoSamples);
        assert_eq!(kpi.total_sales, undefined);
        assert_eq!(kpi.average_order_value, undefined);
        assert_eq!(kpi.total_orders, 3.0);
        assert_eq!(kpi.unique_products, 2);
    }
}
