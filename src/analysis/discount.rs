use std::fmt;

use super::AnalysisError;
use crate::data::filter::FilteredView;
use crate::data::model::{Column, OrderRecord, PAYMENT_VALUE};

/// Whether an order line was paid below its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiscountStatus {
    WithDiscount,
    WithoutDiscount,
}

impl DiscountStatus {
    /// "with discount" iff `price - payment_value > 0`. A missing payment
    /// never counts as a discount.
    pub fn of(record: &OrderRecord) -> Self {
        match discount(record) {
            Some(d) if d > 0.0 => DiscountStatus::WithDiscount,
            _ => DiscountStatus::WithoutDiscount,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscountStatus::WithDiscount => "with discount",
            DiscountStatus::WithoutDiscount => "without discount",
        }
    }
}

impl fmt::Display for DiscountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `price - payment_value`, when the payment is known.
pub fn discount(record: &OrderRecord) -> Option<f64> {
    record.payment_value.map(|paid| record.price - paid)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountGroup {
    pub status: DiscountStatus,
    pub price_sum: f64,
    pub payment_sum: f64,
    pub quantity_sum: f64,
    pub lines: usize,
}

/// Price, payment and quantity totals per [`DiscountStatus`].
///
/// Groups come out "with discount" first; a status with no rows is omitted.
/// Needs a `payment_value` column.
pub fn discount_impact(view: &FilteredView<'_>) -> Result<Vec<DiscountGroup>, AnalysisError> {
    if !view.dataset().has_column(Column::PaymentValue) {
        return Err(AnalysisError::MissingColumn(PAYMENT_VALUE));
    }

    let mut groups = [DiscountStatus::WithDiscount, DiscountStatus::WithoutDiscount].map(|status| {
        DiscountGroup {
            status,
            price_sum: 0.0,
            payment_sum: 0.0,
            quantity_sum: 0.0,
            lines: 0,
        }
    });

    for r in view.records() {
        let g = match DiscountStatus::of(r) {
            DiscountStatus::WithDiscount => &mut groups[0],
            DiscountStatus::WithoutDiscount => &mut groups[1],
        };
        g.price_sum += r.price;
        g.payment_sum += r.payment_value.unwrap_or(0.0);
        g.quantity_sum += r.quantity.unwrap_or(0.0);
        g.lines += 1;
    }

    Ok(groups.into_iter().filter(|g| g.lines > 0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{all_of, dataset, order};
    use crate::data::filter::{filter, DateRange, FilterParams};
    use crate::data::model::Dataset;
    use chrono::NaiveDate;

    #[test]
    fn january_toys_split() {
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
        let groups = discount_impact(&filter(&ds, &params)).unwrap();
        assert_eq!(
            groups,
            vec![
                DiscountGroup {
                    status: DiscountStatus::WithDiscount,
                    price_sum: 10.0,
                    payment_sum: 8.0,
                    quantity_sum: 2.0,
                    lines: 1,
                },
                DiscountGroup {
                    status: DiscountStatus::WithoutDiscount,
                    price_sum: 20.0,
                    payment_sum: 20.0,
                    quantity_sum: 1.0,
                    lines: 1,
                },
            ]
        );
    }

    #[test]
    fn absent_group_is_omitted() {
        let ds = dataset(vec![order("2024-01-01", "toys", "p1", 10.0, 12.0, 1.0)]);
        let groups = discount_impact(&all_of(&ds)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].status, DiscountStatus::WithoutDiscount);
    }

    #[test]
    fn quantity_sums_cover_the_whole_view() {
        let ds = dataset(vec![
            order("2024-01-01", "toys", "p1", 10.0, 9.0, 2.0),
            order("2024-01-02", "toys", "p2", 10.0, 10.0, 3.0),
            order("2024-01-03", "toys", "p3", 10.0, 11.0, 4.0),
            order("2024-01-04", "toys", "p4", 10.0, 1.0, 5.0),
        ]);
        let view = all_of(&ds);
        let total: f64 = view.records().filter_map(|r| r.quantity).sum();
        let groups = discount_impact(&view).unwrap();
        let grouped: f64 = groups.iter().map(|g| g.quantity_sum).sum();
        assert_eq!(grouped, total);
        for r in view.records() {
            let expected = r.price - r.payment_value.unwrap() > 0.0;
            assert_eq!(DiscountStatus::of(r) == DiscountStatus::WithDiscount, expected);
        }
    }

    #[test]
    fn missing_payment_is_without_discount() {
        let mut r = order("2024-01-01", "toys", "p1", 10.0, 0.0, 1.0);
        r.payment_value = None;
        assert_eq!(DiscountStatus::of(&r), DiscountStatus::WithoutDiscount);
        assert_eq!(discount(&r), None);
    }

    #[test]
    fn requires_payment_column() {
        let base = dataset(vec![order("2024-01-01", "toys", "p1", 10.0, 8.0, 1.0)]);
        let columns = base
            .columns
            .iter()
            .filter(|c| c.kind != Column::PaymentValue)
            .cloned()
            .collect();
        let ds = Dataset::new(columns, base.records.clone(), Vec::new(), false);
        assert_eq!(
            discount_impact(&all_of(&ds)),
            Err(AnalysisError::MissingColumn(PAYMENT_VALUE))
        );
    }
}
