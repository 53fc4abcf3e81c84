//! Group-and-rank reducers: best-selling products and category performance.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::{require_samples, AnalysisError};
use crate::data::filter::FilteredView;
use crate::data::model::PRICE;

/// Summed sales of one (`product_id`, `product_category_name`) group.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_id: String,
    pub category: String,
    pub total_sales: f64,
}

/// Sales of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    pub total_sales: f64,
    pub average_price: f64,
    pub lines: usize,
}

/// Top categories ranked two ways, independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPerformance {
    pub by_total: Vec<CategoryStat>,
    pub by_average: Vec<CategoryStat>,
}

/// The `n` product groups with the largest summed price, largest first.
///
/// Ties keep the order in which groups first appear in the view.
pub fn top_products(
    view: &FilteredView<'_>,
    n: usize,
) -> Result<Vec<ProductSales>, AnalysisError> {
    require_samples(view, PRICE)?;

    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<ProductSales> = Vec::new();

    for r in view.records() {
        let key = (r.product_id.as_str(), r.category.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(ProductSales {
                product_id: r.product_id.clone(),
                category: r.category.clone(),
                total_sales: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].total_sales += r.price;
    }

    // `sort_by` is stable, so equal totals stay in first-appearance order.
    groups.sort_by(|a, b| descending(a.total_sales, b.total_sales));
    groups.truncate(n);
    Ok(groups)
}

/// Per-category sum and mean of `price`; top `n` by each.
pub fn category_performance(
    view: &FilteredView<'_>,
    n: usize,
) -> Result<CategoryPerformance, AnalysisError> {
    require_samples(view, PRICE)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<CategoryStat> = Vec::new();

    for r in view.records() {
        let slot = *index.entry(r.category.as_str()).or_insert_with(|| {
            stats.push(CategoryStat {
                category: r.category.clone(),
                total_sales: 0.0,
                average_price: 0.0,
                lines: 0,
            });
            stats.len() - 1
        });
        let s = &mut stats[slot];
        s.total_sales += r.price;
        s.lines += 1;
    }
    for s in &mut stats {
        s.average_price = s.total_sales / s.lines as f64;
    }

    let mut by_total = stats.clone();
    by_total.sort_by(|a, b| descending(a.total_sales, b.total_sales));
    by_total.truncate(n);

    let mut by_average = stats;
    by_average.sort_by(|a, b| descending(a.average_price, b.average_price));
    by_average.truncate(n);

    Ok(CategoryPerformance {
        by_total,
        by_average,
    })
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
