use super::stats::{pearson, Statistic, UndefinedReason};
use crate::data::filter::FilteredView;
use crate::data::model::{OrderRecord, FREIGHT_VALUE, PRICE, PRODUCT_WEIGHT_G};

/// Pearson correlation between `price` and `quantity`.
///
/// Rows with a non-numeric quantity are left out of the pairs. A price
/// column without any numeric value leaves no pairs at all.
pub fn price_quantity(view: &FilteredView<'_>) -> Statistic {
    pearson(&price_quantity_points(view))
}

/// (price, quantity) pairs for a scatter plot.
pub fn price_quantity_points(view: &FilteredView<'_>) -> Vec<(f64, f64)> {
    if view.dataset().fell_back(PRICE) {
        return Vec::new();
    }
    view.records()
        .filter_map(|r| r.quantity.map(|q| (r.price, q)))
        .collect()
}

/// Symmetric correlation matrix over a fixed set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: [&'static str; 3],
    pub values: [[Statistic; 3]; 3],
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Statistic {
        self.values[row][col]
    }
}

/// 3×3 correlations among `price`, `freight_value` and `product_weight_g`.
///
/// Cells touching a column that had no numeric values are undefined.
pub fn price_freight_weight(view: &FilteredView<'_>) -> CorrelationMatrix {
    fn price(r: &OrderRecord) -> f64 {
        r.price
    }
    fn freight(r: &OrderRecord) -> f64 {
        r.freight_value
    }
    fn weight(r: &OrderRecord) -> f64 {
        r.product_weight_g
    }
    let extract: [fn(&OrderRecord) -> f64; 3] = [price, freight, weight];
    let labels = [PRICE, FREIGHT_VALUE, PRODUCT_WEIGHT_G];
    let known = labels.map(|column| !view.dataset().fell_back(column));

    let mut values = [[Statistic::Defined(0.0); 3]; 3];
    for i in 0..3 {
        for j in i..3 {
            if !(known[i] && known[j]) {
                values[i][j] = Statistic::Undefined(UndefinedReason::NoSamples);
                values[j][i] = values[i][j];
                continue;
            }
            let pairs: Vec<(f64, f64)> = view
                .records()
                .map(|r| (extract[i](r), extract[j](r)))
                .collect();
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { labels, values }
}
