use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const PRODUCT_CATEGORY_NAME: &str = "product_category_name";
pub const PRODUCT_ID: &str = "product_id";
pub const PRICE: &str = "price";
pub const FREIGHT_VALUE: &str = "freight_value";
pub const PRODUCT_WEIGHT_G: &str = "product_weight_g";
pub const PAYMENT_VALUE: &str = "payment_value";
pub const QUANTITY: &str = "quantity";

/// Columns that must be present in every source file.
///
/// `quantity` is not listed: a missing quantity column is synthesized during
/// normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_PURCHASE_TIMESTAMP,
    PRODUCT_CATEGORY_NAME,
    PRICE,
    PRODUCT_ID,
    FREIGHT_VALUE,
    PRODUCT_WEIGHT_G,
];

/// Label given to rows whose category is missing or blank.
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Output format for timestamps (export and display).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// RawTable – text cells straight from the file
// ---------------------------------------------------------------------------

/// A header row plus text cells. An empty cell means "missing".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text at (`row`, `col`); short rows read as missing.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// What a schema column holds after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Timestamp,
    Category,
    ProductId,
    Price,
    FreightValue,
    ProductWeight,
    PaymentValue,
    Quantity,
    /// Any other source column, kept verbatim. The index points into
    /// [`OrderRecord::passthrough`].
    Passthrough(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub kind: Column,
}

// ---------------------------------------------------------------------------
// OrderRecord – one row of the normalized dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// `None` when the source text did not parse as a timestamp.
    pub timestamp: Option<NaiveDateTime>,
    pub product_id: String,
    pub category: String,
    pub price: f64,
    pub freight_value: f64,
    pub product_weight_g: f64,
    /// `None` when the column is absent or the cell is not a number.
    pub payment_value: Option<f64>,
    /// `None` only when a pre-existing quantity cell is not a number.
    pub quantity: Option<f64>,
    /// Untyped source columns in schema order.
    pub passthrough: Vec<String>,
}

impl OrderRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }

    /// Text rendering of one schema column, as written on export.
    pub fn cell_text(&self, kind: Column) -> String {
        match kind {
            Column::Timestamp => self
                .timestamp
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            Column::Category => self.category.clone(),
            Column::ProductId => self.product_id.clone(),
            Column::Price => format_number(self.price),
            Column::FreightValue => format_number(self.freight_value),
            Column::ProductWeight => format_number(self.product_weight_g),
            Column::PaymentValue => self.payment_value.map(format_number).unwrap_or_default(),
            Column::Quantity => self.quantity.map(format_number).unwrap_or_default(),
            Column::Passthrough(i) => self.passthrough.get(i).cloned().unwrap_or_default(),
        }
    }
}

fn format_number(v: f64) -> String {
    format!("{v}")
}

// ---------------------------------------------------------------------------
// Imputation bookkeeping
// ---------------------------------------------------------------------------

/// The value used to fill unparseable cells of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Mean of the values that did parse.
    Mean(f64),
    /// No cell parsed, so the mean is undefined; 0.0 was used instead.
    ZeroFallback,
}

impl Fill {
    pub fn value(self) -> f64 {
        match self {
            Fill::Mean(m) => m,
            Fill::ZeroFallback => 0.0,
        }
    }
}

/// Per-column record of what mean imputation did.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputationSummary {
    pub column: &'static str,
    pub parsed: usize,
    pub imputed: usize,
    pub fill: Fill,
}

impl fmt::Display for ImputationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fill {
            Fill::Mean(m) => write!(
                f,
                "{}: {} of {} values imputed with mean {m:.4}",
                self.column,
                self.imputed,
                self.parsed + self.imputed
            ),
            Fill::ZeroFallback => write!(
                f,
                "{}: no numeric values, mean undefined; {} values set to 0",
                self.column, self.imputed
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete normalized table
// ---------------------------------------------------------------------------

/// The normalized dataset. Immutable once built; shared read-only behind `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column order used on export: source order, then a synthesized quantity.
    pub columns: Vec<SchemaColumn>,
    pub records: Vec<OrderRecord>,
    /// Sorted distinct category labels.
    pub categories: BTreeSet<String>,
    pub imputation: Vec<ImputationSummary>,
    /// True when the source had no quantity column and every row got 1.
    pub quantity_synthesized: bool,
}

impl Dataset {
    /// Build the category index from normalized records.
    pub fn new(
        columns: Vec<SchemaColumn>,
        records: Vec<OrderRecord>,
        imputation: Vec<ImputationSummary>,
        quantity_synthesized: bool,
    ) -> Self {
        let categories = records.iter().map(|r| r.category.clone()).collect();
        Dataset {
            columns,
            records,
            categories,
            imputation,
            quantity_synthesized,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, kind: Column) -> bool {
        self.columns.iter().any(|c| c.kind == kind)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Earliest and latest purchase date over rows with a timestamp.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(OrderRecord::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// True when `column` had no numeric values and was filled with 0.0.
    pub fn fell_back(&self, column: &str) -> bool {
        self.fallbacks().any(|s| s.column == column)
    }

    /// Imputations that fell back because a column had no numeric values.
    pub fn fallbacks(&self) -> impl Iterator<Item = &ImputationSummary> {
        self.imputation
            .iter()
            .filter(|s| matches!(s.fill, Fill::ZeroFallback))
    }
}
