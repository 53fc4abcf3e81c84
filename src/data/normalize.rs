use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::DataError;
use super::model::{
    Column, Dataset, Fill, ImputationSummary, OrderRecord, RawTable, SchemaColumn,
    FREIGHT_VALUE, ORDER_PURCHASE_TIMESTAMP, PAYMENT_VALUE, PRICE, PRODUCT_CATEGORY_NAME,
    PRODUCT_ID, PRODUCT_WEIGHT_G, QUANTITY, REQUIRED_COLUMNS, UNKNOWN_CATEGORY,
};

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

/// Check that every required column is present, naming all that are not.
///
/// `quantity` is never required here; [`normalize`] synthesizes it.
pub fn validate_columns(raw: &RawTable) -> Result<(), DataError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| raw.column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn raw text cells into a typed, imputed [`Dataset`].
///
/// Steps, in order:
/// 1. timestamps parse or become `None` (rows are never dropped)
/// 2. blank categories become [`UNKNOWN_CATEGORY`]
/// 3. `price`, `freight_value`, `product_weight_g`: unparseable cells are
///    replaced by the mean of the cells that did parse, column by column
/// 4. a missing `quantity` column is synthesized as 1 for every row
pub fn normalize(raw: &RawTable) -> Result<Dataset, DataError> {
    validate_columns(raw)?;

    let (mut columns, passthrough_idx) = build_schema(&raw.headers);
    let col = |name: &str| raw.column_index(name);
    let n_rows = raw.rows.len();

    let ts_idx = col(ORDER_PURCHASE_TIMESTAMP);
    let cat_idx = col(PRODUCT_CATEGORY_NAME);
    let pid_idx = col(PRODUCT_ID);
    let payment_idx = col(PAYMENT_VALUE);
    let quantity_idx = col(QUANTITY);

    let text = |row: usize, idx: Option<usize>| idx.map(|i| raw.cell(row, i)).unwrap_or("");

    let mut imputation = Vec::with_capacity(3);
    let mut numeric = |name: &'static str| {
        let parsed: Vec<Option<f64>> = (0..n_rows)
            .map(|row| parse_number(text(row, col(name))))
            .collect();
        let (values, summary) = impute_mean(name, parsed);
        imputation.push(summary);
        values
    };
    let prices = numeric(PRICE);
    let freights = numeric(FREIGHT_VALUE);
    let weights = numeric(PRODUCT_WEIGHT_G);

    let quantity_synthesized = quantity_idx.is_none();
    if quantity_synthesized {
        columns.push(SchemaColumn {
            name: QUANTITY.to_string(),
            kind: Column::Quantity,
        });
    }

    let mut unparsed_timestamps = 0usize;
    let records: Vec<OrderRecord> = (0..n_rows)
        .map(|row| {
            let raw_ts = text(row, ts_idx);
            let timestamp = parse_timestamp(raw_ts);
            if timestamp.is_none() {
                unparsed_timestamps += 1;
            }

            let category = text(row, cat_idx);
            let category = if category.trim().is_empty() {
                UNKNOWN_CATEGORY.to_string()
            } else {
                category.to_string()
            };

            let quantity = match quantity_idx {
                Some(i) => parse_number(raw.cell(row, i)),
                None => Some(1.0),
            };

            OrderRecord {
                timestamp,
                product_id: text(row, pid_idx).to_string(),
                category,
                price: prices[row],
                freight_value: freights[row],
                product_weight_g: weights[row],
                payment_value: parse_number(text(row, payment_idx)),
                quantity,
                passthrough: passthrough_idx
                    .iter()
                    .map(|&i| raw.cell(row, i).to_string())
                    .collect(),
            }
        })
        .collect();

    if unparsed_timestamps > 0 {
        log::warn!(
            "{unparsed_timestamps} of {n_rows} rows have an unparseable \
             {ORDER_PURCHASE_TIMESTAMP}; \
             they are excluded from date-filtered views"
        );
    }
    for summary in &imputation {
        match summary.fill {
            Fill::ZeroFallback => log::warn!("{summary}"),
            Fill::Mean(_) if summary.imputed > 0 => log::info!("{summary}"),
            Fill::Mean(_) => {}
        }
    }

    Ok(Dataset::new(columns, records, imputation, quantity_synthesized))
}

/// Map source headers to typed columns. Returns the schema and, for each
/// passthrough column, its index in the raw table.
fn build_schema(headers: &[String]) -> (Vec<SchemaColumn>, Vec<usize>) {
    let mut seen = HashSet::new();
    let mut passthrough = Vec::new();

    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let known = match name.as_str() {
                ORDER_PURCHASE_TIMESTAMP => Some(Column::Timestamp),
                PRODUCT_CATEGORY_NAME => Some(Column::Category),
                PRODUCT_ID => Some(Column::ProductId),
                PRICE => Some(Column::Price),
                FREIGHT_VALUE => Some(Column::FreightValue),
                PRODUCT_WEIGHT_G => Some(Column::ProductWeight),
                PAYMENT_VALUE => Some(Column::PaymentValue),
                QUANTITY => Some(Column::Quantity),
                _ => None,
            };
            // Only the first occurrence of a duplicated header is typed.
            let kind = match known {
                Some(kind) if seen.insert(kind) => kind,
                _ => {
                    passthrough.push(i);
                    Column::Passthrough(passthrough.len() - 1)
                }
            };
            SchemaColumn {
                name: name.clone(),
                kind,
            }
        })
        .collect();

    (columns, passthrough)
}

/// Replace every `None` with the mean of the parsed values.
///
/// With no parsed values the mean is undefined: cells become 0.0 and the
/// summary says so with [`Fill::ZeroFallback`].
fn impute_mean(column: &'static str, parsed: Vec<Option<f64>>) -> (Vec<f64>, ImputationSummary) {
    let (sum, count) = parsed
        .iter()
        .flatten()
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));

    let fill = if count == 0 {
        Fill::ZeroFallback
    } else {
        Fill::Mean(sum / count as f64)
    };

    let imputed = parsed.len() - count;
    let values = parsed
        .into_iter()
        .map(|v| v.unwrap_or(fill.value()))
        .collect();

    (
        values,
        ImputationSummary {
            column,
            parsed: count,
            imputed,
            fill,
        },
    )
}

/// Parse a decimal number. Blank, non-numeric and non-finite text is `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse common timestamp spellings; a bare date reads as midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}
