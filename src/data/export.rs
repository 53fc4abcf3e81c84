//! Write a filtered view to CSV, verbatim.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use super::error::DataError;
use super::filter::FilteredView;
use crate::analysis::discount::{discount, DiscountStatus};

pub const DISCOUNT: &str = "discount";
pub const DISCOUNT_STATUS: &str = "discount_status";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Append the session-derived `discount` and `discount_status` columns.
    pub include_derived: bool,
}

/// `filtered_data_<date>.csv` inside `dir`.
pub fn default_export_path(dir: &Path, today: NaiveDate) -> PathBuf {
    dir.join(format!("filtered_data_{}.csv", today.format("%Y-%m-%d")))
}

/// [`default_export_path`] for the local calendar date.
pub fn default_export_path_today(dir: &Path) -> PathBuf {
    default_export_path(dir, Local::now().date_naive())
}

/// Write `view` as CSV: one header row, then one line per record, columns in
/// normalized schema order. Returns the number of data rows written.
pub fn write_csv(
    view: &FilteredView<'_>,
    path: &Path,
    options: ExportOptions,
) -> Result<usize, DataError> {
    let export_err = |source| DataError::Export {
        path: path.to_path_buf(),
        source,
    };

    let columns = &view.dataset().columns;
    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;

    let mut header: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    if options.include_derived {
        header.push(DISCOUNT);
        header.push(DISCOUNT_STATUS);
    }
    writer.write_record(&header).map_err(export_err)?;

    let mut rows = 0usize;
    for record in view.records() {
        let mut cells: Vec<String> = columns.iter().map(|c| record.cell_text(c.kind)).collect();
        if options.include_derived {
            cells.push(discount(record).map(|d| format!("{d}")).unwrap_or_default());
            cells.push(DiscountStatus::of(record).label().to_string());
        }
        writer.write_record(&cells).map_err(export_err)?;
        rows += 1;
    }

    writer
        .flush()
        .map_err(|e| export_err(csv::Error::from(e)))?;

    log::info!("Exported {rows} rows to {}", path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, DateRange, FilterParams};
    use crate::data::model::RawTable;
    use crate::data::normalize::normalize;

    fn dataset() -> crate::data::model::Dataset {
        let raw = RawTable {
            headers: [
                "order_id",
                "order_purchase_timestamp",
                "product_id",
                "product_category_name",
                "price",
                "payment_value",
                "freight_value",
                "product_weight_g",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            rows: vec![
                vec!["o1", "2024-01-01 10:00:00", "p1", "toys", "10", "8", "1.5", "100"],
                vec!["o2", "2024-01-08 11:30:00", "p2", "toys", "20", "20", "2", ""],
                vec!["o3", "2024-02-01 09:00:00", "p3", "books", "5", "5", "1", "300"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        };
        normalize(&raw).unwrap()
    }

    fn january_toys() -> FilterParams {
        FilterParams {
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
            categories: ["toys".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn writes_header_and_one_line_per_row() {
        let ds = dataset();
        let view = filter(&ds, &january_toys());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let written = write_csv(&view, &path, ExportOptions::default()).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, ds.column_names());
        assert_eq!(header.last().map(String::as_str), Some("quantity"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "o1");
        assert_eq!(&rows[0][1], "2024-01-01 10:00:00");
        // imputed weight is the mean of 100 and 300
        assert_eq!(&rows[1][7], "200");
        assert_eq!(&rows[1][8], "1");
    }

    #[test]
    fn derived_columns_are_appended_on_request() {
        let ds = dataset();
        let view = filter(&ds, &january_toys());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&view, &path, ExportOptions { include_derived: true }).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header = reader.headers().unwrap().clone();
        assert_eq!(&header[header.len() - 2], DISCOUNT);
        assert_eq!(&header[header.len() - 1], DISCOUNT_STATUS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][rows[0].len() - 2], "2");
        assert_eq!(&rows[0][rows[0].len() - 1], "with discount");
        assert_eq!(&rows[1][rows[1].len() - 1], "without discount");
    }

    #[test]
    fn default_path_embeds_the_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = default_export_path(Path::new("exports"), today);
        assert_eq!(path, Path::new("exports").join("filtered_data_2024-03-09.csv"));
    }
}
