use std::fs::File;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::DataError;
use super::model::RawTable;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a tabular file into text cells. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – comma-delimited with a header row
/// * `.tsv` / `.tab` – tab-delimited with a header row
/// * `.parquet`      – flat columns; every value is rendered to text
///
/// Nothing is typed here; see [`super::normalize`].
pub fn load_file(path: &Path) -> Result<RawTable, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_delimited(path, b',')?,
        "tsv" | "tab" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string())),
    };

    if table.headers.iter().all(|h| h.is_empty()) {
        return Err(DataError::Empty(path.to_path_buf()));
    }

    log::info!(
        "Read {} rows x {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Short rows are allowed;
/// their trailing cells read as missing.
fn load_delimited(path: &Path, delimiter: u8) -> Result<RawTable, DataError> {
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Spreadsheet exports often prefix the first header with a UTF-8 BOM, which
/// would otherwise make a required column look missing.
fn normalize_header_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat (non-nested) columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Timestamps come out as ISO-8601 text,
/// nulls as empty cells.
fn load_parquet(path: &Path) -> Result<RawTable, DataError> {
    let parquet_err = |source| DataError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let arrow_err = |source| DataError::Arrow {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(arrow_err)?;
        let columns = batch.columns();
        let formatters = columns
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()
            .map_err(arrow_err)?;

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .zip(&formatters)
                .map(|(col, fmt)| {
                    if col.is_null(row) {
                        String::new()
                    } else {
                        fmt.value(row).to_string()
                    }
                })
                .collect();
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn csv_with_bom_and_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let body = "\u{feff}product_id,price,quantity\np1,10.5,2\np2,3\n";
        let path = write_file(&dir, "orders.csv", body);
        let table = load_file(&path).unwrap();
        assert_eq!(table.headers, vec!["product_id", "price", "quantity"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), "10.5");
        assert_eq!(table.cell(1, 2), "");
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "orders.tsv", "product_id\tprice\np1\t4\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.column_index("price"), Some(1));
        assert_eq!(table.cell(0, 1), "4");
    }

    #[test]
    fn empty_file_has_no_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", "");
        assert!(matches!(load_file(&path), Err(DataError::Empty(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "orders.xlsx", "x");
        assert!(matches!(
            load_file(&path),
            Err(DataError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn parquet_columns_become_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("product_id", DataType::Utf8, false),
            Field::new("price", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["p1", "p2"])),
                Arc::new(Float64Array::from(vec![Some(12.5), None])),
            ],
        )
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.headers, vec!["product_id", "price"]);
        assert_eq!(table.cell(0, 0), "p1");
        assert_eq!(table.cell(0, 1).parse::<f64>().unwrap(), 12.5);
        assert_eq!(table.cell(1, 1), "");
    }
}
