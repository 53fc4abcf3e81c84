//! Writes a synthetic order dataset as `main_dataset.csv` and
//! `main_dataset.parquet` in the working directory.
//!
//! A few cells are deliberately blank or malformed so the dashboard's
//! imputation and "Unknown Category" paths have something to do.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const HEADERS: [&str; 10] = [
    "order_id",
    "order_purchase_timestamp",
    "product_id",
    "product_category_name",
    "price",
    "freight_value",
    "product_weight_g",
    "payment_value",
    "quantity",
    "customer_state",
];

const CATEGORIES: [(&str, f64, f64); 8] = [
    // (name, typical price, typical weight in grams)
    ("bed_bath_table", 90.0, 1800.0),
    ("health_beauty", 120.0, 600.0),
    ("sports_leisure", 110.0, 1500.0),
    ("furniture_decor", 150.0, 4000.0),
    ("computers_accessories", 220.0, 900.0),
    ("housewares", 70.0, 1200.0),
    ("watches_gifts", 200.0, 350.0),
    ("toys", 60.0, 800.0),
];

const STATES: [&str; 5] = ["SP", "RJ", "MG", "RS", "PR"];

const N_ORDERS: usize = 1500;
const N_PRODUCTS: usize = 120;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Multiplicative jitter in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

struct Product {
    id: String,
    category: usize,
    price: f64,
    weight: f64,
}

fn catalogue(rng: &mut SimpleRng) -> Vec<Product> {
    (0..N_PRODUCTS)
        .map(|i| {
            let category = rng.below(CATEGORIES.len());
            let (_, price, weight) = CATEGORIES[category];
            Product {
                id: format!("{:016x}{i:04}", rng.next_u64()),
                category,
                price: (price * rng.jitter(0.6)).max(5.0),
                weight: (weight * rng.jitter(0.5)).round(),
            }
        })
        .collect()
}

fn order_rows(rng: &mut SimpleRng) -> Vec<Vec<String>> {
    let products = catalogue(rng);
    let start = NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();

    (0..N_ORDERS)
        .map(|i| {
            let product = &products[rng.below(products.len())];
            let quantity = 1 + rng.below(3) * usize::from(rng.chance(0.3));
            let price = product.price * rng.jitter(0.05);
            let freight = 8.0 + product.weight / 250.0 * rng.jitter(0.3);
            // ~40% of lines are paid below list price.
            let payment = if rng.chance(0.4) {
                price * (0.7 + 0.25 * rng.next_f64())
            } else {
                price
            };
            let when = start
                + Duration::minutes((rng.next_f64() * 540.0 * 24.0 * 60.0) as i64);

            let category = if rng.chance(0.02) {
                String::new()
            } else {
                CATEGORIES[product.category].0.to_string()
            };
            let weight = if rng.chance(0.02) {
                String::new()
            } else {
                format!("{:.0}", product.weight)
            };
            let freight = if rng.chance(0.01) {
                "n/a".to_string()
            } else {
                format!("{freight:.2}")
            };

            vec![
                format!("order_{i:05}"),
                when.format("%Y-%m-%d %H:%M:%S").to_string(),
                product.id.clone(),
                category,
                format!("{price:.2}"),
                freight,
                weight,
                format!("{payment:.2}"),
                quantity.to_string(),
                STATES[rng.below(STATES.len())].to_string(),
            ]
        })
        .collect()
}

fn write_csv(path: &str, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// All columns are written as Utf8, blanks as nulls.
fn write_parquet(path: &str, rows: &[Vec<String>]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = (0..HEADERS.len())
        .map(|c| {
            let values: StringArray = rows
                .iter()
                .map(|row| Some(row[c].as_str()).filter(|s| !s.is_empty()))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = order_rows(&mut rng);

    write_csv("main_dataset.csv", &rows)?;
    write_parquet("main_dataset.parquet", &rows)?;

    println!(
        "Wrote {} order lines to main_dataset.csv and main_dataset.parquet",
        rows.len()
    );
    Ok(())
}
