//! Data layer: loading, normalization, caching, filtering and export.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read file → RawTable (text cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  required columns, types, imputation → Dataset
//!   └───────────┘
//!        │          (held in `cache`, keyed by path + fingerprint)
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range + categories → FilteredView (row indices)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  FilteredView → CSV
//!   └──────────┘
//! ```

pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
