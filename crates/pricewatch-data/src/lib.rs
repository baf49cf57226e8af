//! Flat-file data layer: loads scraped observations and the master mapping
//! table into an explicit [`Dataset`], and answers the dashboard's read
//! queries over it.

pub mod card;
pub mod dataset;
pub mod filters;
pub mod loader;
pub mod series;

use std::path::PathBuf;

use thiserror::Error;

pub use card::{format_price, ProductCard};
pub use dataset::{Dataset, FilterOptions, LoadStats};
pub use filters::{HistoryFilter, Selector};
pub use loader::{load_dataset, load_mapping, load_observations};
pub use series::{adjusted_price_series, price_series, PriceSeries, SeriesPoint};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid {field} in {} record {record}: {reason}", .path.display())]
    InvalidField {
        path: PathBuf,
        record: usize,
        field: &'static str,
        reason: String,
    },

    #[error("no observation files found under {}", .0.display())]
    NoObservationFiles(PathBuf),

    #[error("SKU {0} not found in dataset")]
    UnknownSku(String),

    #[error("product {0} not found in dataset")]
    UnknownProduct(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Index(#[from] pricewatch_core::IndexError),
}

impl DataError {
    /// Stable machine-readable code for API payloads and CLI output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DataError::UnknownSku(_) | DataError::UnknownProduct(_) => "not_found",
            DataError::InvalidFilter(_) => "validation_error",
            DataError::Index(e) => e.code(),
            DataError::Io { .. }
            | DataError::Csv { .. }
            | DataError::InvalidField { .. }
            | DataError::NoObservationFiles(_) => "load_error",
        }
    }
}
