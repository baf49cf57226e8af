pub mod app_config;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod observation;
pub mod price_index;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, BrandStyle, CatalogConfig, DEFAULT_PALETTE};
pub use comparison::{build_comparison_set, comparison_skus, resolve_competitors, ComparisonSet};
pub use config::{load_app_config, load_app_config_from_env};
pub use observation::{product_key, MappingEntry, Observation};
pub use price_index::{
    adjusted_price, compute_comparison, index_members, overall_index, price_index,
    ComparisonResult, IndexError, IndexedObservation, Multipliers, PriceError,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation error: {0}")]
    Validation(String),
}
