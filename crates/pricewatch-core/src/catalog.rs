use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Fallback line colors for manufacturers without a configured color.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "rgba(255,127,0, 1)",
    "rgba(44, 160, 44, 1)",
    "rgba(214, 39, 40, 1)",
    "rgba(148, 103, 189, 1)",
    "rgba(140, 86, 75, 1)",
    "rgba(227, 119, 194, 1)",
    "rgba(127, 127, 127, 1)",
    "rgba(188, 189, 34, 1)",
    "rgba(23, 190, 207,1)",
    "rgba(31, 119, 180, 1)",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandStyle {
    pub name: String,
    pub color: String,
}

/// Which brand is the pricing baseline, which of its SKUs appear on the
/// summary view, and how each manufacturer is drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub reference_brand: String,
    #[serde(default)]
    pub summary_skus: Vec<String>,
    #[serde(default)]
    pub brands: Vec<BrandStyle>,
}

impl CatalogConfig {
    /// Configured color for `manufacturer`, or the palette entry at `slot`
    /// (wrapping) when the manufacturer has none.
    #[must_use]
    pub fn color_for(&self, manufacturer: &str, slot: usize) -> &str {
        self.brands
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(manufacturer))
            .map_or(DEFAULT_PALETTE[slot % DEFAULT_PALETTE.len()], |b| {
                b.color.as_str()
            })
    }

    #[must_use]
    pub fn is_reference_brand(&self, manufacturer: &str) -> bool {
        self.reference_brand.eq_ignore_ascii_case(manufacturer.trim())
    }
}

/// Load and validate the catalog configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut catalog: CatalogConfig = serde_yaml::from_str(&content)?;
    for sku in &mut catalog.summary_skus {
        *sku = sku.trim().to_string();
    }

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.reference_brand.trim().is_empty() {
        return Err(ConfigError::Validation(
            "reference_brand must be non-empty".to_string(),
        ));
    }

    let mut seen_skus = HashSet::new();
    for sku in &catalog.summary_skus {
        if sku.is_empty() {
            return Err(ConfigError::Validation(
                "summary SKU must be non-empty".to_string(),
            ));
        }
        if !seen_skus.insert(sku.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate summary SKU: '{sku}'"
            )));
        }
    }

    let mut seen_names = HashSet::new();
    for brand in &catalog.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }
        if brand.color.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has an empty color",
                brand.name
            )));
        }
        if !seen_names.insert(brand.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
