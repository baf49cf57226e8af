use std::collections::HashSet;

use chrono::NaiveDate;
use pricewatch_core::{
    build_comparison_set, comparison_skus, compute_comparison, CatalogConfig, ComparisonResult,
    ComparisonSet, MappingEntry, Multipliers, Observation,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::filters::{HistoryFilter, Selector};
use crate::DataError;

/// Counters describing the last load, reported by health checks and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub files_loaded: usize,
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub observation_count: usize,
    pub mapping_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Distinct values for populating filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub marketplaces: Vec<String>,
    pub manufacturers: Vec<String>,
    pub product_types: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub latest_date: Option<NaiveDate>,
}

/// Observations and mapping entries loaded for one session.
///
/// Observations are deduplicated on every field and stably ordered by date,
/// so the last observation of a product is its most recent one.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    mapping: Vec<MappingEntry>,
    stats: LoadStats,
}

impl Dataset {
    #[must_use]
    pub fn new(observations: Vec<Observation>, mapping: Vec<MappingEntry>) -> Self {
        Self::with_files_loaded(observations, mapping, 0)
    }

    pub(crate) fn with_files_loaded(
        observations: Vec<Observation>,
        mapping: Vec<MappingEntry>,
        files_loaded: usize,
    ) -> Self {
        let rows_read = observations.len();
        let mut observations = dedup_observations(observations);
        observations.sort_by_key(|o| o.date);

        let stats = LoadStats {
            files_loaded,
            rows_read,
            duplicates_dropped: rows_read - observations.len(),
            observation_count: observations.len(),
            mapping_count: mapping.len(),
            first_date: observations.first().map(|o| o.date),
            last_date: observations.last().map(|o| o.date),
        };

        Self {
            observations,
            mapping,
            stats,
        }
    }

    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    #[must_use]
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    #[must_use]
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.stats.last_date
    }

    #[must_use]
    pub fn has_sku(&self, sku: &str) -> bool {
        let sku = sku.trim();
        self.observations.iter().any(|o| o.sku == sku)
    }

    /// Distinct filter values. The price bounds cover the latest date only.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        let latest = self.latest_date();
        let latest_prices: Vec<Decimal> = self
            .observations
            .iter()
            .filter(|o| Some(o.date) == latest)
            .map(|o| o.price)
            .collect();
        FilterOptions {
            marketplaces: distinct(self.observations.iter().map(|o| o.marketplace.as_str())),
            manufacturers: distinct(self.observations.iter().map(|o| o.manufacturer.as_str())),
            product_types: distinct(self.observations.iter().map(|o| o.product_type.as_str())),
            min_price: latest_prices.iter().min().copied(),
            max_price: latest_prices.iter().max().copied(),
            latest_date: latest,
        }
    }

    /// Observations matching `filter`, across all dates.
    ///
    /// A price range keeps the products whose observation on the dataset's
    /// latest date falls inside the range, then returns their whole history.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownSku`] when a SKU selector matches nothing.
    pub fn history(&self, filter: &HistoryFilter) -> Result<Vec<&Observation>, DataError> {
        let selected: Vec<&Observation> = match &filter.selector {
            Selector::All => self.observations.iter().collect(),
            Selector::Marketplace(m) => self
                .observations
                .iter()
                .filter(|o| &o.marketplace == m)
                .collect(),
            Selector::Manufacturer(b) => self
                .observations
                .iter()
                .filter(|o| &o.manufacturer == b)
                .collect(),
            Selector::Sku(sku) => {
                let rows: Vec<&Observation> =
                    self.observations.iter().filter(|o| &o.sku == sku).collect();
                if rows.is_empty() {
                    return Err(DataError::UnknownSku(sku.clone()));
                }
                rows
            }
            Selector::PriceRange { min, max } => {
                let Some(latest) = self.latest_date() else {
                    return Ok(Vec::new());
                };
                let keys: HashSet<String> = self
                    .observations
                    .iter()
                    .filter(|o| o.date == latest && o.price >= *min && o.price <= *max)
                    .map(Observation::product_key)
                    .collect();
                self.observations
                    .iter()
                    .filter(|o| keys.contains(&o.product_key()))
                    .collect()
            }
        };

        Ok(match &filter.product_type {
            Some(t) => selected
                .into_iter()
                .filter(|o| &o.product_type == t)
                .collect(),
            None => selected,
        })
    }

    /// Most recent observation of a product key.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownProduct`] if the key never occurs.
    pub fn latest_for_product(&self, product_key: &str) -> Result<&Observation, DataError> {
        self.observations
            .iter()
            .rev()
            .find(|o| o.product_key() == product_key)
            .ok_or_else(|| DataError::UnknownProduct(product_key.to_string()))
    }

    /// Latest observation of every distinct product of the catalog's
    /// reference brand, in the order the products first appear.
    #[must_use]
    pub fn reference_products(
        &self,
        catalog: &CatalogConfig,
        product_type: Option<&str>,
    ) -> Vec<&Observation> {
        let mut names: Vec<&str> = Vec::new();
        for o in &self.observations {
            if catalog.is_reference_brand(&o.manufacturer)
                && product_type.is_none_or(|t| o.product_type == t)
                && !names.contains(&o.product_name.as_str())
            {
                names.push(&o.product_name);
            }
        }

        names
            .into_iter()
            .filter_map(|name| {
                self.observations.iter().rev().find(|o| {
                    o.product_name == name && catalog.is_reference_brand(&o.manufacturer)
                })
            })
            .collect()
    }

    /// Comparison set for `reference_sku` at its latest observation date.
    #[must_use]
    pub fn comparison_set(&self, reference_sku: &str) -> ComparisonSet {
        build_comparison_set(&self.observations, &self.mapping, reference_sku)
    }

    /// Index the comparison set of `reference_sku`, raw and with
    /// `multipliers` applied.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownSku`] when the reference SKU was never
    /// observed, and [`DataError::Index`] when the set cannot be indexed.
    pub fn compare(
        &self,
        reference_sku: &str,
        multipliers: &Multipliers,
    ) -> Result<ComparisonResult, DataError> {
        if !self.has_sku(reference_sku) {
            return Err(DataError::UnknownSku(reference_sku.trim().to_string()));
        }
        let set = self.comparison_set(reference_sku);
        tracing::debug!(
            reference_sku = %set.reference_sku,
            members = set.len(),
            "comparison set resolved"
        );
        Ok(compute_comparison(&set, multipliers)?)
    }

    /// Every observation, across all dates, of the SKUs compared against
    /// `reference_sku` (including the reference itself).
    #[must_use]
    pub fn comparison_history(&self, reference_sku: &str) -> Vec<&Observation> {
        let skus = comparison_skus(&self.mapping, reference_sku);
        self.observations
            .iter()
            .filter(|o| skus.contains(&o.sku))
            .collect()
    }
}

/// Drop exact duplicate rows, keeping the first occurrence.
fn dedup_observations(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = HashSet::with_capacity(observations.len());
    observations
        .into_iter()
        .filter(|o| seen.insert(o.clone()))
        .collect()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
