//! Comparison-set resolution: which observations are compared against a
//! reference-brand product, and on which date.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::observation::{MappingEntry, Observation};

/// Competitor SKUs mapped to `reference_sku` in the master table.
///
/// The reference SKU itself is never returned, even when the master table
/// maps it onto itself. An unmapped reference yields an empty set.
#[must_use]
pub fn resolve_competitors(mapping: &[MappingEntry], reference_sku: &str) -> BTreeSet<String> {
    let reference_sku = reference_sku.trim();
    mapping
        .iter()
        .filter(|entry| entry.reference_sku == reference_sku && entry.sku != reference_sku)
        .map(|entry| entry.sku.clone())
        .collect()
}

/// Every SKU taking part in a comparison: the mapped competitors plus the
/// reference itself.
#[must_use]
pub fn comparison_skus(mapping: &[MappingEntry], reference_sku: &str) -> BTreeSet<String> {
    let mut skus = resolve_competitors(mapping, reference_sku);
    skus.insert(reference_sku.trim().to_string());
    skus
}

/// The reference product and its competitors as observed on the most recent
/// date any of them was scraped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSet {
    pub reference_sku: String,
    /// `None` only when no observation exists for any SKU of the comparison.
    pub date: Option<NaiveDate>,
    pub members: Vec<Observation>,
}

impl ComparisonSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// The reference observation. When the reference was scraped on several
    /// marketplaces that day, the first one in load order wins.
    #[must_use]
    pub fn reference(&self) -> Option<&Observation> {
        self.members.iter().find(|o| o.sku == self.reference_sku)
    }
}

/// Assemble the comparison set for `reference_sku` from loaded observations.
#[must_use]
pub fn build_comparison_set(
    observations: &[Observation],
    mapping: &[MappingEntry],
    reference_sku: &str,
) -> ComparisonSet {
    let skus = comparison_skus(mapping, reference_sku);
    let related: Vec<&Observation> = observations
        .iter()
        .filter(|o| skus.contains(&o.sku))
        .collect();

    let date = related.iter().map(|o| o.date).max();
    let members = match date {
        Some(latest) => related
            .into_iter()
            .filter(|o| o.date == latest)
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    ComparisonSet {
        reference_sku: reference_sku.trim().to_string(),
        date,
        members,
    }
}
