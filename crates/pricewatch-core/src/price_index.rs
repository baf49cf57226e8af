//! Price index arithmetic over a [`ComparisonSet`].
//!
//! A member's index is `reference_price / price * 100`, rounded to two
//! decimals with banker's rounding. The reference therefore always scores
//! exactly `100.00`; competitors priced above the reference score below 100.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::comparison::ComparisonSet;
use crate::observation::Observation;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A price that cannot sit in an index ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must be greater than zero, got {0}")]
    NonPositive(Decimal),

    #[error("price arithmetic is out of range")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("invalid price {price} for {product_key}: price must be greater than zero")]
    InvalidPrice { product_key: String, price: Decimal },

    #[error("insufficient data: an overall index needs at least 2 members, got {count}")]
    InsufficientData { count: usize },

    #[error("reference {reference_sku} has no observation on the comparison date")]
    MissingReference { reference_sku: String },

    #[error("{subject} is out of range")]
    Overflow { subject: String },
}

impl IndexError {
    /// Stable machine-readable code for API payloads.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::InvalidPrice { .. } => "invalid_price",
            IndexError::InsufficientData { .. } => "insufficient_data",
            IndexError::MissingReference { .. } => "missing_reference",
            IndexError::Overflow { .. } => "out_of_range",
        }
    }

    fn from_price(product_key: &str, error: PriceError) -> Self {
        match error {
            PriceError::NonPositive(price) => IndexError::InvalidPrice {
                product_key: product_key.to_string(),
                price,
            },
            PriceError::Overflow => IndexError::Overflow {
                subject: format!("price of {product_key}"),
            },
        }
    }
}

fn round_percent(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// `round(reference_price / price * 100, 2)`.
///
/// # Errors
///
/// Returns [`PriceError::NonPositive`] when either price is zero or negative,
/// and [`PriceError::Overflow`] when the ratio does not fit a `Decimal`.
pub fn price_index(reference_price: Decimal, price: Decimal) -> Result<Decimal, PriceError> {
    if price <= Decimal::ZERO {
        return Err(PriceError::NonPositive(price));
    }
    if reference_price <= Decimal::ZERO {
        return Err(PriceError::NonPositive(reference_price));
    }
    reference_price
        .checked_div(price)
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
        .map(round_percent)
        .ok_or(PriceError::Overflow)
}

/// Index every member against `reference_price`, in member order.
///
/// An empty slice yields an empty vector.
///
/// # Errors
///
/// Returns [`IndexError::InvalidPrice`] naming the first member (or the
/// reference) whose price is not positive.
pub fn index_members(
    members: &[Observation],
    reference_price: Decimal,
) -> Result<Vec<Decimal>, IndexError> {
    members
        .iter()
        .map(|member| {
            price_index(reference_price, member.price)
                .map_err(|e| IndexError::from_price(&member.product_key(), e))
        })
        .collect()
}

/// `round((sum(|index_i|) - 100) / (count - 1), 2)`.
///
/// `indices` includes the reference's own `100`, which the formula takes back
/// out of both the numerator and the denominator.
///
/// # Errors
///
/// Returns [`IndexError::InsufficientData`] when fewer than two indices are
/// given, since there is no competitor to average, and
/// [`IndexError::Overflow`] when the sum does not fit a `Decimal`.
pub fn overall_index(indices: &[Decimal]) -> Result<Decimal, IndexError> {
    let count = indices.len();
    if count < 2 {
        return Err(IndexError::InsufficientData { count });
    }
    let denominator = Decimal::from(count - 1);
    indices
        .iter()
        .try_fold(Decimal::ZERO, |total, i| total.checked_add(i.abs()))
        .and_then(|total| total.checked_sub(ONE_HUNDRED))
        .and_then(|excess| excess.checked_div(denominator))
        .map(round_percent)
        .ok_or_else(|| IndexError::Overflow {
            subject: "overall index".to_string(),
        })
}

/// `price * (1 + multiplier_pct / 100)`.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] when the adjusted price does not fit a
/// `Decimal`.
pub fn adjusted_price(price: Decimal, multiplier_pct: Decimal) -> Result<Decimal, PriceError> {
    multiplier_pct
        .checked_div(ONE_HUNDRED)
        .and_then(|fraction| Decimal::ONE.checked_add(fraction))
        .and_then(|factor| price.checked_mul(factor))
        .ok_or(PriceError::Overflow)
}

/// Per-product percentage multipliers keyed by product key. Products without
/// an entry use `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multipliers(BTreeMap<String, Decimal>);

impl Multipliers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, product_key: impl Into<String>, multiplier_pct: Decimal) {
        self.0.insert(product_key.into(), multiplier_pct);
    }

    #[must_use]
    pub fn get(&self, product_key: &str) -> Decimal {
        self.0.get(product_key).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `price` scaled by the multiplier registered for `product_key`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Overflow`] when the adjusted price does not fit a
    /// `Decimal`.
    pub fn adjust(&self, product_key: &str, price: Decimal) -> Result<Decimal, IndexError> {
        adjusted_price(price, self.get(product_key))
            .map_err(|e| IndexError::from_price(product_key, e))
    }
}

impl FromIterator<(String, Decimal)> for Multipliers {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One comparison member with its raw and multiplier-adjusted index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedObservation {
    pub product_key: String,
    pub is_reference: bool,
    pub observation: Observation,
    pub price_index: Decimal,
    pub multiplier_pct: Decimal,
    pub adjusted_price: Decimal,
    pub adjusted_index: Decimal,
}

/// Indexed comparison at a single date.
///
/// The overall figures keep their own `Result` so that a comparison with no
/// competitors still reports its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub reference_sku: String,
    pub date: NaiveDate,
    pub reference: Observation,
    pub rows: Vec<IndexedObservation>,
    pub overall: Result<Decimal, IndexError>,
    pub adjusted_overall: Result<Decimal, IndexError>,
}

/// Index a comparison set, raw and with `multipliers` applied.
///
/// # Errors
///
/// Returns [`IndexError::MissingReference`] when the set has no reference
/// observation, [`IndexError::InvalidPrice`] when any raw or adjusted price is
/// not positive, and [`IndexError::Overflow`] when a multiplier pushes a price
/// or index out of `Decimal` range.
pub fn compute_comparison(
    set: &ComparisonSet,
    multipliers: &Multipliers,
) -> Result<ComparisonResult, IndexError> {
    let (Some(reference), Some(date)) = (set.reference(), set.date) else {
        return Err(IndexError::MissingReference {
            reference_sku: set.reference_sku.clone(),
        });
    };

    let raw = index_members(&set.members, reference.price)?;

    let reference_key = reference.product_key();
    let adjusted_reference = multipliers.adjust(&reference_key, reference.price)?;
    if adjusted_reference <= Decimal::ZERO {
        return Err(IndexError::InvalidPrice {
            product_key: reference_key,
            price: adjusted_reference,
        });
    }

    let mut rows = Vec::with_capacity(set.members.len());
    for (member, price_index_value) in set.members.iter().zip(raw) {
        let product_key = member.product_key();
        let multiplier_pct = multipliers.get(&product_key);
        let adjusted = adjusted_price(member.price, multiplier_pct)
            .and_then(|adjusted| {
                price_index(adjusted_reference, adjusted).map(|index| (adjusted, index))
            });
        let (adjusted, adjusted_index) =
            adjusted.map_err(|e| IndexError::from_price(&product_key, e))?;
        rows.push(IndexedObservation {
            is_reference: member.sku == set.reference_sku,
            product_key,
            observation: member.clone(),
            price_index: price_index_value,
            multiplier_pct,
            adjusted_price: adjusted,
            adjusted_index,
        });
    }

    let raw_indices: Vec<Decimal> = rows.iter().map(|r| r.price_index).collect();
    let adjusted_indices: Vec<Decimal> = rows.iter().map(|r| r.adjusted_index).collect();

    Ok(ComparisonResult {
        reference_sku: set.reference_sku.clone(),
        date,
        reference: reference.clone(),
        overall: overall_index(&raw_indices),
        adjusted_overall: overall_index(&adjusted_indices),
        rows,
    })
}

#[cfg(test)]
#[path = "price_index_test.rs"]
mod tests;
