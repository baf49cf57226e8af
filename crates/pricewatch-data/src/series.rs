//! Chart-ready price series, one line per product key.

use std::convert::Infallible;

use chrono::NaiveDate;
use pricewatch_core::{CatalogConfig, IndexError, Multipliers, Observation};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSeries {
    /// Product key (`name_sku`).
    pub name: String,
    pub manufacturer: String,
    pub color: String,
    pub points: Vec<SeriesPoint>,
}

/// Group observations into one series per product key, in the order the
/// products first appear. Each series is colored by its manufacturer, or by
/// the fallback palette slot of its position.
#[must_use]
pub fn price_series<'a, I>(observations: I, catalog: &CatalogConfig) -> Vec<PriceSeries>
where
    I: IntoIterator<Item = &'a Observation>,
{
    build_series(observations, catalog, |_, price| Ok::<_, Infallible>(price))
        .unwrap_or_else(|never| match never {})
}

/// Same grouping as [`price_series`], with each price scaled by the
/// product's multiplier.
///
/// # Errors
///
/// Returns [`IndexError::Overflow`] when a multiplier pushes a price out of
/// `Decimal` range.
pub fn adjusted_price_series<'a, I>(
    observations: I,
    catalog: &CatalogConfig,
    multipliers: &Multipliers,
) -> Result<Vec<PriceSeries>, IndexError>
where
    I: IntoIterator<Item = &'a Observation>,
{
    build_series(observations, catalog, |key, price| multipliers.adjust(key, price))
}

fn build_series<'a, I, F, E>(
    observations: I,
    catalog: &CatalogConfig,
    value: F,
) -> Result<Vec<PriceSeries>, E>
where
    I: IntoIterator<Item = &'a Observation>,
    F: Fn(&str, Decimal) -> Result<Decimal, E>,
{
    let mut series: Vec<PriceSeries> = Vec::new();
    for o in observations {
        let key = o.product_key();
        let point = SeriesPoint {
            date: o.date,
            value: value(&key, o.price)?,
        };
        if let Some(existing) = series.iter_mut().find(|s| s.name == key) {
            existing.points.push(point);
        } else {
            let slot = series.len();
            series.push(PriceSeries {
                color: catalog.color_for(&o.manufacturer, slot).to_string(),
                manufacturer: o.manufacturer.clone(),
                name: key,
                points: vec![point],
            });
        }
    }
    Ok(series)
}
