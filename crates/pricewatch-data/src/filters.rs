use rust_decimal::Decimal;

use crate::DataError;

/// Value of the product-type control meaning "no restriction".
pub const ALL_TYPES: &str = "All";

/// Which slice of the history to return. At most one dimension applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Marketplace(String),
    Manufacturer(String),
    Sku(String),
    PriceRange { min: Decimal, max: Decimal },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub selector: Selector,
    /// `None` keeps every product type.
    pub product_type: Option<String>,
}

impl HistoryFilter {
    /// Build a filter from loosely-typed query inputs.
    ///
    /// Blank strings count as absent, and a product type of `All` means no
    /// type restriction.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidFilter`] when more than one selector is
    /// given, when only one price bound is given, or when `min > max`.
    pub fn from_parts(
        marketplace: Option<&str>,
        manufacturer: Option<&str>,
        sku: Option<&str>,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        product_type: Option<&str>,
    ) -> Result<Self, DataError> {
        let marketplace = non_blank(marketplace);
        let manufacturer = non_blank(manufacturer);
        let sku = non_blank(sku);

        let price_range = match (min_price, max_price) {
            (None, None) => None,
            (Some(min), Some(max)) if min <= max => Some(Selector::PriceRange { min, max }),
            (Some(min), Some(max)) => {
                return Err(DataError::InvalidFilter(format!(
                    "min_price {min} is greater than max_price {max}"
                )))
            }
            _ => {
                return Err(DataError::InvalidFilter(
                    "min_price and max_price must be given together".to_string(),
                ))
            }
        };

        let mut selectors: Vec<Selector> = [
            marketplace.map(Selector::Marketplace),
            manufacturer.map(Selector::Manufacturer),
            sku.map(Selector::Sku),
            price_range,
        ]
        .into_iter()
        .flatten()
        .collect();

        if selectors.len() > 1 {
            return Err(DataError::InvalidFilter(
                "only one of marketplace, manufacturer, sku or price range may be given"
                    .to_string(),
            ));
        }

        let product_type = non_blank(product_type).filter(|t| !t.eq_ignore_ascii_case(ALL_TYPES));

        Ok(Self {
            selector: selectors.pop().unwrap_or_default(),
            product_type,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
