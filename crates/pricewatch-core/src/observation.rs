use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One scraped price record for a product on a marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub marketplace: String,
    pub manufacturer: String,
    pub product_name: String,
    /// SKU in string form, e.g. `"135010007"` or `"4021.101N.020"`.
    pub sku: String,
    pub price: Decimal,
    /// Currency code as exported by the scraper, e.g. `"COP"`.
    pub currency: String,
    pub url: String,
    pub image_url: Option<String>,
    pub product_type: String,
    /// Product line, when the export carries one.
    pub line: Option<String>,
}

impl Observation {
    /// Composite identifier joining product name and SKU.
    #[must_use]
    pub fn product_key(&self) -> String {
        product_key(&self.product_name, &self.sku)
    }
}

/// Joins a product name and SKU into the `name_sku` identifier used to group
/// observations of the same product across scrape dates.
#[must_use]
pub fn product_key(product_name: &str, sku: &str) -> String {
    format!("{product_name}_{sku}")
}

/// A master-table row pointing a competitor SKU at its homologous
/// reference-brand SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub sku: String,
    pub reference_sku: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_joins_name_and_sku() {
        assert_eq!(
            product_key("Sanitario Mansfield Elongado", "135010007"),
            "Sanitario Mansfield Elongado_135010007"
        );
    }

    #[test]
    fn observation_product_key_matches_free_function() {
        let obs = Observation {
            date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            marketplace: "Homecenter".to_string(),
            manufacturer: "Gerber".to_string(),
            product_name: "Viper".to_string(),
            sku: "N2420".to_string(),
            price: Decimal::new(459_900, 0),
            currency: "COP".to_string(),
            url: "https://example.com/viper".to_string(),
            image_url: None,
            product_type: "Two pieces".to_string(),
            line: None,
        };
        assert_eq!(obs.product_key(), "Viper_N2420");
    }

    #[test]
    fn identical_observations_hash_equal_despite_price_scale() {
        use std::collections::HashSet;

        let base = Observation {
            date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            marketplace: "Easy".to_string(),
            manufacturer: "Mansfield".to_string(),
            product_name: "Alto".to_string(),
            sku: "130010007".to_string(),
            price: Decimal::new(1000, 0),
            currency: "COP".to_string(),
            url: String::new(),
            image_url: None,
            product_type: "One piece".to_string(),
            line: None,
        };
        let mut rescaled = base.clone();
        rescaled.price = Decimal::new(10000, 1);

        let set: HashSet<Observation> = [base, rescaled].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
