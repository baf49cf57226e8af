//! Price index comparison for a single reference product.

use std::str::FromStr;

use pricewatch_core::{ComparisonResult, IndexError, Multipliers};
use pricewatch_data::Dataset;
use rust_decimal::Decimal;

/// Parse a `PRODUCT_KEY=PCT` multiplier argument.
///
/// The key is split at the last `=` so product names containing `=` survive.
pub(crate) fn parse_multiplier(raw: &str) -> Result<(String, Decimal), String> {
    let (key, pct) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PRODUCT_KEY=PCT, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing product key in '{raw}'"));
    }
    let pct = Decimal::from_str(pct.trim())
        .map_err(|e| format!("invalid percentage in '{raw}': {e}"))?;
    Ok((key.to_string(), pct))
}

/// Print the latest-date comparison table for `reference_sku`.
///
/// # Errors
///
/// Returns an error if the SKU was never observed or a price in the set is
/// not positive.
pub(crate) fn run_compare(
    dataset: &Dataset,
    reference_sku: &str,
    multipliers: &Multipliers,
) -> anyhow::Result<()> {
    let result = dataset.compare(reference_sku, multipliers)?;
    print!("{}", render_comparison(&result, !multipliers.is_empty()));
    Ok(())
}

pub(crate) fn format_overall(overall: &Result<Decimal, IndexError>) -> String {
    match overall {
        Ok(value) => value.to_string(),
        Err(IndexError::InsufficientData { .. }) => "N/A (insufficient data)".to_string(),
        Err(e) => format!("N/A ({})", e.code()),
    }
}

fn render_comparison(result: &ComparisonResult, adjusted: bool) -> String {
    let mut out = format!(
        "{} ({}) on {}\n\n",
        result.reference.product_name, result.reference_sku, result.date
    );

    out.push_str(&format!(
        "{:<36}{:<16}{:<16}{:>14}{:>10}",
        "PRODUCT", "MANUFACTURER", "MARKETPLACE", "PRICE", "INDEX"
    ));
    if adjusted {
        out.push_str(&format!("{:>8}{:>14}{:>10}", "ADJ %", "ADJ PRICE", "ADJ INDEX"));
    }
    out.push('\n');

    for row in &result.rows {
        let marker = if row.is_reference { "*" } else { " " };
        out.push_str(&format!(
            "{:<36}{:<16}{:<16}{:>14}{:>10}",
            format!("{marker}{}", row.product_key),
            row.observation.manufacturer,
            row.observation.marketplace,
            row.observation.price.to_string(),
            row.price_index.to_string()
        ));
        if adjusted {
            out.push_str(&format!(
                "{:>8}{:>14}{:>10}",
                row.multiplier_pct.to_string(),
                row.adjusted_price.round_dp(2).to_string(),
                row.adjusted_index.to_string()
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("\noverall index: {}\n", format_overall(&result.overall)));
    if adjusted {
        out.push_str(&format!(
            "adjusted overall index: {}\n",
            format_overall(&result.adjusted_overall)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pricewatch_core::{compute_comparison, ComparisonSet, Observation};

    use super::*;

    fn obs(manufacturer: &str, name: &str, sku: &str, price: i64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(),
            marketplace: "Homecenter".to_string(),
            manufacturer: manufacturer.to_string(),
            product_name: name.to_string(),
            sku: sku.to_string(),
            price: Decimal::new(price, 0),
            currency: "COP".to_string(),
            url: String::new(),
            image_url: None,
            product_type: "Two pieces".to_string(),
            line: None,
        }
    }

    fn result(members: Vec<Observation>, multipliers: &Multipliers) -> ComparisonResult {
        let set = ComparisonSet {
            reference_sku: "135010007".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 4, 1),
            members,
        };
        compute_comparison(&set, multipliers).expect("comparison")
    }

    #[test]
    fn parse_multiplier_accepts_key_and_percentage() {
        assert_eq!(
            parse_multiplier("Viper_N2420=-12.5").unwrap(),
            ("Viper_N2420".to_string(), Decimal::new(-125, 1))
        );
    }

    #[test]
    fn parse_multiplier_splits_on_last_equals() {
        let (key, pct) = parse_multiplier("A=B_1=10").unwrap();
        assert_eq!(key, "A=B_1");
        assert_eq!(pct, Decimal::TEN);
    }

    #[test]
    fn parse_multiplier_rejects_malformed_input() {
        assert!(parse_multiplier("Viper_N2420").is_err());
        assert!(parse_multiplier("=5").is_err());
        assert!(parse_multiplier("Viper_N2420=lots").is_err());
    }

    #[test]
    fn reference_only_comparison_prints_not_available() {
        let r = result(vec![obs("Mansfield", "Elongado", "135010007", 100)], &Multipliers::new());
        let out = render_comparison(&r, false);
        assert!(out.contains("overall index: N/A (insufficient data)"));
        assert!(out.contains("*Elongado_135010007"));
    }

    #[test]
    fn comparison_table_shows_index_and_overall() {
        let r = result(
            vec![
                obs("Mansfield", "Elongado", "135010007", 100),
                obs("Gerber", "Viper", "N2420", 125),
            ],
            &Multipliers::new(),
        );
        let out = render_comparison(&r, false);
        assert!(out.starts_with("Elongado (135010007) on 2022-04-01"));
        assert!(out.contains("80.00"));
        assert!(out.contains("overall index: 80.00"));
        assert!(!out.contains("ADJ INDEX"));
    }

    #[test]
    fn adjusted_columns_appear_with_multipliers() {
        let mut m = Multipliers::new();
        m.set("Viper_N2420", Decimal::new(-20, 0));
        let r = result(
            vec![
                obs("Mansfield", "Elongado", "135010007", 100),
                obs("Gerber", "Viper", "N2420", 125),
            ],
            &m,
        );
        let out = render_comparison(&r, true);
        assert!(out.contains("ADJ INDEX"));
        assert!(out.contains("adjusted overall index: 100.00"));
    }
}
