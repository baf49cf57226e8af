use pricewatch_core::Observation;
use rust_decimal::Decimal;
use serde::Serialize;

/// Info card for one product at its latest observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub product_key: String,
    pub name: String,
    pub sku: String,
    pub manufacturer: String,
    pub marketplace: String,
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub image_url: Option<String>,
    pub date: chrono::NaiveDate,
    /// `"{name} ({sku}) ${price} {currency}"`.
    pub caption: String,
}

impl From<&Observation> for ProductCard {
    fn from(o: &Observation) -> Self {
        let caption = format!(
            "{} ({}) ${} {}",
            o.product_name,
            o.sku,
            format_price(o.price),
            o.currency
        );
        Self {
            product_key: o.product_key(),
            name: o.product_name.clone(),
            sku: o.sku.clone(),
            manufacturer: o.manufacturer.clone(),
            marketplace: o.marketplace.clone(),
            price: o.price,
            currency: o.currency.clone(),
            url: o.url.clone(),
            image_url: o.image_url.clone(),
            date: o.date,
            caption,
        }
    }
}

/// Render a price with `.` as thousands separator and `,` before any
/// non-zero decimals: `389900` becomes `389.900`, `1234.5` becomes `1.234,50`.
#[must_use]
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let whole = rounded.abs().trunc();
    let fraction = rounded.abs() - whole;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_zero() {
        let mut cents = fraction * Decimal::ONE_HUNDRED;
        cents.rescale(0);
        out.push(',');
        if cents < Decimal::TEN {
            out.push('0');
        }
        out.push_str(&cents.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn format_price_groups_thousands_with_dots() {
        assert_eq!(format_price(Decimal::new(389_900, 0)), "389.900");
        assert_eq!(format_price(Decimal::new(1_459_900, 0)), "1.459.900");
        assert_eq!(format_price(Decimal::new(999, 0)), "999");
        assert_eq!(format_price(Decimal::ZERO), "0");
    }

    #[test]
    fn format_price_drops_zero_fraction() {
        assert_eq!(format_price(Decimal::new(3_899_000, 1)), "389.900");
    }

    #[test]
    fn format_price_keeps_cents() {
        assert_eq!(format_price(Decimal::new(12_345, 1)), "1.234,50");
        assert_eq!(format_price(Decimal::new(105, 2)), "1,05");
    }

    #[test]
    fn card_caption_names_product_sku_and_price() {
        let o = Observation {
            date: NaiveDate::from_ymd_opt(2022, 8, 1).unwrap(),
            marketplace: "Homecenter".to_string(),
            manufacturer: "Mansfield".to_string(),
            product_name: "Sanitario Elongado".to_string(),
            sku: "135010007".to_string(),
            price: Decimal::new(389_900, 0),
            currency: "COP".to_string(),
            url: "https://example.com/p/135010007".to_string(),
            image_url: Some("https://example.com/i/135010007.jpg".to_string()),
            product_type: "Two pieces".to_string(),
            line: None,
        };
        let card = ProductCard::from(&o);
        assert_eq!(card.caption, "Sanitario Elongado (135010007) $389.900 COP");
        assert_eq!(card.product_key, "Sanitario Elongado_135010007");
        assert_eq!(card.image_url.as_deref(), Some("https://example.com/i/135010007.jpg"));
    }
}
