//! Price history listing.

use pricewatch_core::Observation;
use pricewatch_data::{Dataset, HistoryFilter};

/// Print every observation matching `filter` as a fixed-width table.
///
/// # Errors
///
/// Returns an error if a SKU filter names an unknown SKU.
pub(crate) fn run_history(dataset: &Dataset, filter: &HistoryFilter) -> anyhow::Result<()> {
    let rows = dataset.history(filter)?;
    if rows.is_empty() {
        println!("no observations match the given filter");
        return Ok(());
    }
    print!("{}", render_history(&rows));
    Ok(())
}

fn render_history(rows: &[&Observation]) -> String {
    let mut out = format!(
        "{:<12}{:<16}{:<16}{:<36}{:<16}{:>14} {}\n",
        "DATE", "MARKETPLACE", "MANUFACTURER", "PRODUCT", "SKU", "PRICE", "CURRENCY"
    );
    for o in rows {
        out.push_str(&format!(
            "{:<12}{:<16}{:<16}{:<36}{:<16}{:>14} {}\n",
            o.date.to_string(),
            o.marketplace,
            o.manufacturer,
            o.product_name,
            o.sku,
            o.price.to_string(),
            o.currency
        ));
    }
    out
}
