//! Markdown price index report.

use chrono::Utc;
use pricewatch_core::{CatalogConfig, Multipliers};
use pricewatch_data::Dataset;

use crate::compare::format_overall;

/// Print a markdown report with one section per catalog summary SKU.
///
/// References that cannot be indexed get an inline note instead of aborting
/// the report.
pub(crate) fn run_summary(dataset: &Dataset, catalog: &CatalogConfig) {
    print!("{}", render_summary(dataset, catalog));
}

fn render_summary(dataset: &Dataset, catalog: &CatalogConfig) -> String {
    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let through = dataset
        .latest_date()
        .map_or_else(|| "-".to_string(), |d| d.to_string());

    let mut out = String::from("# Price Index Summary\n\n");
    out.push_str(&format!("**Generated**: {now}\n"));
    out.push_str(&format!("**Reference brand**: {}\n", catalog.reference_brand));
    out.push_str(&format!("**Data through**: {through}\n\n---\n"));

    if catalog.summary_skus.is_empty() {
        out.push_str("\n_No summary SKUs configured._\n");
        return out;
    }

    let multipliers = Multipliers::new();
    for sku in &catalog.summary_skus {
        out.push('\n');
        match dataset.compare(sku, &multipliers) {
            Ok(result) => {
                out.push_str(&format!(
                    "## {} ({}), {}\n\n",
                    result.reference.product_name, sku, result.date
                ));
                out.push_str("| Product | Manufacturer | Marketplace | Price | Index |\n");
                out.push_str("|---------|--------------|-------------|-------|-------|\n");
                for row in &result.rows {
                    out.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        row.product_key,
                        row.observation.manufacturer,
                        row.observation.marketplace,
                        row.observation.price,
                        row.price_index
                    ));
                }
                out.push_str(&format!(
                    "\n**Overall index**: {}\n",
                    format_overall(&result.overall)
                ));
            }
            Err(e) => {
                tracing::warn!(reference_sku = %sku, error = %e, "summary: reference skipped");
                out.push_str(&format!("## {sku}\n\n_Not available ({}): {e}_\n", e.code()));
            }
        }
    }

    out
}
