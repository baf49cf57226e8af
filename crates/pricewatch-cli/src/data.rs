//! Dataset inspection commands for the CLI.

use clap::Subcommand;
use pricewatch_core::AppConfig;
use pricewatch_data::LoadStats;

/// Sub-commands available under `data`.
#[derive(Debug, Subcommand)]
pub enum DataCommands {
    /// Load observation files and the mapping table, then print load statistics
    Check,
}

/// Load the configured dataset and print what was read.
///
/// # Errors
///
/// Returns an error if any observation file or the mapping table cannot be
/// loaded.
pub(crate) fn run_data_check(config: &AppConfig) -> anyhow::Result<()> {
    let dataset = crate::load_dataset(config)?;
    print!("{}", render_stats(dataset.stats()));
    Ok(())
}

fn render_stats(stats: &LoadStats) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    let mut out = String::new();
    out.push_str(&format!("{:<22}{}\n", "files loaded", stats.files_loaded));
    out.push_str(&format!("{:<22}{}\n", "rows read", stats.rows_read));
    out.push_str(&format!("{:<22}{}\n", "duplicates dropped", stats.duplicates_dropped));
    out.push_str(&format!("{:<22}{}\n", "observations", stats.observation_count));
    out.push_str(&format!("{:<22}{}\n", "mapping entries", stats.mapping_count));
    out.push_str(&format!(
        "{:<22}{} .. {}\n",
        "date range",
        date(stats.first_date),
        date(stats.last_date)
    ));
    out
}
