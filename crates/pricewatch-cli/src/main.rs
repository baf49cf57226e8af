mod compare;
mod data;
mod history;
mod summary;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pricewatch_core::{AppConfig, Multipliers};
use pricewatch_data::Dataset;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::compare::parse_multiplier;
use crate::data::DataCommands;

#[derive(Debug, Parser)]
#[command(name = "pricewatch-cli")]
#[command(about = "Competitor price tracking and price index reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dataset inspection commands
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Print the price history of products matching one filter
    History {
        /// Restrict to one marketplace
        #[arg(long, conflicts_with_all = ["manufacturer", "sku", "min_price"])]
        marketplace: Option<String>,

        /// Restrict to one manufacturer
        #[arg(long, conflicts_with_all = ["sku", "min_price"])]
        manufacturer: Option<String>,

        /// Restrict to one SKU
        #[arg(long, conflicts_with = "min_price")]
        sku: Option<String>,

        /// Lower bound on the latest price (requires --max-price)
        #[arg(long, requires = "max_price")]
        min_price: Option<Decimal>,

        /// Upper bound on the latest price (requires --min-price)
        #[arg(long, requires = "min_price")]
        max_price: Option<Decimal>,

        /// Restrict to one product type; `All` disables the restriction
        #[arg(long)]
        product_type: Option<String>,
    },
    /// Price index of a reference product against its competitors
    Compare {
        /// Reference-brand SKU
        #[arg(long)]
        sku: String,

        /// Percentage adjustment for one product, as `PRODUCT_KEY=PCT`
        #[arg(long = "multiplier", value_parser = parse_multiplier)]
        multipliers: Vec<(String, Decimal)>,
    },
    /// Markdown price index report over the catalog's summary SKUs
    Summary,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pricewatch-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = pricewatch_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Data {
            command: DataCommands::Check,
        } => data::run_data_check(&config),
        Commands::History {
            marketplace,
            manufacturer,
            sku,
            min_price,
            max_price,
            product_type,
        } => {
            let filter = pricewatch_data::HistoryFilter::from_parts(
                marketplace.as_deref(),
                manufacturer.as_deref(),
                sku.as_deref(),
                min_price,
                max_price,
                product_type.as_deref(),
            )?;
            history::run_history(&load_dataset(&config)?, &filter)
        }
        Commands::Compare { sku, multipliers } => {
            let multipliers: Multipliers = multipliers.into_iter().collect();
            compare::run_compare(&load_dataset(&config)?, &sku, &multipliers)
        }
        Commands::Summary => {
            let catalog = pricewatch_core::load_catalog(&config.catalog_path)?;
            summary::run_summary(&load_dataset(&config)?, &catalog);
            Ok(())
        }
    }
}

fn load_dataset(config: &AppConfig) -> anyhow::Result<Dataset> {
    pricewatch_data::load_dataset(&config.data_dir, &config.mapping_path).with_context(|| {
        format!(
            "failed to load dataset from {} and {}",
            config.data_dir.display(),
            config.mapping_path.display()
        )
    })
}
