use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here so tests can drive it with a plain
/// `HashMap` lookup instead of mutating the process environment.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;

    let raw_bind = or_default("PRICEWATCH_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = raw_bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("PRICEWATCH_DATA_DIR", "./data/observations"));
    let mapping_path = PathBuf::from(or_default(
        "PRICEWATCH_MAPPING_PATH",
        "./data/master/mapping.csv",
    ));
    let catalog_path = PathBuf::from(or_default(
        "PRICEWATCH_CATALOG_PATH",
        "./config/catalog.yaml",
    ));

    let reload_cron = optional("PRICEWATCH_RELOAD_CRON");
    if let Some(expr) = &reload_cron {
        validate_cron(expr)?;
    }

    let api_keys = optional("PRICEWATCH_API_KEYS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        mapping_path,
        catalog_path,
        reload_cron,
        api_keys,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

/// The scheduler accepts `sec min hour day month weekday [year]`.
fn validate_cron(expr: &str) -> Result<(), ConfigError> {
    let fields = expr.split_whitespace().count();
    if fields == 6 || fields == 7 {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_RELOAD_CRON".to_string(),
            reason: format!("expected 6 or 7 cron fields, got {fields}"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
