use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("unknown").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PRICEWATCH_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert!(cfg.is_development());
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_dir.to_str(), Some("./data/observations"));
    assert_eq!(cfg.mapping_path.to_str(), Some("./data/master/mapping.csv"));
    assert_eq!(cfg.catalog_path.to_str(), Some("./config/catalog.yaml"));
    assert!(cfg.reload_cron.is_none());
    assert!(cfg.api_keys.is_empty());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_BIND_ADDR"),
        "expected InvalidEnvVar(PRICEWATCH_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_on_invalid_env() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_ENV", "producton");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_ENV"),
        "expected InvalidEnvVar(PRICEWATCH_ENV), got: {result:?}"
    );
}

#[test]
fn build_app_config_reads_path_overrides() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_DATA_DIR", "/srv/prices");
    map.insert("PRICEWATCH_MAPPING_PATH", "/srv/master/products.csv");
    map.insert("PRICEWATCH_CATALOG_PATH", "/etc/pricewatch/catalog.yaml");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.data_dir.to_str(), Some("/srv/prices"));
    assert_eq!(cfg.mapping_path.to_str(), Some("/srv/master/products.csv"));
    assert_eq!(cfg.catalog_path.to_str(), Some("/etc/pricewatch/catalog.yaml"));
}

#[test]
fn build_app_config_splits_api_keys() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_API_KEYS", " key-one, ,key-two ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_keys, vec!["key-one", "key-two"]);
}

#[test]
fn build_app_config_blank_api_keys_are_empty() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_API_KEYS", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.api_keys.is_empty());
}

#[test]
fn build_app_config_accepts_six_field_cron() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_RELOAD_CRON", "0 0 6 * * *");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.reload_cron.as_deref(), Some("0 0 6 * * *"));
}

#[test]
fn build_app_config_rejects_five_field_cron() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_RELOAD_CRON", "0 6 * * *");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICEWATCH_RELOAD_CRON"),
        "expected InvalidEnvVar(PRICEWATCH_RELOAD_CRON), got: {result:?}"
    );
}

#[test]
fn app_config_debug_redacts_api_keys() {
    let mut map = HashMap::new();
    map.insert("PRICEWATCH_API_KEYS", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("1 redacted"));
}
