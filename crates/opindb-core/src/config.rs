use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::{AppConfig, MalformedPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value. All
/// variables have defaults; none are required.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a set env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let bind_addr = parse_addr("OPINDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("OPINDB_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("OPINDB_DATA_DIR", "./data/products"));
    let source_base_url = or_default("OPINDB_SOURCE_BASE_URL", "https://www.ceneo.pl");

    let scraper_request_timeout_secs = parse_u64("OPINDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "OPINDB_SCRAPER_USER_AGENT",
        "opindb/0.1 (review-intelligence)",
    );
    let scraper_max_pages = parse_usize("OPINDB_SCRAPER_MAX_PAGES", "500")?;
    let scraper_inter_request_delay_ms = parse_u64("OPINDB_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;
    let scraper_max_retries = parse_u32("OPINDB_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_secs = parse_u64("OPINDB_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;

    let raw_policy = or_default("OPINDB_SCRAPER_ON_MALFORMED", "abort");
    let scraper_on_malformed = parse_malformed_policy(&raw_policy)
        .ok_or_else(|| invalid("OPINDB_SCRAPER_ON_MALFORMED", format!("unknown policy {raw_policy:?}, expected \"abort\" or \"skip\"")))?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        data_dir,
        source_base_url,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_pages,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_on_malformed,
    })
}

fn parse_malformed_policy(s: &str) -> Option<MalformedPolicy> {
    match s {
        "abort" => Some(MalformedPolicy::Abort),
        "skip" => Some(MalformedPolicy::Skip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
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
    fn build_app_config_succeeds_with_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.data_dir, PathBuf::from("./data/products"));
        assert_eq!(cfg.source_base_url, "https://www.ceneo.pl");
        assert_eq!(cfg.scraper_request_timeout_secs, 30);
        assert_eq!(cfg.scraper_user_agent, "opindb/0.1 (review-intelligence)");
        assert_eq!(cfg.scraper_max_pages, 500);
        assert_eq!(cfg.scraper_inter_request_delay_ms, 250);
        assert_eq!(cfg.scraper_max_retries, 3);
        assert_eq!(cfg.scraper_retry_backoff_base_secs, 5);
        assert_eq!(cfg.scraper_on_malformed, MalformedPolicy::Abort);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("OPINDB_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OPINDB_BIND_ADDR"),
            "expected InvalidEnvVar(OPINDB_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_overrides_scraper_knobs() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("OPINDB_SCRAPER_MAX_PAGES", "42");
        map.insert("OPINDB_SCRAPER_MAX_RETRIES", "0");
        map.insert("OPINDB_SOURCE_BASE_URL", "http://127.0.0.1:8080");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.scraper_max_pages, 42);
        assert_eq!(cfg.scraper_max_retries, 0);
        assert_eq!(cfg.source_base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn build_app_config_fails_with_unparseable_max_pages() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("OPINDB_SCRAPER_MAX_PAGES", "many");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OPINDB_SCRAPER_MAX_PAGES"),
            "expected InvalidEnvVar(OPINDB_SCRAPER_MAX_PAGES), got: {result:?}"
        );
    }

    #[test]
    fn parse_malformed_policy_accepts_both_variants() {
        assert_eq!(parse_malformed_policy("abort"), Some(MalformedPolicy::Abort));
        assert_eq!(parse_malformed_policy("skip"), Some(MalformedPolicy::Skip));
        assert_eq!(parse_malformed_policy("ignore"), None);
    }

    #[test]
    fn build_app_config_fails_with_unknown_malformed_policy() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("OPINDB_SCRAPER_ON_MALFORMED", "shrug");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OPINDB_SCRAPER_ON_MALFORMED"),
            "expected InvalidEnvVar(OPINDB_SCRAPER_ON_MALFORMED), got: {result:?}"
        );
    }
}
