use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let api_url = require("PRICEWISE_API_URL")?;
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWISE_API_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{api_url}\""),
        });
    }

    let env = parse_environment(&or_default("PRICEWISE_ENV", "development"))?;
    let log_level = or_default("PRICEWISE_LOG_LEVEL", "info");
    let state_dir = PathBuf::from(or_default("PRICEWISE_STATE_DIR", "./.pricewise"));
    let api_token = lookup("PRICEWISE_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let request_timeout_secs: u64 = parse_as(
        "PRICEWISE_REQUEST_TIMEOUT_SECS",
        &or_default("PRICEWISE_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let user_agent = or_default("PRICEWISE_USER_AGENT", "pricewise/0.1 (price-comparison)");
    let max_retries: u32 = parse_as(
        "PRICEWISE_MAX_RETRIES",
        &or_default("PRICEWISE_MAX_RETRIES", "0"),
    )?;
    let retry_backoff_base_ms: u64 = parse_as(
        "PRICEWISE_RETRY_BACKOFF_BASE_MS",
        &or_default("PRICEWISE_RETRY_BACKOFF_BASE_MS", "500"),
    )?;
    let suggest_min_chars: usize = parse_as(
        "PRICEWISE_SUGGEST_MIN_CHARS",
        &or_default("PRICEWISE_SUGGEST_MIN_CHARS", "3"),
    )?;
    let suggest_timeout_ms: u64 = parse_as(
        "PRICEWISE_SUGGEST_TIMEOUT_MS",
        &or_default("PRICEWISE_SUGGEST_TIMEOUT_MS", "5000"),
    )?;
    if suggest_timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWISE_SUGGEST_TIMEOUT_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let history_days: u32 = parse_as(
        "PRICEWISE_HISTORY_DAYS",
        &or_default("PRICEWISE_HISTORY_DAYS", "30"),
    )?;

    Ok(AppConfig {
        api_url,
        env,
        log_level,
        state_dir,
        api_token,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        suggest_min_chars,
        suggest_timeout_ms,
        history_days,
    })
}

/// Parse a trimmed env-var value, naming the variable on failure.
fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWISE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
