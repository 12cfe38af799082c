use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_DUTCHIE_API_URL: &str = "https://plus.dutchie.com/plus/2021-07/graphql";

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
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let dutchie_api_token = require("DUTCHIE_API_TOKEN")?;
    let dutchie_api_url = or_default("DUTCHIE_API_URL", DEFAULT_DUTCHIE_API_URL);
    let dutchie_timeout_ms = parse_u64("DUTCHIE_TIMEOUT_MS", "10000")?;
    if dutchie_timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DUTCHIE_TIMEOUT_MS".to_string(),
            reason: "timeout must be greater than zero".to_string(),
        });
    }

    let env = parse_environment(&or_default("DISPO_ENV", "development"));
    let log_level = or_default("DISPO_LOG_LEVEL", "info");
    let user_agent = or_default("DISPO_USER_AGENT", "dispo/0.1 (specials)");
    let cache_enabled = parse_bool("DISPO_CACHE_ENABLED", "true")?;
    let cache_ttl_secs = parse_u64("DISPO_CACHE_TTL_SECS", "900")?;
    let specials_batch_size = parse_usize("DISPO_SPECIALS_BATCH_SIZE", "10")?;

    Ok(AppConfig {
        env,
        log_level,
        dutchie_api_url,
        dutchie_api_token,
        dutchie_timeout_ms,
        user_agent,
        cache_enabled,
        cache_ttl_secs,
        specials_batch_size,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
