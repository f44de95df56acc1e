//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `TAVERNKEEP_SOAP_HOST` - Worldserver SOAP host
//! - `TAVERNKEEP_SOAP_PORT` - Worldserver SOAP port
//! - `TAVERNKEEP_SOAP_USER` - GM account name
//! - `TAVERNKEEP_SOAP_PASSWORD` - GM account password
//! - `TAVERNKEEP_LOOT_SEED` - Fixed seed for loot simulation

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "TAVERNKEEP";

fn var(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Apply environment variable overrides to a config.
///
/// This allows credentials to be provided via environment variables
/// instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    let soap_host = var("SOAP_HOST");
    let soap_port = var("SOAP_PORT").and_then(|p| p.parse().ok());
    let soap_user = var("SOAP_USER");
    let soap_password = var("SOAP_PASSWORD");

    if soap_host.is_some() || soap_port.is_some() || soap_user.is_some() || soap_password.is_some() {
        let soap = config.soap.get_or_insert_with(Default::default);
        if let Some(host) = soap_host {
            soap.host = host;
        }
        if let Some(port) = soap_port {
            soap.port = port;
        }
        if let Some(user) = soap_user {
            soap.user = user;
        }
        if let Some(password) = soap_password {
            soap.password = password;
        }
    }

    if let Some(seed) = var("LOOT_SEED").and_then(|s| s.parse().ok()) {
        config.loot.get_or_insert_with(Default::default).seed = Some(seed);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `TAVERNKEEP_CONFIG` environment variable, otherwise returns "tavernkeep.conf".
pub fn get_config_path() -> String {
    var("CONFIG").unwrap_or_else(|| "tavernkeep.conf".to_string())
}
