//! Configuration parsing and types.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

pub use parser::load_config;
pub use types::*;

use std::path::Path;

use tracing::info;

use crate::common::error::ConfigError;

/// Load the config file (if present), apply env overrides, then validate.
///
/// A missing file is not an error: every section is optional.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config = if path.exists() {
        load_config(path)?
    } else {
        info!("No config file at {}, using defaults", path.display());
        Config::default()
    };

    let config = env::apply_env_overrides(config);
    validate::validate_config(&config)?;
    Ok(config)
}
