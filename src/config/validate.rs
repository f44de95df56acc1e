//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate SOAP config
    if let Some(ref soap) = config.soap {
        if soap.port == 0 {
            errors.push("soap.port must be non-zero".to_string());
        }
        if soap.enabled {
            if soap.host.is_empty() {
                errors.push("soap.host is required when SOAP is enabled".to_string());
            }
            if soap.user.is_empty() {
                errors.push("soap.user is required when SOAP is enabled".to_string());
            }
        }
    }

    // Validate texture directories
    if let Some(ref textures) = config.textures {
        if textures.source_dir.is_empty() {
            errors.push("textures.source_dir is required".to_string());
        }
        if textures.output_dir.is_empty() {
            errors.push("textures.output_dir is required".to_string());
        }
        if !textures.source_dir.is_empty() && textures.source_dir == textures.output_dir {
            errors.push(format!(
                "textures.output_dir must differ from textures.source_dir (both '{}')",
                textures.source_dir
            ));
        }
    }

    // Validate loot settings
    if let Some(ref loot) = config.loot {
        if loot.kills == 0 {
            errors.push("loot.kills must be at least 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
