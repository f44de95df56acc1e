//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure. Every section is optional so the tool
/// runs without a config file for purely local work.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub soap: Option<SoapConfig>,
    pub textures: Option<TextureConfig>,
    pub loot: Option<LootConfig>,
}

fn default_soap_port() -> u16 {
    7878
}

fn default_enabled() -> bool {
    true
}

fn default_kills() -> u32 {
    1
}

/// Worldserver SOAP endpoint. The account must be GM level 3 or higher.
#[derive(Debug, Clone, Deserialize)]
pub struct SoapConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_soap_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_soap_port(),
            user: String::new(),
            password: String::new(),
            enabled: default_enabled(),
        }
    }
}

/// Default directories for batch texture conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct TextureConfig {
    pub source_dir: String,
    pub output_dir: String,
}

/// Loot simulation defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct LootConfig {
    #[serde(default = "default_kills")]
    pub kills: u32,
    /// Fixed RNG seed for reproducible simulations.
    pub seed: Option<u64>,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            kills: default_kills(),
            seed: None,
        }
    }
}

impl Config {
    pub fn soap_or_default(&self) -> SoapConfig {
        self.soap.clone().unwrap_or_default()
    }

    pub fn loot_or_default(&self) -> LootConfig {
        self.loot.clone().unwrap_or_default()
    }
}
