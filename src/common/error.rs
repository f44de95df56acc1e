//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Loot error: {0}")]
    Loot(#[from] LootError),

    #[error("Texture error: {0}")]
    Blp(#[from] BlpError),

    #[error("SOAP error: {0}")]
    Soap(#[from] SoapError),

    #[error("{0}")]
    Cli(#[from] CliError),
}

impl AppError {
    /// Process exit status: 2 for command-line misuse, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(_) => 2,
            _ => 1,
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Loot table and simulation errors.
#[derive(Debug, Error)]
pub enum LootError {
    #[error("Invalid loot entry for item {item}: {reason}")]
    InvalidEntry { item: u32, reason: String },

    #[error("Failed to read loot table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse loot table '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// BLP texture decoding errors.
#[derive(Debug, Error)]
pub enum BlpError {
    /// The buffer is not a well-formed BLP2 image.
    #[error("Invalid BLP data: {message}")]
    Format { message: String },

    /// A recognized BLP variant that this decoder does not handle.
    #[error("Unsupported BLP variant: type={kind}, encoding={encoding} ({name})")]
    UnsupportedVariant {
        kind: u8,
        encoding: u8,
        name: &'static str,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BlpError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// SOAP control channel errors.
#[derive(Debug, Error)]
pub enum SoapError {
    #[error("SOAP not configured: set soap.host, soap.user and soap.password")]
    NotConfigured,

    #[error("SOAP is disabled in the configuration")]
    Disabled,

    #[error("SOAP authentication failed. Check the SOAP username and password (must be a GM account)")]
    Unauthorized,

    #[error("SOAP request failed with status {status}")]
    Status { status: u16 },

    #[error("Server rejected command: {message}")]
    Fault { message: String },

    #[error("Cannot connect to worldserver at {host}:{port}. Is the server running?")]
    Connect { host: String, port: u16 },

    #[error("Connection to {host}:{port} timed out")]
    Timeout { host: String, port: u16 },

    #[error("Connection check against {endpoint} failed: {message}")]
    CheckFailed { endpoint: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SoapError {
    /// Errors worth retrying: the server may simply not be up yet.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Timeout { .. })
    }
}

/// Command-line usage errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Usage { message: String },

    #[error("Invalid value for '{arg}': {message}")]
    InvalidArgument { arg: String, message: String },
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for loot operations.
pub type LootResult<T> = std::result::Result<T, LootError>;

/// Result type alias for texture operations.
pub type BlpResult<T> = std::result::Result<T, BlpError>;

/// Result type alias for SOAP operations.
pub type SoapResult<T> = std::result::Result<T, SoapError>;
