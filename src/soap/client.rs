//! HTTP client for the worldserver SOAP endpoint.

use std::time::Duration;

use backon::BackoffBuilder;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::common::error::{SoapError, SoapResult};
use crate::config::SoapConfig;
use crate::soap::envelope::{build_envelope, ResponseParser, SOAP_ACTION};

/// Fail fast if the server is down.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Exponential backoff for an unreachable worldserver.
/// 500ms initial, 5s max, three retries.
fn command_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(3)
        .build()
}

/// Outcome of a connection check, suitable for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
}

/// Sends GM commands to a running worldserver.
#[derive(Debug, Clone)]
pub struct SoapClient {
    host: String,
    port: u16,
    user: String,
    password: String,
    enabled: bool,
    http: reqwest::Client,
    parser: ResponseParser,
}

impl SoapClient {
    pub fn new(config: &SoapConfig) -> SoapResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()?;
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
            enabled: config.enabled,
            http,
            parser: ResponseParser::new(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> SoapError {
        if e.is_timeout() {
            SoapError::Timeout {
                host: self.host.clone(),
                port: self.port,
            }
        } else if e.is_connect() {
            SoapError::Connect {
                host: self.host.clone(),
                port: self.port,
            }
        } else {
            SoapError::Http(e)
        }
    }

    /// Send one GM command and return its text output.
    pub async fn send_command(&self, command: &str) -> SoapResult<String> {
        if !self.enabled {
            return Err(SoapError::Disabled);
        }
        if self.host.is_empty() || self.user.is_empty() {
            return Err(SoapError::NotConfigured);
        }

        debug!("SOAP -> {}: {}", self.endpoint(), command);
        let response = self
            .http
            .post(self.endpoint())
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .basic_auth(&self.user, Some(&self.password))
            .body(build_envelope(command))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SoapError::Unauthorized);
        }

        let body = response.text().await.map_err(|e| self.map_transport_error(e))?;

        // Faults come back as 500 with a parseable body.
        if status != StatusCode::OK {
            return match self.parser.parse(&body) {
                Err(fault @ SoapError::Fault { .. }) => Err(fault),
                _ => Err(SoapError::Status {
                    status: status.as_u16(),
                }),
            };
        }

        let output = self.parser.parse(&body)?;
        debug!("SOAP <- {}", output);
        Ok(output)
    }

    /// Like [`send_command`](Self::send_command), retrying while the
    /// server is unreachable.
    pub async fn send_with_retry(&self, command: &str) -> SoapResult<String> {
        let mut backoff = command_backoff();
        loop {
            match self.send_command(command).await {
                Err(e) if e.is_transient() => match backoff.next() {
                    Some(delay) => {
                        warn!("SOAP command failed ({}), retrying in {:.1}s", e, delay.as_secs_f64());
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                result => return result,
            }
        }
    }

    pub async fn server_info(&self) -> SoapResult<String> {
        self.send_command("server info").await
    }

    pub async fn announce(&self, message: &str) -> SoapResult<String> {
        self.send_command(&format!("announce {}", message)).await
    }

    pub async fn notify(&self, message: &str) -> SoapResult<String> {
        self.send_command(&format!("send notification {}", message)).await
    }

    pub async fn reload_config(&self) -> SoapResult<String> {
        self.send_command("reload config").await
    }

    pub async fn reload_creature_template(&self, entry: u32) -> SoapResult<String> {
        self.send_command(&format!("reload creature_template {}", entry)).await
    }

    pub async fn reload_game_event(&self) -> SoapResult<String> {
        self.send_command("reload game_event").await
    }

    /// Make the worldserver pick up edited loot rows.
    pub async fn reload_loot_tables(&self) -> SoapResult<String> {
        self.send_command("reload creature_loot_template").await
    }

    pub async fn online_list(&self) -> SoapResult<String> {
        self.send_command("account onlinelist").await
    }

    pub async fn shutdown(&self, seconds: u32, message: Option<&str>) -> SoapResult<String> {
        let command = match message {
            Some(message) if !message.is_empty() => format!("server shutdown {} {}", seconds, message),
            _ => format!("server shutdown {}", seconds),
        };
        self.send_command(&command).await
    }

    pub async fn cancel_shutdown(&self) -> SoapResult<String> {
        self.send_command("server shutdown cancel").await
    }

    /// Run `server info`, folding any failure into the returned check.
    pub async fn test_connection(&self) -> ConnectionCheck {
        match self.server_info().await {
            Ok(message) => {
                info!("SOAP connection to {} OK", self.endpoint());
                ConnectionCheck {
                    success: true,
                    message,
                }
            }
            Err(e) => ConnectionCheck {
                success: false,
                message: e.to_string(),
            },
        }
    }
}
