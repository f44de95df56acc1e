//! SOAP envelope building and response parsing for the worldserver
//! `urn:TC#executeCommand` method.

use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::{SoapError, SoapResult};

pub const SOAP_NAMESPACE: &str = "urn:TC";
pub const SOAP_ACTION: &str = "urn:TC#executeCommand";

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape_xml`]; `&amp;` last so `&amp;lt;` stays `&lt;`.
pub fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#xD;", "\r")
        .replace("&amp;", "&")
}

/// Wrap a GM command in an `executeCommand` request envelope.
pub fn build_envelope(command: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope
  xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
  xmlns:ns1="{}">
  <SOAP-ENV:Body>
    <ns1:executeCommand>
      <command>{}</command>
    </ns1:executeCommand>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        SOAP_NAMESPACE,
        escape_xml(command)
    )
}

/// Extracts command output from worldserver responses.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    result_pattern: Regex,
    fault_pattern: Regex,
    body_pattern: Regex,
    tag_pattern: Regex,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            result_pattern: Regex::new(r"<result[^>]*>([\s\S]*?)</result>").unwrap(),
            fault_pattern: Regex::new(r"<faultstring[^>]*>([\s\S]*?)</faultstring>").unwrap(),
            body_pattern: Regex::new(r"<SOAP-ENV:Body>([\s\S]*?)</SOAP-ENV:Body>").unwrap(),
            tag_pattern: Regex::new(r"<[^>]+>").unwrap(),
        }
    }

    fn first_capture(&self, pattern: &Regex, xml: &str) -> Option<String> {
        match pattern.captures(xml) {
            Ok(Some(caps)) => caps.get(1).map(|m| m.as_str().to_string()),
            Ok(None) => None,
            Err(e) => {
                warn!("Regex match error on SOAP response: {}", e);
                None
            }
        }
    }

    /// Pull the command output out of a response body.
    ///
    /// Falls back to the tag-stripped `SOAP-ENV:Body`, then to the raw text.
    /// A SOAP fault (unknown command, insufficient rights) is an error.
    pub fn parse(&self, xml: &str) -> SoapResult<String> {
        if let Some(result) = self.first_capture(&self.result_pattern, xml) {
            return Ok(unescape_xml(result.trim()));
        }

        if let Some(fault) = self.first_capture(&self.fault_pattern, xml) {
            return Err(SoapError::Fault {
                message: unescape_xml(fault.trim()),
            });
        }

        if let Some(body) = self.first_capture(&self.body_pattern, xml) {
            let text = self.tag_pattern.replace_all(&body, "");
            return Ok(unescape_xml(text.trim()));
        }

        Ok(xml.to_string())
    }
}
