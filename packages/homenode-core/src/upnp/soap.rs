//! Low-level SOAP protocol implementation for UPnP control requests.
//!
//! Builds the SOAP envelope, POSTs it to a control URL and handles SOAP
//! faults in the response. For ContentDirectory browsing see
//! `content_directory.rs`.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use super::utils::{escape_xml, extract_xml_text};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during SOAP operations with a media server.
#[derive(Debug, Error)]
pub enum SoapError {
    /// HTTP request to the server failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success HTTP status without a SOAP fault.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Server returned a SOAP fault response.
    #[error("SOAP fault: {0}")]
    Fault(String),

    /// Failed to parse SOAP response XML.
    #[error("Failed to parse SOAP response")]
    Parse,
}

/// Convenient Result alias for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

impl SoapError {
    /// Returns true if this error is transient and the request may be retried.
    ///
    /// UPnP error 501 (action failed) is commonly returned by media servers
    /// still scanning their library; network timeouts are transient too.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SoapError::Fault(msg) => msg.contains("501"),
            SoapError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request/Response
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the SOAP envelope for an action.
///
/// Must be a single line with no leading whitespace; some embedded UPnP stacks
/// reject XML with whitespace before the root element.
pub(crate) fn build_envelope(service: &str, action: &str, args: &[(&str, &str)]) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:{} xmlns:u="{}">"#,
        action, service
    );

    for (k, v) in args {
        body.push_str(&format!("<{k}>{}</{k}>", escape_xml(v)));
    }

    body.push_str(&format!(r#"</u:{}></s:Body></s:Envelope>"#, action));
    body
}

/// Sends a SOAP request to a UPnP control URL.
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `control_url` - Absolute control URL of the service
/// * `service` - The UPnP service URN
/// * `action` - The SOAP action name (e.g., "Browse")
/// * `args` - Key-value pairs for action arguments (order is preserved)
/// * `request_timeout` - Timeout for the whole request
pub async fn send_soap_request(
    client: &Client,
    control_url: &str,
    service: &str,
    action: &str,
    args: &[(&str, &str)],
    request_timeout: Duration,
) -> SoapResult<String> {
    let body = build_envelope(service, action, args);

    log::debug!("[SOAP] {} -> {} (body: {} bytes)", action, control_url, body.len());
    log::trace!("[SOAP] Request body: {}", body);

    let start = std::time::Instant::now();
    let res = client
        .post(control_url)
        .header("Content-Type", "text/xml; charset=\"utf-8\"")
        .header("SOAPAction", format!("\"{}#{}\"", service, action))
        .body(body)
        .timeout(request_timeout)
        .send()
        .await;

    log::debug!(
        "[SOAP] {} completed in {:?}: {:?}",
        action,
        start.elapsed(),
        res.as_ref().map(|r| r.status())
    );

    let res = res?;

    let status = res.status();
    let response_text = res.text().await?;

    // SOAP faults may come with a 500 status, so check them first
    if let Some(fault) = extract_fault(&response_text) {
        return Err(SoapError::Fault(fault));
    }

    if !status.is_success() {
        return Err(SoapError::HttpStatus(status.as_u16(), response_text));
    }

    Ok(response_text)
}

/// Extracts a fault description (`faultstring` plus UPnP error code) from a response.
fn extract_fault(xml: &str) -> Option<String> {
    if !xml.contains(":Fault>") && !xml.contains("<Fault>") {
        return None;
    }
    let fault = extract_xml_text(xml, "faultstring").unwrap_or_else(|| "Unknown SOAP fault".into());
    match extract_xml_text(xml, "errorCode") {
        Some(code) => Some(format!("{} ({})", fault, code.trim())),
        None => Some(fault),
    }
}
