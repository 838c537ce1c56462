//! Device description parsing for media servers.
//!
//! Turns the XML document behind an SSDP `LOCATION` into a [`MediaServer`]
//! with an absolute ContentDirectory control URL.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;

use super::types::{DiscoveryError, DiscoveryResult, MediaServer};
use super::utils::{base_url_of, resolve_url};
use crate::protocol_constants::CONTENT_DIRECTORY_SERVICE_PREFIX;

/// Parses a device description document.
///
/// Relative URLs are resolved against `URLBase` when present, otherwise
/// against the scheme and authority of `location`.
///
/// # Errors
/// Returns [`DiscoveryError::Description`] when the document has no
/// ContentDirectory service or no usable base URL.
pub fn parse_device_description(xml: &str, location: &str) -> DiscoveryResult<MediaServer> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut friendly_name: Option<String> = None;
    let mut udn: Option<String> = None;
    let mut url_base: Option<String> = None;

    // Per-<service> state
    let mut in_service = false;
    let mut service_type: Option<String> = None;
    let mut service_control: Option<String> = None;
    let mut control_path: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"service" => {
                        in_service = true;
                        service_type = None;
                        service_control = None;
                    }
                    // Only the root device's name counts; embedded devices come later
                    b"friendlyName" if friendly_name.is_none() => {
                        friendly_name = read_trimmed(&mut reader, e.name());
                    }
                    b"UDN" if udn.is_none() => {
                        udn = read_trimmed(&mut reader, e.name());
                    }
                    b"URLBase" => {
                        url_base = read_trimmed(&mut reader, e.name());
                    }
                    b"serviceType" if in_service => {
                        service_type = read_trimmed(&mut reader, e.name());
                    }
                    b"controlURL" if in_service => {
                        service_control = read_trimmed(&mut reader, e.name());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"service" => {
                in_service = false;
                let is_content_directory = service_type
                    .as_deref()
                    .is_some_and(|t| t.starts_with(CONTENT_DIRECTORY_SERVICE_PREFIX));
                if is_content_directory && control_path.is_none() {
                    control_path = service_control.take();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("[UPnP] XML parse error in device description: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    let control_path = control_path.ok_or_else(|| {
        DiscoveryError::Description(format!("{} has no ContentDirectory service", location))
    })?;

    let base_url = url_base
        .as_deref()
        .and_then(base_url_of)
        .or_else(|| base_url_of(location))
        .ok_or_else(|| DiscoveryError::Description(format!("invalid location {}", location)))?;

    Ok(MediaServer {
        friendly_name: friendly_name.unwrap_or_else(|| "Media Server".to_string()),
        udn: udn.unwrap_or_default(),
        control_url: resolve_url(&base_url, &control_path),
        base_url,
    })
}

fn read_trimmed(reader: &mut Reader<&[u8]>, name: quick_xml::name::QName) -> Option<String> {
    reader
        .read_text(name)
        .ok()
        .map(|text| html_escape::decode_html_entities(text.trim()).to_string())
        .filter(|text| !text.is_empty())
}

/// Fetches and parses the device description behind an SSDP location.
pub async fn fetch_media_server(
    client: &Client,
    location: &str,
    request_timeout: Duration,
) -> DiscoveryResult<MediaServer> {
    let response = client
        .get(location)
        .timeout(request_timeout)
        .send()
        .await
        .map_err(|e| DiscoveryError::Description(format!("{}: {}", location, e)))?;

    if !response.status().is_success() {
        return Err(DiscoveryError::Description(format!(
            "{}: HTTP {}",
            location,
            response.status().as_u16()
        )));
    }

    let xml = response
        .text()
        .await
        .map_err(|e| DiscoveryError::Description(format!("{}: {}", location, e)))?;

    parse_device_description(&xml, location)
}
