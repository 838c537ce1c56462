//! ContentDirectory `Browse` requests and DIDL-Lite parsing.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;

use super::retry::with_retry;
use super::soap::{send_soap_request, SoapError, SoapResult};
use super::types::{DirectoryObject, MediaServer};
use super::utils::{extract_xml_text, get_xml_attr, resolve_url};
use crate::protocol_constants::CONTENT_DIRECTORY_URN;

/// One page of a `BrowseDirectChildren` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsePage {
    pub objects: Vec<DirectoryObject>,
    pub number_returned: u32,
    pub total_matches: u32,
}

/// Parses a `BrowseResponse` envelope.
///
/// The `Result` element carries an escaped DIDL-Lite document; relative
/// resource URIs in it are resolved against `base_url`.
pub fn parse_browse_response(xml: &str, base_url: &str) -> SoapResult<BrowsePage> {
    let didl = extract_xml_text(xml, "Result").ok_or(SoapError::Parse)?;
    let number_returned = parse_count(xml, "NumberReturned")?;
    let total_matches = parse_count(xml, "TotalMatches")?;

    Ok(BrowsePage {
        objects: parse_didl(&didl, base_url),
        number_returned,
        total_matches,
    })
}

fn parse_count(xml: &str, element: &str) -> SoapResult<u32> {
    extract_xml_text(xml, element)
        .and_then(|v| v.trim().parse().ok())
        .ok_or(SoapError::Parse)
}

/// Parses a DIDL-Lite document into directory objects, in document order.
///
/// Only the first `res` of an item is kept. Items without one are returned
/// with `uri: None` so callers can decide what to skip.
pub fn parse_didl(didl: &str, base_url: &str) -> Vec<DirectoryObject> {
    let mut objects = Vec::new();
    let mut reader = Reader::from_str(didl);
    let mut buf = Vec::new();
    let mut current: Option<DirectoryObject> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"container" => {
                    let id = get_xml_attr(e, b"id").unwrap_or_default();
                    current = Some(DirectoryObject::container(id, ""));
                }
                b"item" => {
                    let id = get_xml_attr(e, b"id").unwrap_or_default();
                    current = Some(DirectoryObject::item(id, "", None));
                }
                b"title" => {
                    if let (Some(obj), Ok(text)) = (current.as_mut(), reader.read_text(e.name())) {
                        obj.title = html_escape::decode_html_entities(text.trim()).to_string();
                    }
                }
                b"res" => {
                    let text = reader.read_text(e.name()).ok();
                    if let (Some(obj), Some(text)) = (current.as_mut(), text) {
                        let uri = html_escape::decode_html_entities(text.trim()).to_string();
                        if obj.uri.is_none() && !obj.is_container && !uri.is_empty() {
                            obj.uri = Some(resolve_url(base_url, &uri));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                // Self-closing containers still carry an id worth browsing
                b"container" => {
                    let id = get_xml_attr(e, b"id").unwrap_or_default();
                    objects.push(DirectoryObject::container(id, ""));
                }
                b"item" => {
                    let id = get_xml_attr(e, b"id").unwrap_or_default();
                    objects.push(DirectoryObject::item(id, "", None));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if matches!(e.local_name().as_ref(), b"container" | b"item") {
                    if let Some(obj) = current.take() {
                        objects.push(obj);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("[UPnP] DIDL-Lite parse error: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    objects
}

/// Browses the direct children of `object_id`, following pagination.
pub async fn browse_direct_children(
    client: &Client,
    server: &MediaServer,
    object_id: &str,
    page_size: u32,
    request_timeout: Duration,
) -> SoapResult<Vec<DirectoryObject>> {
    let page_size = page_size.max(1);
    let mut objects = Vec::new();
    let mut start: u32 = 0;

    loop {
        let starting_index = start.to_string();
        let requested_count = page_size.to_string();
        let args = [
            ("ObjectID", object_id),
            ("BrowseFlag", "BrowseDirectChildren"),
            ("Filter", "*"),
            ("StartingIndex", starting_index.as_str()),
            ("RequestedCount", requested_count.as_str()),
            ("SortCriteria", ""),
        ];

        let xml = with_retry("Browse", || {
            send_soap_request(
                client,
                &server.control_url,
                CONTENT_DIRECTORY_URN,
                "Browse",
                &args,
                request_timeout,
            )
        })
        .await?;

        let page = parse_browse_response(&xml, &server.base_url)?;
        log::debug!(
            "[UPnP] Browse {} [{}..]: {} returned, {} total",
            object_id,
            start,
            page.number_returned,
            page.total_matches
        );

        objects.extend(page.objects);
        start = start.saturating_add(page.number_returned);

        if page.number_returned == 0 || start >= page.total_matches {
            break;
        }
    }

    Ok(objects)
}
