//! Network implementation of the media server traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::content_directory::browse_direct_children;
use super::description::fetch_media_server;
use super::soap::SoapResult;
use super::ssdp::{discover_media_servers, SsdpConfig};
use super::traits::{ContentDirectory, MediaServerDiscovery};
use super::types::{DirectoryObject, DiscoveryError, DiscoveryResult, MediaServer};

/// SSDP discovery plus SOAP browsing over a shared HTTP client.
#[derive(Clone)]
pub struct UpnpClient {
    http: Client,
    ssdp: SsdpConfig,
    page_size: u32,
    request_timeout: Duration,
}

impl UpnpClient {
    pub fn new(http: Client, ssdp: SsdpConfig, page_size: u32, request_timeout: Duration) -> Self {
        Self {
            http,
            ssdp,
            page_size,
            request_timeout,
        }
    }
}

#[async_trait]
impl MediaServerDiscovery for UpnpClient {
    async fn discover(&self) -> DiscoveryResult<Vec<MediaServer>> {
        let responses = discover_media_servers(&self.ssdp).await?;

        let mut servers = Vec::with_capacity(responses.len());
        for response in responses {
            match fetch_media_server(&self.http, &response.location, self.request_timeout).await {
                Ok(server) => {
                    log::info!(
                        "[UPnP] Found media server '{}' at {}",
                        server.friendly_name,
                        server.base_url
                    );
                    servers.push(server);
                }
                Err(e) => log::warn!("[UPnP] Skipping {}: {}", response.location, e),
            }
        }

        if servers.is_empty() {
            return Err(DiscoveryError::NoServers);
        }
        Ok(servers)
    }
}

#[async_trait]
impl ContentDirectory for UpnpClient {
    async fn browse(
        &self,
        server: &MediaServer,
        object_id: &str,
    ) -> SoapResult<Vec<DirectoryObject>> {
        browse_direct_children(
            &self.http,
            server,
            object_id,
            self.page_size,
            self.request_timeout,
        )
        .await
    }
}
