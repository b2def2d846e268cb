// portalrestore/src/client/management.rs
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::client::PortalClient;
use crate::client::media;
use crate::client::snapshot::SnapshotFolder;
use crate::config::{DestinationIdentity, ManagementCredentials};
use crate::errors::{AppError, Result};

const MANAGEMENT_API_ENDPOINT: &str = "https://management.azure.com";
const MANAGEMENT_API_VERSION: &str = "2021-08-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const PUBLISH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const PUBLISH_POLL_ATTEMPTS: u32 = 120;

const REVISION_STATUS_COMPLETED: &str = "completed";
const REVISION_STATUS_FAILED: &str = "failed";

/// Secrets handed out for the portal's media container.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaStorageSecrets {
    container_sas_url: String,
}

#[derive(Debug, Deserialize)]
struct PortalRevision {
    properties: PortalRevisionProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalRevisionProperties {
    status: Option<String>,
    status_details: Option<String>,
}

/// Production [`PortalClient`]: drives the destination service's management
/// REST surface for content records and its media container for blobs.
#[derive(Debug)]
pub struct ManagementClient {
    http: reqwest::Client,
    credentials: ManagementCredentials,
}

impl ManagementClient {
    pub fn new(credentials: ManagementCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ManagementClient { http, credentials })
    }

    /// Builds `{endpoint}/{service resource path}/{relative}?api-version=...`.
    fn service_url(&self, destination: &DestinationIdentity, relative: &str) -> Result<Url> {
        let mut url = Url::parse(MANAGEMENT_API_ENDPOINT)?;
        url.set_path(&format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.ApiManagement/service/{}/{}",
            destination.subscription_id,
            destination.resource_group_name,
            destination.service_name,
            relative.trim_start_matches('/')
        ));
        url.query_pairs_mut()
            .append_pair("api-version", MANAGEMENT_API_VERSION);
        Ok(url)
    }

    /// Sends an authorized request; non-success responses become a service
    /// error carrying the status line and response body text.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header(AUTHORIZATION, self.credentials.authorization_header())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Service {
                status,
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let response = self.send(self.http.get(url)).await?;
        Ok(response.json().await?)
    }

    /// Collects every item of a paged ARM collection, following `nextLink`.
    async fn list_collection(&self, first_page: Url) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut url = first_page;
        loop {
            let body = self.get_json(url).await?;
            if let Some(page) = body.get("value").and_then(Value::as_array) {
                items.extend(page.iter().cloned());
            }
            match body
                .get("nextLink")
                .and_then(Value::as_str)
                .filter(|link| !link.is_empty())
            {
                Some(link) => url = Url::parse(link)?,
                None => break,
            }
        }
        Ok(items)
    }

    /// Obtains the SAS URL of the portal's media container.
    async fn media_container_url(&self, destination: &DestinationIdentity) -> Result<Url> {
        let url = self.service_url(destination, "portalSettings/mediaContent/listSecrets")?;
        let response = self.send(self.http.post(url)).await?;
        let secrets: MediaStorageSecrets = response.json().await?;
        Ok(Url::parse(&secrets.container_sas_url)?)
    }

    async fn delete_content_items(&self, destination: &DestinationIdentity) -> Result<usize> {
        let types_url = self.service_url(destination, "contentTypes")?;
        let content_types = self.list_collection(types_url).await?;

        let mut deleted = 0;
        for content_type in &content_types {
            let Some(type_name) = content_type.get("name").and_then(Value::as_str) else {
                continue;
            };
            let items_url =
                self.service_url(destination, &format!("contentTypes/{}/contentItems", type_name))?;
            for item in self.list_collection(items_url).await? {
                let Some(item_name) = item.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let item_url = self.service_url(
                    destination,
                    &format!("contentTypes/{}/contentItems/{}", type_name, item_name),
                )?;
                self.send(self.http.delete(item_url)).await?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn delete_media_blobs(&self, destination: &DestinationIdentity) -> Result<usize> {
        let container = self.media_container_url(destination).await?;
        let blobs = media::list_blobs(&self.http, &container).await?;
        for blob_name in &blobs {
            media::delete_blob(&self.http, &container, blob_name).await?;
        }
        Ok(blobs.len())
    }
}

impl PortalClient for ManagementClient {
    async fn cleanup(&self, destination: &DestinationIdentity) -> Result<()> {
        let records = self.delete_content_items(destination).await?;
        println!("  Removed {} content records.", records);
        let blobs = self.delete_media_blobs(destination).await?;
        println!("  Removed {} media blobs.", blobs);
        Ok(())
    }

    async fn import(&self, destination: &DestinationIdentity, snapshot_path: &Path) -> Result<()> {
        let snapshot = SnapshotFolder::open(snapshot_path)?;

        let records = snapshot.content_records()?;
        let total = records.len();
        for (content_id, record) in records {
            // data.json keys are service-relative ids such as
            // contentTypes/page/contentItems/home.
            let url = self.service_url(destination, &content_id)?;
            let body = json!({ "properties": record });
            self.send(self.http.put(url).json(&body)).await?;
        }
        println!("  Created {} content records.", total);

        let files = snapshot.media_files()?;
        if !files.is_empty() {
            let container = self.media_container_url(destination).await?;
            for file in &files {
                media::upload_blob(&self.http, &container, &file.blob_name, &file.path).await?;
            }
        }
        println!("  Uploaded {} media blobs.", files.len());
        Ok(())
    }

    async fn publish(&self, destination: &DestinationIdentity) -> Result<()> {
        let revision_id = Local::now().format("%Y%m%d%H%M%S").to_string();
        let revision_url =
            self.service_url(destination, &format!("portalRevisions/{}", revision_id))?;
        let body = json!({
            "properties": {
                "description": "Restored from content snapshot.",
                "isCurrent": true
            }
        });
        self.send(self.http.put(revision_url.clone()).json(&body))
            .await?;
        println!("  Portal revision {} requested.", revision_id);

        // The revision is provisioned asynchronously; poll until it settles.
        for _ in 0..PUBLISH_POLL_ATTEMPTS {
            tokio::time::sleep(PUBLISH_POLL_INTERVAL).await;
            let response = self.send(self.http.get(revision_url.clone())).await?;
            let revision: PortalRevision = response.json().await?;
            match revision.properties.status.as_deref() {
                Some(REVISION_STATUS_COMPLETED) => {
                    println!("  Portal revision {} is live.", revision_id);
                    return Ok(());
                }
                Some(REVISION_STATUS_FAILED) => {
                    return Err(AppError::Generic(format!(
                        "Portal revision {} failed to publish: {}",
                        revision_id,
                        revision
                            .properties
                            .status_details
                            .unwrap_or_else(|| "no details reported".to_string())
                    )));
                }
                _ => continue,
            }
        }
        Err(AppError::Generic(format!(
            "Timed out waiting for portal revision {} to publish.",
            revision_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ManagementClient {
        let credentials = ManagementCredentials::from_token(Some("token".to_string())).unwrap();
        ManagementClient::new(credentials).unwrap()
    }

    fn destination() -> DestinationIdentity {
        DestinationIdentity::new("s1", "rg1", "portal1")
    }

    #[test]
    fn service_url_addresses_the_destination_instance() -> Result<()> {
        let url = client().service_url(&destination(), "contentTypes")?;
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/s1/resourceGroups/rg1\
             /providers/Microsoft.ApiManagement/service/portal1/contentTypes\
             ?api-version=2021-08-01"
        );
        Ok(())
    }

    #[test]
    fn service_url_accepts_leading_slash_in_relative_path() -> Result<()> {
        let with_slash = client().service_url(&destination(), "/portalRevisions/r1")?;
        let without = client().service_url(&destination(), "portalRevisions/r1")?;
        assert_eq!(with_slash, without);
        Ok(())
    }

    #[test]
    fn revision_status_deserializes() -> Result<()> {
        let revision: PortalRevision = serde_json::from_value(json!({
            "properties": {"status": "failed", "statusDetails": "content invalid"}
        }))?;
        assert_eq!(revision.properties.status.as_deref(), Some("failed"));
        assert_eq!(
            revision.properties.status_details.as_deref(),
            Some("content invalid")
        );
        Ok(())
    }
}
