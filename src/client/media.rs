// portalrestore/src/client/media.rs
//
// Blob operations against the portal's media container, addressed through
// the container-level SAS URL handed out by the management plane. The SAS
// query string carries authorization, so every blob URL keeps the original
// query intact.
use std::path::Path;

use regex::Regex;
use reqwest::Client;
use url::Url;

use crate::errors::{AppError, Result};

/// Lists the names of every blob currently in the media container.
pub async fn list_blobs(http: &Client, container_sas: &Url) -> Result<Vec<String>> {
    let mut url = container_sas.clone();
    url.query_pairs_mut()
        .append_pair("restype", "container")
        .append_pair("comp", "list");

    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Service {
            status,
            message: response.text().await.unwrap_or_default(),
        });
    }
    let listing = response.text().await?;
    blob_names_from_listing(&listing)
}

/// Deletes a single blob from the media container.
pub async fn delete_blob(http: &Client, container_sas: &Url, blob_name: &str) -> Result<()> {
    let url = blob_url(container_sas, blob_name)?;
    let response = http.delete(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Service {
            status,
            message: format!("Failed to delete media blob '{}'", blob_name),
        });
    }
    Ok(())
}

/// Uploads a local file as a block blob under `blob_name`.
pub async fn upload_blob(
    http: &Client,
    container_sas: &Url,
    blob_name: &str,
    source: &Path,
) -> Result<()> {
    let bytes = tokio::fs::read(source).await?;
    let url = blob_url(container_sas, blob_name)?;
    let response = http
        .put(url)
        .header("x-ms-blob-type", "BlockBlob")
        .body(bytes)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Service {
            status,
            message: format!(
                "Failed to upload media blob '{}' from {}",
                blob_name,
                source.display()
            ),
        });
    }
    Ok(())
}

/// Pulls blob names out of the container's list-blobs XML response.
fn blob_names_from_listing(listing: &str) -> Result<Vec<String>> {
    let name_pattern = Regex::new(r"<Name>([^<]+)</Name>")?;
    Ok(name_pattern
        .captures_iter(listing)
        .map(|c| c[1].to_string())
        .collect())
}

/// Appends the blob name to the container path while keeping the SAS query.
fn blob_url(container_sas: &Url, blob_name: &str) -> Result<Url> {
    let mut url = container_sas.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| AppError::Generic("Media container URL cannot be a base URL".to_string()))?;
        for part in blob_name.split('/').filter(|p| !p.is_empty()) {
            segments.push(part);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_url_keeps_sas_query_and_nests_names() -> Result<()> {
        let container =
            Url::parse("https://acct.blob.example.net/content?sv=2021-08-06&sig=abc%3D")?;
        let url = blob_url(&container, "images/logo.png")?;
        assert_eq!(url.path(), "/content/images/logo.png");
        assert_eq!(url.query(), Some("sv=2021-08-06&sig=abc%3D"));
        Ok(())
    }

    #[test]
    fn blob_names_are_extracted_from_listing_xml() -> Result<()> {
        let listing = r#"<?xml version="1.0" encoding="utf-8"?>
            <EnumerationResults>
              <Blobs>
                <Blob><Name>favicon.ico</Name><Properties /></Blob>
                <Blob><Name>images/hero.jpg</Name><Properties /></Blob>
              </Blobs>
            </EnumerationResults>"#;
        let names = blob_names_from_listing(listing)?;
        assert_eq!(names, vec!["favicon.ico", "images/hero.jpg"]);
        Ok(())
    }

    #[test]
    fn empty_listing_yields_no_names() -> Result<()> {
        let names = blob_names_from_listing("<EnumerationResults><Blobs /></EnumerationResults>")?;
        assert!(names.is_empty());
        Ok(())
    }
}
