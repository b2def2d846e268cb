// portalrestore/src/client/snapshot.rs
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use crate::errors::{AppError, Result};

/// File at the snapshot root holding every content record, keyed by id.
pub const DATA_FILE_NAME: &str = "data.json";

/// Subtree of opaque media blobs, mirrored into the portal's media container.
pub const MEDIA_DIR_NAME: &str = "media";

/// One media artifact: its container-relative blob name and where it lives
/// on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub blob_name: String,
    pub path: PathBuf,
}

/// Read-only view over a previously captured snapshot folder.
#[derive(Debug, Clone)]
pub struct SnapshotFolder {
    root: PathBuf,
}

impl SnapshotFolder {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(AppError::Generic(format!(
                "Snapshot folder not found or not a directory: {}",
                root.display()
            )));
        }
        Ok(SnapshotFolder {
            root: root.to_path_buf(),
        })
    }

    /// Loads `data.json`: a JSON object mapping content ids to records.
    pub fn content_records(&self) -> Result<HashMap<String, Value>> {
        let data_path = self.root.join(DATA_FILE_NAME);
        let raw = fs::read_to_string(&data_path).map_err(|e| {
            AppError::Generic(format!(
                "Failed to read {} from snapshot folder {}: {}",
                DATA_FILE_NAME,
                self.root.display(),
                e
            ))
        })?;
        let records: HashMap<String, Value> = serde_json::from_str(&raw)?;
        Ok(records)
    }

    /// Enumerates every file under `media/`, with blob names relative to the
    /// media root using `/` separators. An absent media directory means the
    /// snapshot simply carries no media.
    pub fn media_files(&self) -> Result<Vec<MediaFile>> {
        let media_root = self.root.join(MEDIA_DIR_NAME);
        if !media_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&media_root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&media_root)
                .map_err(|e| AppError::Generic(format!("Unexpected media path: {}", e)))?;
            let blob_name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.push(MediaFile {
                blob_name,
                path: entry.path().to_path_buf(),
            });
        }
        files.sort_by(|a, b| a.blob_name.cmp(&b.blob_name));
        Ok(files)
    }
}
