//! On-disk layout of a scraped dataset.
//!
//! ```text
//! <root>/images/<id>.png|jpg
//! <root>/texts/<id>.txt
//! <root>/raw_html/<id>.html
//! <root>/metadata.json
//! ```

use base64::{Engine as _, engine::general_purpose::STANDARD};
use pecha_common::metadata::PageRecord;
use pecha_common::{PageId, RunReport};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::ImageFormat;

pub const IMAGES_DIR: &str = "images";
pub const TEXTS_DIR: &str = "texts";
pub const RAW_HTML_DIR: &str = "raw_html";
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    images_dir: PathBuf,
    texts_dir: PathBuf,
    raw_dir: PathBuf,
    metadata_file: PathBuf,
}

impl ArtifactStore {
    /// Paths under `root`; nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images_dir: root.join(IMAGES_DIR),
            texts_dir: root.join(TEXTS_DIR),
            raw_dir: root.join(RAW_HTML_DIR),
            metadata_file: root.join(METADATA_FILE),
            root,
        }
    }

    /// Create the output directories.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.images_dir).await?;
        tokio::fs::create_dir_all(&store.texts_dir).await?;
        tokio::fs::create_dir_all(&store.raw_dir).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn texts_dir(&self) -> &Path {
        &self.texts_dir
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    pub fn image_file_name(page: &PageId, format: ImageFormat) -> String {
        format!("{}.{}", page, format.extension())
    }

    /// Write raw image bytes; returns the file name relative to `images/`.
    pub async fn save_image(
        &self,
        page: &PageId,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        let name = Self::image_file_name(page, format);
        tokio::fs::write(self.images_dir.join(&name), bytes).await?;
        info!("Image saved: {} ({} bytes)", name, bytes.len());
        Ok(name)
    }

    /// Decode a `data:` URL and write its payload as the page image.
    pub async fn save_image_data_url(
        &self,
        page: &PageId,
        format: ImageFormat,
        data_url: &str,
    ) -> Result<String, StoreError> {
        let bytes = decode_data_url(data_url)?;
        self.save_image(page, format, &bytes).await
    }

    pub async fn save_text(&self, page: &PageId, text: &str) -> Result<String, StoreError> {
        let name = format!("{}.txt", page);
        tokio::fs::write(self.texts_dir.join(&name), text).await?;
        info!("Text saved: {} ({} characters)", name, text.chars().count());
        Ok(name)
    }

    pub async fn save_html(&self, page: &PageId, html: &str) -> Result<String, StoreError> {
        let name = format!("{}.html", page);
        tokio::fs::write(self.raw_dir.join(&name), html).await?;
        Ok(name)
    }

    /// Write `metadata.json` with one record per processed page.
    pub async fn write_metadata(&self, report: &RunReport) -> Result<usize, StoreError> {
        let records: Vec<PageRecord> = report.outcomes().iter().map(PageRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.metadata_file, json).await?;
        info!("Metadata saved: {} records", records.len());
        Ok(records.len())
    }
}

/// Decode the base64 payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, StoreError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| StoreError::MalformedDataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StoreError::MalformedDataUrl("missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(StoreError::MalformedDataUrl(format!(
            "unsupported encoding in header '{}'",
            header
        )));
    }
    Ok(STANDARD.decode(payload.trim())?)
}
