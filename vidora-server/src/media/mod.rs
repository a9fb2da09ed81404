//! External media host delegate.
//!
//! Handlers stage uploaded files on local disk ([`TempUpload`]), hand them
//! to a [`MediaStore`], and keep only the returned locator and public id.
//! Failures never escape a store: uploads report `None`, deletes are logged.

pub mod cloudinary;
pub mod multipart;
pub mod temp;

use std::fmt;

use async_trait::async_trait;
use tracing::warn;

use vidora_core::domain::Asset;

pub use cloudinary::CloudinaryStore;
pub use multipart::UploadForm;
pub use temp::TempUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: String,
    /// Seconds; reported for video resources.
    pub duration: Option<f64>,
}

impl UploadedAsset {
    pub fn asset(&self) -> Asset {
        Asset::new(self.url.clone(), self.public_id.clone())
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Consumes the staged file; it is removed from disk whatever the outcome.
    async fn upload(&self, file: TempUpload, kind: ResourceKind) -> Option<UploadedAsset>;

    /// Failures are logged and swallowed.
    async fn delete(&self, public_id: &str, kind: ResourceKind);
}

/// Uploads every staged file, or none: when any upload fails the ones that
/// succeeded are deleted again.
pub async fn upload_all(
    media: &dyn MediaStore,
    files: Vec<(TempUpload, ResourceKind)>,
) -> Option<Vec<UploadedAsset>> {
    let mut uploaded: Vec<(UploadedAsset, ResourceKind)> = Vec::with_capacity(files.len());
    let mut failed = false;

    for (file, kind) in files {
        if failed {
            file.close();
            continue;
        }
        match media.upload(file, kind).await {
            Some(asset) => uploaded.push((asset, kind)),
            None => failed = true,
        }
    }

    if failed {
        warn!(rolled_back = uploaded.len(), "upload batch failed");
        for (asset, kind) in &uploaded {
            media.delete(&asset.public_id, *kind).await;
        }
        return None;
    }
    Some(uploaded.into_iter().map(|(asset, _)| asset).collect())
}
