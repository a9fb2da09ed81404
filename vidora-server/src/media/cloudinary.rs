use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use super::{MediaStore, ResourceKind, TempUpload, UploadedAsset};
use crate::infra::config::CloudinaryConfig;

/// Signed-upload client for the Cloudinary REST API.
#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: ResourceKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.config.cloud_name,
            kind.as_str(),
            action
        )
    }

    /// Signed form carrying the credentials plus `params`.
    fn signed_form(&self, params: &[(&'static str, String)]) -> Form {
        let timestamp = Utc::now().timestamp().to_string();
        let mut signed: Vec<(&'static str, String)> = params.to_vec();
        signed.push(("timestamp", timestamp));

        let signature = sign(&signed, &self.config.api_secret);
        let form = signed
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));
        form.text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
    }

    async fn send_upload(
        &self,
        file: &TempUpload,
        kind: ResourceKind,
    ) -> anyhow::Result<UploadedAsset> {
        let bytes = tokio::fs::read(file.path())
            .await
            .with_context(|| format!("failed to read staged upload {}", file.path().display()))?;

        let mut part = Part::bytes(bytes).file_name(file.file_name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type)?;
        }
        let form = self.signed_form(&[]).part("file", part);

        let body: UploadResponse = self
            .client
            .post(self.endpoint(kind, "upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(UploadedAsset {
            url: body.secure_url,
            public_id: body.public_id,
            duration: body.duration,
        })
    }

    async fn send_destroy(&self, public_id: &str, kind: ResourceKind) -> anyhow::Result<String> {
        let form = self.signed_form(&[("public_id", public_id.to_string())]);
        let body: DestroyResponse = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.result)
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, file: TempUpload, kind: ResourceKind) -> Option<UploadedAsset> {
        let outcome = self.send_upload(&file, kind).await;
        let file_name = file.file_name().to_string();
        file.close();

        match outcome {
            Ok(asset) => {
                info!(%kind, public_id = %asset.public_id, "uploaded media asset");
                Some(asset)
            }
            Err(err) => {
                error!(%kind, file = %file_name, error = %err, "media upload failed");
                None
            }
        }
    }

    async fn delete(&self, public_id: &str, kind: ResourceKind) {
        match self.send_destroy(public_id, kind).await {
            Ok(result) if result == "ok" => debug!(%kind, %public_id, "deleted media asset"),
            Ok(result) => warn!(%kind, %public_id, %result, "media host did not delete asset"),
            Err(err) => warn!(%kind, %public_id, error = %err, "media delete failed"),
        }
    }
}

/// Parameters sorted by key, joined as `k=v&k=v`, suffixed with the secret
/// and hashed with SHA-256.
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn store(base: &str) -> CloudinaryStore {
        CloudinaryStore::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            base_url: Url::parse(base).unwrap(),
        })
    }

    #[test]
    fn signature_is_order_independent_hex_sha256() {
        let a = sign(
            &[("timestamp", "1".into()), ("public_id", "x".into())],
            "secret",
        );
        let b = sign(
            &[("public_id", "x".into()), ("timestamp", "1".into())],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret() {
        let params = [("timestamp", "1".to_string())];
        assert_ne!(sign(&params, "one"), sign(&params, "two"));
    }

    #[test]
    fn endpoints_follow_resource_kind() {
        let store = store("https://api.cloudinary.com/v1_1/");
        assert_eq!(
            store.endpoint(ResourceKind::Video, "upload"),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
        assert_eq!(
            store.endpoint(ResourceKind::Image, "destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[tokio::test]
    async fn unreachable_host_reports_none_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staged = tempfile::Builder::new()
            .tempfile_in(dir.path())
            .unwrap()
            .into_temp_path();
        let path = staged.to_path_buf();
        let upload = TempUpload::new(staged, "a.png".into(), Some("image/png".into()), 0);

        let store = store("http://127.0.0.1:9");
        assert!(store.upload(upload, ResourceKind::Image).await.is_none());
        assert!(!path.exists());
    }
}
