use std::collections::HashMap;
use std::path::Path;

use axum::extract::{FromRequest, Multipart, Request};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::temp::TempUpload;
use crate::{
    AppState,
    infra::errors::{AppError, AppResult},
};

/// A parsed multipart body: text fields in memory, file fields staged on disk.
///
/// Files nobody takes are removed when the form is dropped.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, TempUpload>,
}

impl UploadForm {
    /// Drain `multipart`, staging file parts under `temp_dir`.
    ///
    /// A part counts as a file when it carries a filename. Empty file parts
    /// are discarded. A repeated field keeps its last value.
    pub async fn collect(mut multipart: Multipart, temp_dir: &Path) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(mut field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            };
            let content_type = field.content_type().map(str::to_string);

            fs::create_dir_all(temp_dir).await.map_err(|err| {
                AppError::internal(format!("Failed to prepare upload directory: {err}"))
            })?;
            let staged = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(temp_dir)
                .map_err(|err| AppError::internal(format!("Failed to stage upload: {err}")))?;
            let (std_file, path) = staged.into_parts();
            let mut file = fs::File::from_std(std_file);

            let mut len = 0u64;
            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk)
                    .await
                    .map_err(|err| AppError::internal(format!("Failed to stage upload: {err}")))?;
                len += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|err| AppError::internal(format!("Failed to stage upload: {err}")))?;

            let upload = TempUpload::new(path, file_name, content_type, len);
            if upload.is_empty() {
                debug!(field = %name, "discarding empty file part");
                upload.close();
                continue;
            }
            form.files.insert(name, upload);
        }

        Ok(form)
    }

    /// Trimmed text value, `None` when missing or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<TempUpload> {
        self.files.remove(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }
}

/// Stages the body under the configured upload directory; a request that
/// is not `multipart/form-data` is a 400 envelope.
impl FromRequest<AppState> for UploadForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Self::collect(multipart, &state.config.upload_temp_dir).await
    }
}
