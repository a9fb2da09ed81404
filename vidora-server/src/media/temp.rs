use std::path::Path;

use tempfile::TempPath;
use tracing::warn;

/// A client upload staged on local disk.
///
/// The file is removed exactly once: by [`TempUpload::close`] or, failing
/// that, when the value is dropped.
#[derive(Debug)]
pub struct TempUpload {
    path: TempPath,
    file_name: String,
    content_type: Option<String>,
    len: u64,
}

impl TempUpload {
    pub fn new(path: TempPath, file_name: String, content_type: Option<String>, len: u64) -> Self {
        Self {
            path,
            file_name,
            content_type,
            len,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove the staged file now, logging instead of failing.
    pub fn close(self) {
        let shown = self.path.display().to_string();
        if let Err(err) = self.path.close() {
            warn!(path = %shown, error = %err, "failed to remove temporary upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn staged(dir: &Path) -> TempUpload {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)
            .unwrap();
        file.write_all(b"frame").unwrap();
        TempUpload::new(file.into_temp_path(), "clip.mp4".into(), None, 5)
    }

    #[test]
    fn close_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged(dir.path());
        let path = upload.path().to_path_buf();
        assert!(path.exists());

        upload.close();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged(dir.path());
        let path = upload.path().to_path_buf();

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn close_tolerates_a_file_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged(dir.path());
        std::fs::remove_file(upload.path()).unwrap();
        upload.close();
    }
}
