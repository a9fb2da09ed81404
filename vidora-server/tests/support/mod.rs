use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use parking_lot::Mutex;
use serde::{Deserialize, de::DeserializeOwned};
use tempfile::TempDir;

use vidora_core::{
    api::routes::{fill, v1},
    api_types::ApiResponse,
    application::AppUnitOfWork,
    database::InMemoryStore,
    domain::{User, Video},
};
use vidora_server::{
    AppState, create_app,
    infra::config::Config,
    media::{MediaStore, ResourceKind, TempUpload, UploadedAsset},
};

pub const PASSWORD: &str = "Password#123";

#[derive(Debug, Clone)]
#[allow(unused)]
pub struct RecordedUpload {
    pub file_name: String,
    pub kind: ResourceKind,
    pub len: u64,
    pub staged_path: PathBuf,
}

/// Media host double: remembers what it was asked to do and removes the
/// staged file exactly like the real store.
#[derive(Debug, Default)]
pub struct RecordingMediaStore {
    uploads: Mutex<Vec<RecordedUpload>>,
    deletes: Mutex<Vec<(String, ResourceKind)>>,
    fail_uploads: AtomicBool,
    next_id: AtomicUsize,
}

#[allow(unused)]
impl RecordingMediaStore {
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().clone()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletes.lock().iter().map(|(id, _)| id.clone()).collect()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, file: TempUpload, kind: ResourceKind) -> Option<UploadedAsset> {
        let record = RecordedUpload {
            file_name: file.file_name().to_string(),
            kind,
            len: file.len(),
            staged_path: file.path().to_path_buf(),
        };
        file.close();
        self.uploads.lock().push(record);

        if self.fail_uploads.load(Ordering::SeqCst) {
            return None;
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("{kind}-{n}");
        Some(UploadedAsset {
            url: format!("https://media.test/{public_id}"),
            public_id,
            duration: (kind == ResourceKind::Video).then_some(42.5),
        })
    }

    async fn delete(&self, public_id: &str, kind: ResourceKind) {
        self.deletes.lock().push((public_id.to_string(), kind));
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryStore,
    pub media: Arc<RecordingMediaStore>,
    pub state: AppState,
    pub upload_dir: PathBuf,
    _tempdir: TempDir,
}

pub fn test_config(upload_dir: &std::path::Path) -> Result<Config> {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://vidora@localhost/vidora_test".to_string()),
        ("ACCESS_TOKEN_SECRET", "access-secret-for-tests".to_string()),
        ("ACCESS_TOKEN_EXPIRY", "15m".to_string()),
        ("REFRESH_TOKEN_SECRET", "refresh-secret-for-tests".to_string()),
        ("REFRESH_TOKEN_EXPIRY", "1d".to_string()),
        ("CLOUDINARY_CLOUD_NAME", "vidora-test".to_string()),
        ("CLOUDINARY_API_KEY", "key".to_string()),
        ("CLOUDINARY_API_SECRET", "secret".to_string()),
        ("UPLOAD_TEMP_DIR", upload_dir.display().to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned())
}

pub fn build_test_app() -> Result<TestApp> {
    let tempdir = tempfile::tempdir().context("failed to create temporary directory")?;
    let upload_dir = tempdir.path().join("uploads");
    std::fs::create_dir_all(&upload_dir).context("failed to create upload directory")?;

    let config = Arc::new(test_config(&upload_dir)?);
    let store = InMemoryStore::new();
    let unit_of_work = Arc::new(AppUnitOfWork::in_memory(&store));
    let media = Arc::new(RecordingMediaStore::default());
    let state = AppState::new(unit_of_work, config, media.clone());

    let server = TestServer::new(create_app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        store,
        media,
        state,
        upload_dir,
        _tempdir: tempdir,
    })
}

pub fn image_part(name: &str) -> Part {
    Part::bytes(b"\x89PNG fake image bytes".to_vec())
        .file_name(format!("{name}.png"))
        .mime_type("image/png")
}

pub fn video_part() -> Part {
    Part::bytes(vec![0u8; 2048])
        .file_name("clip.mp4")
        .mime_type("video/mp4")
}

pub fn registration_form(username: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("username", username)
        .add_text("email", format!("{username}@example.com"))
        .add_text("password", PASSWORD)
        .add_text("fullName", format!("{username} tester"))
        .add_part("avatar", image_part("avatar"))
}

/// Unwrap the success envelope of a response.
pub fn data<T: DeserializeOwned>(response: &axum_test::TestResponse) -> T {
    response.json::<ApiResponse<T>>().data
}

#[allow(unused)]
impl TestApp {
    pub async fn register(&self, username: &str) -> Result<User> {
        let response = self
            .server
            .post(v1::users::REGISTER)
            .multipart(registration_form(username))
            .await;
        response.assert_status(StatusCode::CREATED);
        Ok(data(&response))
    }

    pub async fn login(&self, username: &str) -> Result<Session> {
        let response = self
            .server
            .post(v1::users::LOGIN)
            .json(&serde_json::json!({ "username": username, "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        Ok(data(&response))
    }

    /// Register and log in.
    pub async fn signup(&self, username: &str) -> Result<Session> {
        self.register(username).await?;
        self.login(username).await
    }

    /// Upload a draft video owned by the session's user.
    pub async fn upload_video(&self, session: &Session, title: &str) -> Result<Video> {
        let response = self
            .server
            .post(v1::videos::COLLECTION)
            .authorization_bearer(&session.access_token)
            .multipart(
                MultipartForm::new()
                    .add_text("title", title)
                    .add_text("description", format!("{title} description"))
                    .add_part("videoFile", video_part())
                    .add_part("thumbnail", image_part("thumb")),
            )
            .await;
        response.assert_status(StatusCode::CREATED);
        Ok(data(&response))
    }

    /// Upload and publish a video.
    pub async fn publish_video(&self, session: &Session, title: &str) -> Result<Video> {
        let video = self.upload_video(session, title).await?;
        let response = self
            .server
            .patch(&fill(v1::videos::TOGGLE_PUBLISH, &[&video.id.to_string()]))
            .authorization_bearer(&session.access_token)
            .await;
        response.assert_status_ok();
        let video: Video = data(&response);
        if !video.is_published {
            return Err(anyhow!("video {} did not publish", video.id));
        }
        Ok(video)
    }

    /// Files still staged in the upload directory.
    pub fn staged_files(&self) -> Result<usize> {
        Ok(std::fs::read_dir(&self.upload_dir)?.count())
    }
}
