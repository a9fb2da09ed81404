//! Account lifecycle: registration, sessions, credentials and profile.

use std::sync::LazyLock;

use axum::{
    Extension,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vidora_core::{
    api_types::Empty,
    domain::{Asset, ChannelProfile, NewUser, User, VideoCard, users::normalize_handle},
};

use crate::{
    auth::{
        cookies::{REFRESH_TOKEN_COOKIE, clear_session_cookies, read_cookie, set_session_cookies},
        password::{hash_password, verify_password},
        token::{TokenError, TokenPair},
    },
    extract::{JsonBody, non_blank, required},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
    media::{ResourceKind, UploadForm, upload_all},
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(AppError::bad_request("Invalid email address"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Register an account from a multipart form.
///
/// Fields: `username`, `email`, `password`, `fullName`, file `avatar`
/// (required) and file `coverImage` (optional). Uploaded assets are removed
/// from the media host again when the account cannot be stored.
pub async fn register(
    State(state): State<AppState>,
    mut form: UploadForm,
) -> AppResult<Envelope<User>> {
    let (Some(username), Some(email), Some(password), Some(full_name)) = (
        form.text("username"),
        form.text("email"),
        form.text("password"),
        form.text("fullName"),
    ) else {
        return Err(AppError::bad_request("All fields are required"));
    };
    validate_email(email)?;
    let (username, email, full_name) = (
        normalize_handle(username),
        normalize_handle(email),
        full_name.to_string(),
    );
    let password_hash = hash_password(password)?;

    let users = &state.unit_of_work.users;
    if users.get_user_by_username(&username).await?.is_some()
        || users.get_user_by_email(&email).await?.is_some()
    {
        return Err(AppError::conflict("User with email or username already exists"));
    }

    let avatar = form
        .take_file("avatar")
        .ok_or_else(|| AppError::bad_request("Avatar file is required"))?;
    let mut files = vec![(avatar, ResourceKind::Image)];
    if let Some(cover) = form.take_file("coverImage") {
        files.push((cover, ResourceKind::Image));
    }
    let mut uploaded = upload_all(state.media.as_ref(), files)
        .await
        .ok_or_else(|| AppError::bad_request("Failed to upload avatar"))?
        .into_iter();
    let avatar = uploaded
        .next()
        .map(|asset| asset.asset())
        .ok_or_else(|| AppError::internal("Avatar upload went missing"))?;
    let cover_image = uploaded.next().map(|asset| asset.asset());

    let new_user = NewUser::new(
        &username,
        &email,
        &full_name,
        password_hash,
        avatar.clone(),
        cover_image.clone(),
    );
    let user = match users.create_user(new_user).await {
        Ok(user) => user,
        Err(err) => {
            discard_assets(&state, [Some(avatar), cover_image]).await;
            return Err(err.into());
        }
    };

    info!(user_id = %user.id, username = %user.username, "registered user");
    Ok(Envelope::created(user, "User registered successfully"))
}

async fn discard_assets<const N: usize>(state: &AppState, assets: [Option<Asset>; N]) {
    for asset in assets.into_iter().flatten() {
        state.media.delete(&asset.public_id, ResourceKind::Image).await;
    }
}

/// Log in with `username` or `email` plus `password`.
///
/// Sets both token cookies and also returns the tokens in the body. An
/// unknown account and a wrong password are indistinguishable 401s.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let password = required(request.password.as_deref(), "Password is required")?;
    let users = &state.unit_of_work.users;

    let user = match (
        non_blank(request.username.as_deref()),
        non_blank(request.email.as_deref()),
    ) {
        (Some(username), _) => users.get_user_by_username(&normalize_handle(username)).await?,
        (None, Some(email)) => users.get_user_by_email(&normalize_handle(email)).await?,
        (None, None) => return Err(AppError::bad_request("Username or email is required")),
    };
    let invalid = || AppError::unauthorized("Invalid user credentials");
    let user = user.ok_or_else(invalid)?;

    let stored_hash = users.get_password_hash(user.id).await?.ok_or_else(invalid)?;
    if !verify_password(password, &stored_hash) {
        warn!(user_id = %user.id, "rejected login with wrong password");
        return Err(invalid());
    }

    let tokens = start_session(&state, &user).await?;
    info!(user_id = %user.id, "user logged in");
    Ok((
        set_session_cookies(&tokens),
        Envelope::ok(
            SessionResponse {
                user,
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

/// Issue a fresh pair and make its refresh token the only valid one.
async fn start_session(state: &AppState, user: &User) -> AppResult<TokenPair> {
    let tokens = state.tokens.issue_pair(user)?;
    state
        .unit_of_work
        .users
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await?;
    Ok(tokens)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<impl IntoResponse> {
    state.unit_of_work.users.set_refresh_token(user.id, None).await?;
    info!(user_id = %user.id, "user logged out");
    Ok((
        clear_session_cookies(),
        Envelope::ok(Empty {}, "User logged out"),
    ))
}

/// Rotate tokens using the `refreshToken` cookie or JSON body field.
///
/// The presented token must equal the one stored for the account, so a
/// token that was already rotated out, or revoked by logout or a password
/// change, fails with a mismatch.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let from_body = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|err| AppError::bad_request(format!("Invalid JSON body: {err}")))?
    };
    let presented = read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .or_else(|| from_body.refresh_token.filter(|token| !token.trim().is_empty()))
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let claims = state.tokens.verify_refresh(&presented)?;
    let users = &state.unit_of_work.users;
    let user = users
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    let stored = users.get_refresh_token(user.id).await?;
    if stored.as_deref() != Some(presented.as_str()) {
        warn!(user_id = %user.id, "refresh token mismatch");
        return Err(TokenError::TokenMismatch.into());
    }

    let tokens = start_session(&state, &user).await?;
    Ok((
        set_session_cookies(&tokens),
        Envelope::ok(tokens, "Access token refreshed"),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> AppResult<Envelope<Empty>> {
    let (Some(old_password), Some(new_password)) = (
        non_blank(request.old_password.as_deref()),
        non_blank(request.new_password.as_deref()),
    ) else {
        return Err(AppError::bad_request("Old and new password are required"));
    };

    let users = &state.unit_of_work.users;
    let stored_hash = users
        .get_password_hash(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !verify_password(old_password, &stored_hash) {
        return Err(AppError::bad_request("Invalid old password"));
    }

    users.update_password(user.id, &hash_password(new_password)?).await?;
    info!(user_id = %user.id, "password changed");
    Ok(Envelope::ok(Empty {}, "Password changed successfully"))
}

pub async fn current_user(Extension(user): Extension<User>) -> Envelope<User> {
    Envelope::ok(user, "User fetched successfully")
}

pub async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    JsonBody(request): JsonBody<UpdateAccountRequest>,
) -> AppResult<Envelope<User>> {
    let email = non_blank(request.email.as_deref()).map(normalize_handle);
    let full_name = non_blank(request.full_name.as_deref());
    if email.is_none() && full_name.is_none() {
        return Err(AppError::bad_request("At least one field is required"));
    }
    if let Some(email) = email.as_deref() {
        validate_email(email)?;
    }

    let updated = state
        .unit_of_work
        .users
        .update_account(user.id, email.as_deref(), full_name)
        .await?;
    Ok(Envelope::ok(updated, "Account details updated successfully"))
}

/// Which of the two profile images a replacement targets.
#[derive(Debug, Clone, Copy)]
enum ProfileImage {
    Avatar,
    Cover,
}

impl ProfileImage {
    fn field(self) -> &'static str {
        match self {
            ProfileImage::Avatar => "avatar",
            ProfileImage::Cover => "coverImage",
        }
    }
}

pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    form: UploadForm,
) -> AppResult<Envelope<User>> {
    let updated = replace_profile_image(&state, &user, form, ProfileImage::Avatar).await?;
    Ok(Envelope::ok(updated, "Avatar image updated successfully"))
}

pub async fn update_cover_image(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    form: UploadForm,
) -> AppResult<Envelope<User>> {
    let updated = replace_profile_image(&state, &user, form, ProfileImage::Cover).await?;
    Ok(Envelope::ok(updated, "Cover image updated successfully"))
}

/// Upload the new image, store it, then delete the previous asset.
async fn replace_profile_image(
    state: &AppState,
    user: &User,
    mut form: UploadForm,
    image: ProfileImage,
) -> AppResult<User> {
    let file = form
        .take_file(image.field())
        .ok_or_else(|| AppError::bad_request(format!("{} file is missing", image.field())))?;
    let asset = state
        .media
        .upload(file, ResourceKind::Image)
        .await
        .ok_or_else(|| AppError::bad_request(format!("Error while uploading {}", image.field())))?
        .asset();

    let users = &state.unit_of_work.users;
    let (stored, previous) = match image {
        ProfileImage::Avatar => (
            users.update_avatar(user.id, &asset).await,
            Some(user.avatar_asset()),
        ),
        ProfileImage::Cover => (
            users.update_cover_image(user.id, &asset).await,
            user.cover_image_asset(),
        ),
    };
    let updated = match stored {
        Ok(updated) => updated,
        Err(err) => {
            discard_assets(state, [Some(asset)]).await;
            return Err(err.into());
        }
    };

    discard_assets(state, [previous]).await;
    Ok(updated)
}

pub async fn channel_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(username): Path<String>,
) -> AppResult<Envelope<ChannelProfile>> {
    let username = required(Some(username.as_str()), "Username is missing")?;
    let profile = state
        .unit_of_work
        .users
        .channel_profile(&normalize_handle(username), user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Channel does not exist"))?;
    Ok(Envelope::ok(profile, "User channel fetched successfully"))
}

pub async fn watch_history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Envelope<Vec<VideoCard>>> {
    let history = state.unit_of_work.users.watch_history(user.id).await?;
    Ok(Envelope::ok(history, "Watch history fetched successfully"))
}
