use anyhow::Result;
use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use cookie::Cookie;
use serde_json::json;

use vidora_core::{
    api::routes::v1,
    api_types::{ApiErrorResponse, Empty},
    domain::User,
};
use vidora_server::auth::TokenPair;

#[path = "support/mod.rs"]
mod support;
use support::{PASSWORD, build_test_app, data, image_part, registration_form};

fn error_body(response: &axum_test::TestResponse) -> ApiErrorResponse {
    response.json::<ApiErrorResponse>()
}

#[tokio::test]
async fn register_creates_account_without_credentials_in_body() -> Result<()> {
    let app = build_test_app()?;

    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(registration_form("Alice").add_part("coverImage", image_part("cover")))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"]["coverImage"].is_string());
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("refreshToken").is_none());

    assert_eq!(app.media.uploads().len(), 2);
    assert_eq!(app.staged_files()?, 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() -> Result<()> {
    let app = build_test_app()?;
    app.register("bob").await?;

    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(registration_form("BOB"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let error = error_body(&response);
    assert_eq!(error.status_code, 409);
    assert!(!error.success);
    assert!(error.errors.is_empty());

    let same_email = MultipartForm::new()
        .add_text("username", "robert")
        .add_text("email", "bob@example.com")
        .add_text("password", PASSWORD)
        .add_text("fullName", "Robert")
        .add_part("avatar", image_part("avatar"));
    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(same_email)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // Rejected before anything reached the media host.
    assert_eq!(app.media.uploads().len(), 1);
    assert_eq!(app.staged_files()?, 0);
    Ok(())
}

#[tokio::test]
async fn register_requires_every_field_and_an_avatar() -> Result<()> {
    let app = build_test_app()?;

    let missing_name = MultipartForm::new()
        .add_text("username", "carol")
        .add_text("email", "carol@example.com")
        .add_text("password", PASSWORD)
        .add_text("fullName", "   ")
        .add_part("avatar", image_part("avatar"));
    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(missing_name)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&response).message, "All fields are required");

    let no_avatar = MultipartForm::new()
        .add_text("username", "carol")
        .add_text("email", "carol@example.com")
        .add_text("password", PASSWORD)
        .add_text("fullName", "Carol");
    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(no_avatar)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(app.staged_files()?, 0);
    Ok(())
}

#[tokio::test]
async fn failed_avatar_upload_rejects_registration() -> Result<()> {
    let app = build_test_app()?;
    app.media.fail_uploads(true);

    let response = app
        .server
        .post(v1::users::REGISTER)
        .multipart(registration_form("dave"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.staged_files()?, 0);

    app.media.fail_uploads(false);
    app.register("dave").await?;
    Ok(())
}

#[tokio::test]
async fn login_rejects_unknown_account_and_wrong_password() -> Result<()> {
    let app = build_test_app()?;
    app.register("erin").await?;

    let wrong_password = app
        .server
        .post(v1::users::LOGIN)
        .json(&json!({ "username": "erin", "password": "not-it" }))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);

    let unknown = app
        .server
        .post(v1::users::LOGIN)
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_body(&wrong_password).message,
        error_body(&unknown).message
    );

    let by_email = app
        .server
        .post(v1::users::LOGIN)
        .json(&json!({ "email": "ERIN@example.com", "password": PASSWORD }))
        .await;
    by_email.assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn login_sets_http_only_secure_cookies() -> Result<()> {
    let app = build_test_app()?;
    app.register("frank").await?;

    let response = app
        .server
        .post(v1::users::LOGIN)
        .json(&json!({ "username": "frank", "password": PASSWORD }))
        .await;
    response.assert_status_ok();

    let session: support::Session = data(&response);
    for name in ["accessToken", "refreshToken"] {
        let cookie = response.cookie(name);
        assert_eq!(cookie.http_only(), Some(true), "{name}");
        assert_eq!(cookie.secure(), Some(true), "{name}");
        assert_eq!(cookie.path(), Some("/"), "{name}");
    }
    assert_eq!(response.cookie("accessToken").value(), session.access_token);
    assert_eq!(
        app.store.refresh_token_of(session.user.id).as_deref(),
        Some(session.refresh_token.as_str())
    );
    Ok(())
}

#[tokio::test]
async fn protected_routes_accept_bearer_or_cookie() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("grace").await?;

    let anonymous = app.server.get(v1::users::CURRENT_USER).await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);

    let bearer = app
        .server
        .get(v1::users::CURRENT_USER)
        .authorization_bearer(&session.access_token)
        .await;
    bearer.assert_status_ok();
    assert_eq!(data::<User>(&bearer).id, session.user.id);

    let cookie = app
        .server
        .get(v1::users::CURRENT_USER)
        .add_cookie(Cookie::new("accessToken", session.access_token.clone()))
        .await;
    cookie.assert_status_ok();
    assert_eq!(data::<User>(&cookie).username, "grace");
    Ok(())
}

#[tokio::test]
async fn tampered_or_foreign_tokens_are_rejected() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("heidi").await?;

    let mut tampered = session.access_token.clone();
    tampered.push('x');
    app.server
        .get(v1::users::CURRENT_USER)
        .authorization_bearer(&tampered)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // A refresh token is signed with the other secret.
    app.server
        .get(v1::users::CURRENT_USER)
        .authorization_bearer(&session.refresh_token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_rejects_the_old_token() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("ivan").await?;

    let rotated = app
        .server
        .post(v1::users::REFRESH_TOKEN)
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    rotated.assert_status_ok();
    let pair: TokenPair = data(&rotated);
    assert_ne!(pair.refresh_token, session.refresh_token);
    assert_eq!(
        app.store.refresh_token_of(session.user.id),
        Some(pair.refresh_token.clone())
    );

    let replay = app
        .server
        .post(v1::users::REFRESH_TOKEN)
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    replay.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_body(&replay).message, "Refresh token is expired or used");

    let via_cookie = app
        .server
        .post(v1::users::REFRESH_TOKEN)
        .add_cookie(Cookie::new("refreshToken", pair.refresh_token.clone()))
        .await;
    via_cookie.assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn logout_revokes_the_refresh_token() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("judy").await?;

    let response = app
        .server
        .post(v1::users::LOGOUT)
        .authorization_bearer(&session.access_token)
        .await;
    response.assert_status_ok();
    let _: Empty = data(&response);
    assert_eq!(response.cookie("accessToken").value(), "");
    assert!(app.store.refresh_token_of(session.user.id).is_none());

    app.server
        .post(v1::users::REFRESH_TOKEN)
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn change_password_checks_old_password_and_clears_refresh() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("mallory").await?;

    let wrong = app
        .server
        .post(v1::users::CHANGE_PASSWORD)
        .authorization_bearer(&session.access_token)
        .json(&json!({ "oldPassword": "guess", "newPassword": "Another#456" }))
        .await;
    wrong.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&wrong).message, "Invalid old password");

    app.server
        .post(v1::users::CHANGE_PASSWORD)
        .authorization_bearer(&session.access_token)
        .json(&json!({ "oldPassword": PASSWORD, "newPassword": "Another#456" }))
        .await
        .assert_status_ok();
    assert!(app.store.refresh_token_of(session.user.id).is_none());

    app.server
        .post(v1::users::LOGIN)
        .json(&json!({ "username": "mallory", "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post(v1::users::LOGIN)
        .json(&json!({ "username": "mallory", "password": "Another#456" }))
        .await
        .assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn update_account_and_avatar_replacement() -> Result<()> {
    let app = build_test_app()?;
    let session = app.signup("niaj").await?;

    app.server
        .patch(v1::users::UPDATE_ACCOUNT)
        .authorization_bearer(&session.access_token)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let updated = app
        .server
        .patch(v1::users::UPDATE_ACCOUNT)
        .authorization_bearer(&session.access_token)
        .json(&json!({ "fullName": "Niaj Renamed" }))
        .await;
    updated.assert_status_ok();
    let user: User = data(&updated);
    assert_eq!(user.full_name, "Niaj Renamed");
    assert_eq!(user.email, session.user.email);

    let avatar = app
        .server
        .patch(v1::users::AVATAR)
        .authorization_bearer(&session.access_token)
        .multipart(MultipartForm::new().add_part("avatar", image_part("new-avatar")))
        .await;
    avatar.assert_status_ok();
    let user: User = data(&avatar);
    assert_ne!(user.avatar, session.user.avatar);

    // The previous avatar's public id is the tail of its URL in the double.
    let old_public_id = session
        .user
        .avatar
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    assert!(app.media.deleted_ids().contains(&old_public_id));
    Ok(())
}

#[tokio::test]
async fn unknown_routes_and_malformed_json_use_the_failure_envelope() -> Result<()> {
    let app = build_test_app()?;

    let missing = app.server.get("/api/v1/nope").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let error = error_body(&missing);
    assert_eq!(error.message, "Route /api/v1/nope not found");
    assert!(!error.success);

    let malformed = app
        .server
        .post(v1::users::LOGIN)
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&malformed).status_code, 400);
    Ok(())
}

#[tokio::test]
async fn healthcheck_reports_the_store() -> Result<()> {
    let app = build_test_app()?;
    let response = app.server.get(v1::HEALTHCHECK).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "up");
    Ok(())
}
