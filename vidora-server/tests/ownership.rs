use anyhow::Result;
use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use serde_json::json;

use vidora_core::{
    api::routes::{fill, v1},
    api_types::ApiErrorResponse,
    domain::{Comment, Playlist, Tweet, TweetView},
};

#[path = "support/mod.rs"]
mod support;
use support::{build_test_app, data};

#[tokio::test]
async fn tweet_owner_is_the_author_and_others_are_forbidden() -> Result<()> {
    let app = build_test_app()?;
    let author = app.signup("author").await?;
    let other = app.signup("other").await?;

    let created = app
        .server
        .post(v1::tweets::COLLECTION)
        .authorization_bearer(&author.access_token)
        .json(&json!({ "content": "hi" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let tweet: Tweet = data(&created);
    assert_eq!(tweet.content, "hi");
    assert_eq!(tweet.owner, author.user.id);

    let path = fill(v1::tweets::ITEM, &[&tweet.id.to_string()]);
    let forbidden = app
        .server
        .patch(&path)
        .authorization_bearer(&other.access_token)
        .json(&json!({ "content": "hijacked" }))
        .await;
    forbidden.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(forbidden.json::<ApiErrorResponse>().status_code, 403);

    app.server
        .delete(&path)
        .authorization_bearer(&other.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let edited = app
        .server
        .patch(&path)
        .authorization_bearer(&author.access_token)
        .json(&json!({ "content": "hello" }))
        .await;
    edited.assert_status_ok();
    assert_eq!(data::<Tweet>(&edited).content, "hello");

    let listed = app
        .server
        .get(&fill(v1::tweets::BY_USER, &[&author.user.id.to_string()]))
        .authorization_bearer(&other.access_token)
        .await;
    listed.assert_status_ok();
    let tweets: Vec<TweetView> = data(&listed);
    assert_eq!(tweets.len(), 1);
    assert_eq!(tweets[0].content, "hello");

    app.server
        .delete(&path)
        .authorization_bearer(&author.access_token)
        .await
        .assert_status_ok();
    app.server
        .delete(&path)
        .authorization_bearer(&author.access_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn blank_tweets_are_rejected() -> Result<()> {
    let app = build_test_app()?;
    let author = app.signup("author").await?;

    app.server
        .post(v1::tweets::COLLECTION)
        .authorization_bearer(&author.access_token)
        .json(&json!({ "content": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_comment_authors_edit_or_delete_comments() -> Result<()> {
    let app = build_test_app()?;
    let owner = app.signup("owner").await?;
    let commenter = app.signup("commenter").await?;
    let video = app.publish_video(&owner, "Talk").await?;

    let created = app
        .server
        .post(&fill(v1::comments::BY_VIDEO, &[&video.id.to_string()]))
        .authorization_bearer(&commenter.access_token)
        .json(&json!({ "content": "nice" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let comment: Comment = data(&created);
    assert_eq!(comment.video, video.id);

    let path = fill(v1::comments::ITEM, &[&comment.id.to_string()]);
    // Owning the video does not grant rights over its comments.
    app.server
        .patch(&path)
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "content": "edited by owner" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&path)
        .authorization_bearer(&owner.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .patch(&path)
        .authorization_bearer(&commenter.access_token)
        .json(&json!({ "content": "very nice" }))
        .await
        .assert_status_ok();
    app.server
        .delete(&path)
        .authorization_bearer(&commenter.access_token)
        .await
        .assert_status_ok();
    assert_eq!(app.store.comment_total(), 0);
    Ok(())
}

#[tokio::test]
async fn only_video_owners_mutate_videos() -> Result<()> {
    let app = build_test_app()?;
    let owner = app.signup("owner").await?;
    let other = app.signup("other").await?;
    let video = app.publish_video(&owner, "Mine").await?;
    let id = video.id.to_string();

    app.server
        .patch(&fill(v1::videos::ITEM, &[&id]))
        .authorization_bearer(&other.access_token)
        .multipart(MultipartForm::new().add_text("title", "Theirs"))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .patch(&fill(v1::videos::TOGGLE_PUBLISH, &[&id]))
        .authorization_bearer(&other.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&fill(v1::videos::ITEM, &[&id]))
        .authorization_bearer(&other.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert!(app.media.deleted_ids().is_empty());
    Ok(())
}

#[tokio::test]
async fn only_playlist_owners_mutate_playlists() -> Result<()> {
    let app = build_test_app()?;
    let owner = app.signup("owner").await?;
    let other = app.signup("other").await?;
    let video = app.publish_video(&owner, "Track").await?;

    let created = app
        .server
        .post(v1::playlist::COLLECTION)
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "name": "Mix", "description": "favourites" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let playlist: Playlist = data(&created);
    let pid = playlist.id.to_string();
    let vid = video.id.to_string();

    app.server
        .patch(&fill(v1::playlist::ITEM, &[&pid]))
        .authorization_bearer(&other.access_token)
        .json(&json!({ "name": "Stolen" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .patch(&fill(v1::playlist::ADD_VIDEO, &[&vid, &pid]))
        .authorization_bearer(&other.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .delete(&fill(v1::playlist::ITEM, &[&pid]))
        .authorization_bearer(&other.access_token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&fill(v1::playlist::ITEM, &[&pid]))
        .authorization_bearer(&owner.access_token)
        .await
        .assert_status_ok();
    app.server
        .get(&fill(v1::playlist::ITEM, &[&pid]))
        .authorization_bearer(&owner.access_token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    Ok(())
}
