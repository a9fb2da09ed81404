use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::info;

use vidora_core::{
    api_types::Empty,
    domain::{Tweet, TweetView, User},
};

use super::{ensure_owner, existing_user};
use crate::{
    extract::{JsonBody, parse_id, required},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
};

#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    pub content: Option<String>,
}

pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    JsonBody(request): JsonBody<TweetRequest>,
) -> AppResult<Envelope<Tweet>> {
    let content = required(request.content.as_deref(), "Content is required")?;
    let tweet = state.unit_of_work.tweets.create_tweet(user.id, content).await?;
    info!(tweet_id = %tweet.id, owner = %user.id, "tweet created");
    Ok(Envelope::created(tweet, "Tweet created successfully"))
}

pub async fn user_tweets(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
) -> AppResult<Envelope<Vec<TweetView>>> {
    let owner = existing_user(&state, parse_id(&user_id, "user")?).await?;
    let tweets = state.unit_of_work.tweets.user_tweets(owner.id, user.id).await?;
    Ok(Envelope::ok(tweets, "Tweets fetched successfully"))
}

async fn owned_tweet(state: &AppState, raw_id: &str, user: &User, action: &str) -> AppResult<Tweet> {
    let tweet = state
        .unit_of_work
        .tweets
        .get_tweet(parse_id(raw_id, "tweet")?)
        .await?
        .ok_or_else(|| AppError::not_found("Tweet not found"))?;
    ensure_owner(
        tweet.owner,
        user,
        &format!("You are not allowed to {action} this tweet"),
    )?;
    Ok(tweet)
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tweet_id): Path<String>,
    JsonBody(request): JsonBody<TweetRequest>,
) -> AppResult<Envelope<Tweet>> {
    let tweet = owned_tweet(&state, &tweet_id, &user, "update").await?;
    let content = required(request.content.as_deref(), "Content is required")?;
    let updated = state.unit_of_work.tweets.update_tweet(tweet.id, content).await?;
    Ok(Envelope::ok(updated, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tweet_id): Path<String>,
) -> AppResult<Envelope<Empty>> {
    let tweet = owned_tweet(&state, &tweet_id, &user, "delete").await?;
    state.unit_of_work.tweets.delete_tweet(tweet.id).await?;
    info!(tweet_id = %tweet.id, "tweet deleted");
    Ok(Envelope::ok(Empty {}, "Tweet deleted successfully"))
}
