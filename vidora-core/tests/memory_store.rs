#![cfg(feature = "test-utils")]

use anyhow::Result;
use uuid::Uuid;
use vidora_core::api_types::PageRequest;
use vidora_core::application::{AppUnitOfWork, toggle_like, toggle_subscription};
use vidora_core::database::InMemoryStore;
use vidora_core::domain::{Asset, LikeTarget, NewUser, NewVideo, VideoFeedQuery, VideoSortField};
use vidora_core::CoreError;

fn new_user(name: &str) -> NewUser {
    NewUser::new(
        name,
        &format!("{name}@example.com"),
        name,
        "hash".into(),
        Asset::new(format!("https://cdn/{name}.png"), format!("avatar-{name}")),
        None,
    )
}

fn new_video(owner: Uuid, title: &str) -> NewVideo {
    NewVideo {
        owner,
        title: title.into(),
        description: format!("about {title}"),
        video_file: Asset::new(format!("https://cdn/{title}.mp4"), format!("video-{title}")),
        thumbnail: Asset::new(format!("https://cdn/{title}.jpg"), format!("thumb-{title}")),
        duration: 12.5,
    }
}

#[tokio::test]
async fn duplicate_handles_conflict_case_insensitively() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    uow.users.create_user(new_user("alice")).await?;

    let err = uow.users.create_user(new_user("ALICE")).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn deleting_a_video_leaves_no_orphans() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let owner = uow.users.create_user(new_user("owner")).await?;
    let fan = uow.users.create_user(new_user("fan")).await?;

    let video = uow.videos.create_video(new_video(owner.id, "intro")).await?;
    let keep = uow.videos.create_video(new_video(owner.id, "keep")).await?;
    let comment = uow.comments.create_comment(video.id, fan.id, "nice").await?;
    uow.comments.create_comment(keep.id, fan.id, "also nice").await?;
    toggle_like(uow.likes.as_ref(), LikeTarget::Video(video.id), fan.id).await?;
    toggle_like(uow.likes.as_ref(), LikeTarget::Comment(comment.id), owner.id).await?;
    toggle_like(uow.likes.as_ref(), LikeTarget::Video(keep.id), fan.id).await?;
    let playlist = uow.playlists.create_playlist(fan.id, "mix", "").await?;
    uow.playlists.add_video(playlist.id, video.id).await?;
    uow.videos.record_view(video.id, fan.id).await?;

    uow.videos.delete_video(video.id).await?;

    assert!(uow.videos.get_video(video.id).await?.is_none());
    assert!(uow.comments.get_comment(comment.id).await?.is_none());
    assert_eq!(store.comment_total(), 1);
    assert_eq!(store.like_total(), 1);
    let playlist = uow.playlists.get_playlist(playlist.id).await?.unwrap();
    assert!(playlist.videos.is_empty());
    assert!(uow.users.watch_history(fan.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn toggling_twice_restores_original_state() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let owner = uow.users.create_user(new_user("owner")).await?;
    let tweet = uow.tweets.create_tweet(owner.id, "hi").await?;
    let target = LikeTarget::Tweet(tweet.id);

    assert!(toggle_like(uow.likes.as_ref(), target, owner.id).await?.is_liked);
    assert!(!toggle_like(uow.likes.as_ref(), target, owner.id).await?.is_liked);
    assert!(uow.likes.find_like(target, owner.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn feed_only_lists_published_videos_in_requested_order() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let owner = uow.users.create_user(new_user("owner")).await?;

    let draft = uow.videos.create_video(new_video(owner.id, "draft")).await?;
    for title in ["beta", "alpha", "gamma"] {
        let video = uow.videos.create_video(new_video(owner.id, title)).await?;
        uow.videos.set_published(video.id, true).await?;
    }

    let page = uow
        .videos
        .feed(&VideoFeedQuery {
            sort_by: VideoSortField::Title,
            sort_direction: vidora_core::domain::SortDirection::Asc,
            page: PageRequest::new(1, 2),
            ..Default::default()
        })
        .await?;

    let titles: Vec<_> = page.items.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, ["alpha", "beta"]);
    assert_eq!(page.total_items, 3);
    assert!(page.has_next_page);
    assert!(page.items.iter().all(|v| v.id != draft.id));
    Ok(())
}

#[tokio::test]
async fn history_moves_rewatched_video_to_front() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let owner = uow.users.create_user(new_user("owner")).await?;
    let viewer = uow.users.create_user(new_user("viewer")).await?;
    let first = uow.videos.create_video(new_video(owner.id, "first")).await?;
    let second = uow.videos.create_video(new_video(owner.id, "second")).await?;
    uow.videos.set_published(first.id, true).await?;
    uow.videos.set_published(second.id, true).await?;

    uow.videos.record_view(first.id, viewer.id).await?;
    uow.videos.record_view(second.id, viewer.id).await?;
    uow.videos.record_view(first.id, viewer.id).await?;

    let history = uow.users.watch_history(viewer.id).await?;
    let ids: Vec<_> = history.iter().map(|v| v.id).collect();
    assert_eq!(ids, [first.id, second.id]);
    assert_eq!(history[0].views, 2);
    Ok(())
}

#[tokio::test]
async fn subscriber_list_reports_follow_back() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let channel = uow.users.create_user(new_user("channel")).await?;
    let fan = uow.users.create_user(new_user("fan")).await?;

    toggle_subscription(uow.subscriptions.as_ref(), fan.id, channel.id).await?;
    toggle_subscription(uow.subscriptions.as_ref(), channel.id, fan.id).await?;

    let subscribers = uow.subscriptions.channel_subscribers(channel.id).await?;
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].id, fan.id);
    assert!(subscribers[0].subscribed_to_subscriber);
    assert_eq!(subscribers[0].subscribers_count, 1);

    let profile = uow.users.channel_profile("CHANNEL", fan.id).await?.unwrap();
    assert!(profile.is_subscribed);
    assert_eq!(profile.subscribers_count, 1);
    assert_eq!(profile.channels_subscribed_to_count, 1);
    Ok(())
}

#[tokio::test]
async fn password_change_clears_refresh_token() -> Result<()> {
    let store = InMemoryStore::new();
    let uow = AppUnitOfWork::in_memory(&store);
    let user = uow.users.create_user(new_user("alice")).await?;
    uow.users.set_refresh_token(user.id, Some("token")).await?;

    uow.users.update_password(user.id, "new-hash").await?;

    assert!(uow.users.get_refresh_token(user.id).await?.is_none());
    assert_eq!(uow.users.get_password_hash(user.id).await?.as_deref(), Some("new-hash"));
    Ok(())
}
