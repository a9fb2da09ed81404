//! Entities persisted by the store and the read projections built from them.
//!
//! Entities serialize in camelCase with their owner references as bare ids;
//! projections denormalize owner summaries, counters and viewer-relative
//! flags so handlers never stitch rows together themselves.

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use serde::{Deserialize, Serialize};

pub use comments::{Comment, CommentView};
pub use dashboard::{ChannelStats, ChannelVideo};
pub use likes::{Like, LikeStatus, LikeTarget};
pub use playlists::{Playlist, PlaylistDetail, PlaylistSummary};
pub use subscriptions::{SubscribedChannel, SubscriberView, Subscription, SubscriptionStatus};
pub use tweets::{Tweet, TweetView};
pub use users::{ChannelProfile, NewUser, OwnerSummary, User};
pub use videos::{
    ChannelOwner, NewVideo, SortDirection, Video, VideoBrief, VideoCard, VideoChanges,
    VideoDetail, VideoFeedQuery, VideoSortField,
};

/// A file held by the media host: the public locator plus the id used to
/// delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub url: String,
    pub public_id: String,
}

impl Asset {
    pub fn new(url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: public_id.into(),
        }
    }
}
