macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions.
///
/// Full paths, as clients and tests call them; the server strips
/// [`v1::ROOT`] and nests the remainder.
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub const HEALTHCHECK: &str = v1_path!("/healthcheck");

    pub mod users {
        pub const REGISTER: &str = v1_path!("/users/register");
        pub const LOGIN: &str = v1_path!("/users/login");
        pub const LOGOUT: &str = v1_path!("/users/logout");
        pub const REFRESH_TOKEN: &str = v1_path!("/users/refresh-token");
        pub const CHANGE_PASSWORD: &str = v1_path!("/users/change-password");
        pub const CURRENT_USER: &str = v1_path!("/users/current-user");
        pub const UPDATE_ACCOUNT: &str = v1_path!("/users/update-account");
        pub const AVATAR: &str = v1_path!("/users/avatar");
        pub const COVER_IMAGE: &str = v1_path!("/users/cover-image");
        pub const CHANNEL: &str = v1_path!("/users/c/{username}");
        pub const HISTORY: &str = v1_path!("/users/history");
    }

    pub mod tweets {
        pub const COLLECTION: &str = v1_path!("/tweets");
        pub const BY_USER: &str = v1_path!("/tweets/user/{userId}");
        pub const ITEM: &str = v1_path!("/tweets/{tweetId}");
    }

    pub mod subscriptions {
        pub const CHANNEL: &str = v1_path!("/subscriptions/c/{channelId}");
        pub const SUBSCRIBER: &str = v1_path!("/subscriptions/u/{subscriberId}");
    }

    pub mod videos {
        pub const COLLECTION: &str = v1_path!("/videos");
        pub const ITEM: &str = v1_path!("/videos/{videoId}");
        pub const TOGGLE_PUBLISH: &str = v1_path!("/videos/toggle/publish/{videoId}");
    }

    pub mod comments {
        pub const BY_VIDEO: &str = v1_path!("/comments/{videoId}");
        pub const ITEM: &str = v1_path!("/comments/c/{commentId}");
    }

    pub mod likes {
        pub const TOGGLE_VIDEO: &str = v1_path!("/likes/toggle/v/{videoId}");
        pub const TOGGLE_COMMENT: &str = v1_path!("/likes/toggle/c/{commentId}");
        pub const TOGGLE_TWEET: &str = v1_path!("/likes/toggle/t/{tweetId}");
        pub const LIKED_VIDEOS: &str = v1_path!("/likes/videos");
    }

    pub mod playlist {
        pub const COLLECTION: &str = v1_path!("/playlist");
        pub const ITEM: &str = v1_path!("/playlist/{playlistId}");
        pub const ADD_VIDEO: &str = v1_path!("/playlist/add/{videoId}/{playlistId}");
        pub const REMOVE_VIDEO: &str = v1_path!("/playlist/remove/{videoId}/{playlistId}");
        pub const BY_USER: &str = v1_path!("/playlist/user/{userId}");
    }

    pub mod dashboard {
        pub const STATS: &str = v1_path!("/dashboard/stats");
        pub const VIDEOS: &str = v1_path!("/dashboard/videos");
    }
}

/// Replace `{param}` placeholders in a route template, in order.
///
/// ```
/// use vidora_core::api::routes::{fill, v1};
/// assert_eq!(fill(v1::tweets::ITEM, &["abc"]), "/api/v1/tweets/abc");
/// ```
pub fn fill(template: &str, params: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut params = params.iter();
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        match params.next() {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 1]),
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out
}
