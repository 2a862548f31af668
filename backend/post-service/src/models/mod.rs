/// Data models for post-service
///
/// - `user`: accounts that author posts
/// - `post`: stored posts and reposts, plus the not-yet-persisted `NewPost`
/// - `feed`: feed items as read from the store and the list request
/// - `view`: response shapes returned to clients
pub mod feed;
pub mod post;
pub mod user;
pub mod view;

pub use feed::{FeedItem, FeedQuery, FeedSlice, ListPostsRequest, SortMode};
pub use post::{AuthoredPost, NewPost, Post};
pub use user::User;
pub use view::{CreatePostRequest, FeedPage, OriginalPostView, PostView, RepostAttribution};
