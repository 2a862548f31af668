use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::feed::FeedItem;
use crate::models::post::AuthoredPost;

/// Body of `POST /api/posts`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: String,
}

/// Post as rendered to clients.
///
/// For reposts the display fields (`content`, `createdAt`, `authorId`,
/// `authorUsername`) are the original's, while `id`, `repostCount` and
/// `repostable` describe the repost itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub is_repost: bool,
    pub original_post: Option<OriginalPostView>,
    pub reposted_by: Option<RepostAttribution>,
    pub repost_count: i64,
    pub repostable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginalPostView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
}

impl From<&AuthoredPost> for OriginalPostView {
    fn from(original: &AuthoredPost) -> Self {
        Self {
            id: original.post.id,
            content: original.post.content.clone(),
            created_at: original.post.created_at,
            author_id: original.post.author_id,
            author_username: original.author_username.clone(),
        }
    }
}

/// Who reposted, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepostAttribution {
    pub user_id: Uuid,
    pub username: String,
    pub reposted_at: DateTime<Utc>,
}

impl From<FeedItem> for PostView {
    fn from(item: FeedItem) -> Self {
        match item {
            FeedItem::Original { post, repost_count } => PostView {
                id: post.post.id,
                content: post.post.content,
                created_at: post.post.created_at,
                author_id: post.post.author_id,
                author_username: post.author_username,
                is_repost: false,
                original_post: None,
                reposted_by: None,
                repost_count,
                repostable: true,
            },
            FeedItem::Repost {
                repost,
                original,
                repost_count,
            } => {
                let original_post = OriginalPostView::from(&original);
                PostView {
                    id: repost.post.id,
                    content: original.post.content,
                    created_at: original.post.created_at,
                    author_id: original.post.author_id,
                    author_username: original.author_username,
                    is_repost: true,
                    original_post: Some(original_post),
                    reposted_by: Some(RepostAttribution {
                        user_id: repost.post.author_id,
                        username: repost.author_username,
                        reposted_at: repost.post.created_at,
                    }),
                    repost_count,
                    repostable: false,
                }
            }
        }
    }
}

/// Response of `GET /api/posts`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<PostView>,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}
