use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity as stored. A post with `original_post_id` set is a repost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub original_post_id: Option<Uuid>,
}

impl Post {
    pub fn is_repost(&self) -> bool {
        self.original_post_id.is_some()
    }
}

/// A post ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub original_post_id: Option<Uuid>,
}

impl NewPost {
    /// An authored post. `content` must already be trimmed and validated.
    pub fn original(author_id: Uuid, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            created_at,
            author_id,
            original_post_id: None,
        }
    }

    /// A repost of `original`, carrying a snapshot of its content.
    pub fn repost_of(author_id: Uuid, original: &Post, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: original.content.clone(),
            created_at,
            author_id,
            original_post_id: Some(original.id),
        }
    }

    pub fn into_post(self) -> Post {
        Post {
            id: self.id,
            content: self.content,
            created_at: self.created_at,
            author_id: self.author_id,
            original_post_id: self.original_post_id,
        }
    }
}

/// Post joined with its author's handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredPost {
    pub post: Post,
    pub author_username: String,
}
