/// Post service - enforces the posting rules and shapes the feed
use crate::config::PostLimits;
use crate::db::{PostRepository, UserLookup};
use crate::error::{ErrorKind, PostError, Result};
use crate::metrics;
use crate::models::{
    AuthoredPost, FeedItem, FeedPage, FeedQuery, ListPostsRequest, NewPost, PostView, User,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserLookup>,
    limits: PostLimits,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserLookup>,
        limits: PostLimits,
    ) -> Self {
        Self {
            posts,
            users,
            limits,
        }
    }

    pub fn limits(&self) -> &PostLimits {
        &self.limits
    }

    /// Create an original post for `user_id`.
    ///
    /// Checks run in order: user exists, content is valid, daily quota.
    pub async fn create_post(&self, user_id: Uuid, raw_content: &str) -> Result<PostView> {
        let result = self.try_create_post(user_id, raw_content).await;
        match &result {
            Ok(view) => {
                metrics::record_post_created("post");
                tracing::info!(%user_id, post_id = %view.id, "post created");
            }
            Err(err) => observe_rejection(err, user_id, None),
        }
        result
    }

    /// Repost `original_post_id` on behalf of `user_id`.
    ///
    /// Checks run in order: user exists, target exists, target is not a
    /// repost, target is not the user's own, not already reposted, daily quota.
    pub async fn repost(&self, user_id: Uuid, original_post_id: Uuid) -> Result<PostView> {
        let result = self.try_repost(user_id, original_post_id).await;
        match &result {
            Ok(view) => {
                metrics::record_post_created("repost");
                tracing::info!(
                    %user_id,
                    post_id = %original_post_id,
                    repost_id = %view.id,
                    "post reposted"
                );
            }
            Err(err) => observe_rejection(err, user_id, Some(original_post_id)),
        }
        result
    }

    /// One page of the feed.
    pub async fn list_posts(&self, request: &ListPostsRequest) -> Result<FeedPage> {
        let query = FeedQuery::normalize(request, &self.limits);
        let started = Instant::now();

        let slice = self.posts.find_posts_page(&query).await?;

        metrics::record_feed_duration(query.sort.as_str(), started.elapsed());
        tracing::debug!(
            page = query.page,
            limit = query.limit,
            sort = query.sort.as_str(),
            search = query.search.is_some(),
            returned = slice.items.len(),
            has_more = slice.has_more,
            "feed page served"
        );

        Ok(FeedPage {
            data: slice.items.into_iter().map(PostView::from).collect(),
            page: query.page,
            limit: query.limit,
            has_more: slice.has_more,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.list_users().await?)
    }

    async fn try_create_post(&self, user_id: Uuid, raw_content: &str) -> Result<PostView> {
        let user = self.require_user(user_id).await?;
        let content = self.validate_content(raw_content)?;
        self.ensure_quota(user_id).await?;

        let post = self
            .posts
            .create(NewPost::original(user_id, content, Utc::now()))
            .await?;

        Ok(PostView::from(FeedItem::Original {
            post: AuthoredPost {
                post,
                author_username: user.username,
            },
            repost_count: 0,
        }))
    }

    async fn try_repost(&self, user_id: Uuid, original_post_id: Uuid) -> Result<PostView> {
        let user = self.require_user(user_id).await?;

        let original = match self.posts.find_by_id(original_post_id).await? {
            None => return Err(PostError::PostNotFound),
            Some(FeedItem::Repost { .. }) => return Err(PostError::RepostOfRepost),
            Some(FeedItem::Original { post, .. }) => post,
        };

        if original.post.author_id == user_id {
            return Err(PostError::SelfRepost);
        }
        if self.posts.has_reposted(user_id, original_post_id).await? {
            return Err(PostError::DuplicateRepost);
        }
        self.ensure_quota(user_id).await?;

        // A concurrent repost that slipped past has_reposted surfaces here
        // as StoreError::DuplicateRepost.
        let repost = self
            .posts
            .create(NewPost::repost_of(user_id, &original.post, Utc::now()))
            .await?;

        Ok(PostView::from(FeedItem::Repost {
            repost: AuthoredPost {
                post: repost,
                author_username: user.username,
            },
            original,
            repost_count: 0,
        }))
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(PostError::UserNotFound)
    }

    /// Trimmed content, or `InvalidContent` if empty or too long.
    fn validate_content(&self, raw_content: &str) -> Result<String> {
        let content = raw_content.trim();
        let length = content.chars().count();
        if length == 0 || length > self.limits.max_content_length {
            return Err(PostError::InvalidContent {
                max_length: self.limits.max_content_length,
            });
        }
        Ok(content.to_string())
    }

    async fn ensure_quota(&self, user_id: Uuid) -> Result<()> {
        let today = self.posts.count_user_posts_today(user_id).await?;
        if today >= i64::from(self.limits.daily_post_limit) {
            return Err(PostError::QuotaExceeded {
                limit: self.limits.daily_post_limit,
            });
        }
        Ok(())
    }
}

fn observe_rejection(err: &PostError, user_id: Uuid, post_id: Option<Uuid>) {
    metrics::record_rejection(err.reason());
    match err.kind() {
        ErrorKind::Unavailable => {
            tracing::warn!(%user_id, ?post_id, reason = err.reason(), error = %err, "post write failed")
        }
        _ => tracing::debug!(%user_id, ?post_id, reason = err.reason(), "post write rejected"),
    }
}
