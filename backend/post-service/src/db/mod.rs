/// Data access layer for post-service
///
/// `PostRepository` and `UserLookup` are the seams the service is written
/// against. `PgPostRepository`/`PgUserRepository` back them with PostgreSQL;
/// `InMemoryStore` backs both for tests and database-less runs.
pub mod memory;
pub mod post_repo;
pub mod seed;
pub mod user_repo;

pub use memory::InMemoryStore;
pub use post_repo::PgPostRepository;
pub use user_repo::PgUserRepository;

use anyhow::Context;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{FeedItem, FeedQuery, FeedSlice, NewPost, Post, User};

/// Storage contract for posts
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// One page of the feed, filtered by `query.search` and ordered by
    /// `query.sort`. `has_more` is computed against the same filtered set.
    async fn find_posts_page(&self, query: &FeedQuery) -> StoreResult<FeedSlice>;

    /// A post with its author and, for reposts, the original and its author.
    async fn find_by_id(&self, post_id: Uuid) -> StoreResult<Option<FeedItem>>;

    /// Persist a post. Fails with `DuplicateRepost` if the author already
    /// reposted the same original.
    async fn create(&self, post: NewPost) -> StoreResult<Post>;

    /// Posts and reposts authored by the user since the start of the UTC day.
    async fn count_user_posts_today(&self, user_id: Uuid) -> StoreResult<i64>;

    async fn has_reposted(&self, user_id: Uuid, original_post_id: Uuid) -> StoreResult<bool>;
}

/// Read-only access to users
#[async_trait::async_trait]
pub trait UserLookup: Send + Sync {
    async fn get_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// All users, ordered by username
    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run post-service migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
