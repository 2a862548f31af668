use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{start_of_utc_day, PostRepository};
use crate::error::{StoreError, StoreResult};
use crate::models::{AuthoredPost, FeedItem, FeedQuery, FeedSlice, NewPost, Post, SortMode};

/// Name of the unique partial index guarding one repost per user and post
const UNIQUE_REPOST_CONSTRAINT: &str = "posts_unique_repost";

/// Post, author, optional original with its author, and the repost count
const FEED_SELECT: &str = r#"
SELECT p.id,
       p.content,
       p.created_at,
       p.author_id,
       p.original_post_id,
       u.username AS author_username,
       op.content AS original_content,
       op.created_at AS original_created_at,
       op.author_id AS original_author_id,
       ou.username AS original_author_username,
       (SELECT COUNT(*) FROM posts r WHERE r.original_post_id = p.id) AS repost_count
FROM posts p
JOIN users u ON u.id = p.author_id
LEFT JOIN posts op ON op.id = p.original_post_id
LEFT JOIN users ou ON ou.id = op.author_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    original_post_id: Option<Uuid>,
    author_username: String,
    original_content: Option<String>,
    original_created_at: Option<DateTime<Utc>>,
    original_author_id: Option<Uuid>,
    original_author_username: Option<String>,
    repost_count: i64,
}

impl TryFrom<FeedRow> for FeedItem {
    type Error = StoreError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        let post = AuthoredPost {
            post: Post {
                id: row.id,
                content: row.content,
                created_at: row.created_at,
                author_id: row.author_id,
                original_post_id: row.original_post_id,
            },
            author_username: row.author_username,
        };

        let Some(original_id) = row.original_post_id else {
            return Ok(FeedItem::Original {
                post,
                repost_count: row.repost_count,
            });
        };

        match (
            row.original_content,
            row.original_created_at,
            row.original_author_id,
            row.original_author_username,
        ) {
            (Some(content), Some(created_at), Some(author_id), Some(author_username)) => {
                Ok(FeedItem::Repost {
                    repost: post,
                    original: AuthoredPost {
                        post: Post {
                            id: original_id,
                            content,
                            created_at,
                            author_id,
                            original_post_id: None,
                        },
                        author_username,
                    },
                    repost_count: row.repost_count,
                })
            }
            _ => Err(StoreError::Integrity(format!(
                "repost {} references missing post {}",
                post.post.id, original_id
            ))),
        }
    }
}

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_clause(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Latest => "ORDER BY p.created_at DESC, p.id DESC",
        SortMode::Trending => "ORDER BY repost_count DESC, p.created_at DESC, p.id DESC",
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(UNIQUE_REPOST_CONSTRAINT) {
            return StoreError::DuplicateRepost;
        }
    }
    StoreError::Unavailable(err)
}

#[async_trait::async_trait]
impl PostRepository for PgPostRepository {
    async fn find_posts_page(&self, query: &FeedQuery) -> StoreResult<FeedSlice> {
        let sql = format!(
            "{FEED_SELECT} \
             WHERE ($1::text IS NULL OR (p.original_post_id IS NULL AND p.content = $1)) \
             {} LIMIT $2 OFFSET $3",
            order_clause(query.sort)
        );

        // One extra row tells us whether another page exists.
        let mut rows = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(query.search.as_deref())
            .bind(i64::from(query.limit) + 1)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        let has_more = rows.len() > query.limit as usize;
        rows.truncate(query.limit as usize);

        let items = rows
            .into_iter()
            .map(FeedItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeedSlice { items, has_more })
    }

    async fn find_by_id(&self, post_id: Uuid) -> StoreResult<Option<FeedItem>> {
        let sql = format!("{FEED_SELECT} WHERE p.id = $1");

        let row = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(FeedItem::try_from).transpose()?)
    }

    async fn create(&self, post: NewPost) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, content, created_at, author_id, original_post_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, content, created_at, author_id, original_post_id
            "#,
        )
        .bind(post.id)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.author_id)
        .bind(post.original_post_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn count_user_posts_today(&self, user_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(start_of_utc_day(Utc::now()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn has_reposted(&self, user_id: Uuid, original_post_id: Uuid) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE author_id = $1 AND original_post_id = $2)",
        )
        .bind(user_id)
        .bind(original_post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
