use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::seed::DEMO_USERNAMES;
use super::{start_of_utc_day, PostRepository, UserLookup};
use crate::error::{StoreError, StoreResult};
use crate::models::{AuthoredPost, FeedItem, FeedQuery, FeedSlice, NewPost, Post, SortMode, User};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
}

impl State {
    fn repost_counts(&self) -> HashMap<Uuid, i64> {
        let mut counts = HashMap::new();
        for original in self.posts.values().filter_map(|p| p.original_post_id) {
            *counts.entry(original).or_insert(0) += 1;
        }
        counts
    }

    fn authored(&self, post: &Post) -> StoreResult<AuthoredPost> {
        let author = self.users.get(&post.author_id).ok_or_else(|| {
            integrity_error(format!("post {} has unknown author {}", post.id, post.author_id))
        })?;
        Ok(AuthoredPost {
            post: post.clone(),
            author_username: author.username.clone(),
        })
    }

    fn feed_item(&self, post: &Post, counts: &HashMap<Uuid, i64>) -> StoreResult<FeedItem> {
        let repost_count = counts.get(&post.id).copied().unwrap_or(0);
        let authored = self.authored(post)?;

        match post.original_post_id {
            None => Ok(FeedItem::Original {
                post: authored,
                repost_count,
            }),
            Some(original_id) => {
                let original = self.posts.get(&original_id).ok_or_else(|| {
                    integrity_error(format!(
                        "repost {} references missing post {}",
                        post.id, original_id
                    ))
                })?;
                Ok(FeedItem::Repost {
                    repost: authored,
                    original: self.authored(original)?,
                    repost_count,
                })
            }
        }
    }
}

fn integrity_error(message: String) -> StoreError {
    StoreError::Integrity(message)
}

fn feed_order(sort: SortMode, counts: &HashMap<Uuid, i64>, a: &Post, b: &Post) -> Ordering {
    let latest = b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id));
    match sort {
        SortMode::Latest => latest,
        SortMode::Trending => {
            let count = |p: &Post| counts.get(&p.id).copied().unwrap_or(0);
            count(b).cmp(&count(a)).then(latest)
        }
    }
}

/// Process-local store implementing both repository traits.
///
/// Every write runs under one write lock, so the duplicate-repost check and
/// the insert are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, username: &str) -> User {
        let user = User::new(username);
        self.state
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Insert the demo users if none exist yet.
    pub async fn seed_demo_users(&self) -> Vec<User> {
        let mut state = self.state.write().await;
        if !state.users.is_empty() {
            return Vec::new();
        }

        DEMO_USERNAMES
            .iter()
            .map(|username| {
                let user = User::new(*username);
                state.users.insert(user.id, user.clone());
                user
            })
            .collect()
    }

    /// Store a post as-is, bypassing every rule. Used to set up history with
    /// chosen timestamps.
    pub async fn insert_post(&self, post: Post) {
        self.state.write().await.posts.insert(post.id, post);
    }

    pub async fn repost_count(&self, post_id: Uuid) -> i64 {
        self.state
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.original_post_id == Some(post_id))
            .count() as i64
    }

    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryStore {
    async fn find_posts_page(&self, query: &FeedQuery) -> StoreResult<FeedSlice> {
        let state = self.state.read().await;
        let counts = state.repost_counts();

        let mut matching: Vec<&Post> = state
            .posts
            .values()
            .filter(|p| match query.search.as_deref() {
                Some(term) => !p.is_repost() && p.content == term,
                None => true,
            })
            .collect();
        matching.sort_by(|a, b| feed_order(query.sort, &counts, a, b));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = query.limit as usize;
        let window: Vec<&Post> = matching.into_iter().skip(offset).take(limit + 1).collect();
        let has_more = window.len() > limit;

        let items = window
            .into_iter()
            .take(limit)
            .map(|p| state.feed_item(p, &counts))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(FeedSlice { items, has_more })
    }

    async fn find_by_id(&self, post_id: Uuid) -> StoreResult<Option<FeedItem>> {
        let state = self.state.read().await;
        match state.posts.get(&post_id) {
            Some(post) => Ok(Some(state.feed_item(post, &state.repost_counts())?)),
            None => Ok(None),
        }
    }

    async fn create(&self, post: NewPost) -> StoreResult<Post> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&post.author_id) {
            return Err(integrity_error(format!("unknown author {}", post.author_id)));
        }

        if let Some(original_id) = post.original_post_id {
            if !state.posts.contains_key(&original_id) {
                return Err(integrity_error(format!("unknown original post {}", original_id)));
            }
            let duplicate = state.posts.values().any(|p| {
                p.author_id == post.author_id && p.original_post_id == Some(original_id)
            });
            if duplicate {
                return Err(StoreError::DuplicateRepost);
            }
        }

        let post = post.into_post();
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn count_user_posts_today(&self, user_id: Uuid) -> StoreResult<i64> {
        let since = start_of_utc_day(Utc::now());
        let count = self
            .state
            .read()
            .await
            .posts
            .values()
            .filter(|p| p.author_id == user_id && p.created_at >= since)
            .count();
        Ok(count as i64)
    }

    async fn has_reposted(&self, user_id: Uuid, original_post_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .posts
            .values()
            .any(|p| p.author_id == user_id && p.original_post_id == Some(original_post_id)))
    }
}

#[async_trait::async_trait]
impl UserLookup for InMemoryStore {
    async fn get_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.state.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
