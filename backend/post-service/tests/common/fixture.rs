//! Shared setup for post-service integration tests
//!
//! Builds a `PostService` over the in-memory store with the four demo users.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use post_service::db::InMemoryStore;
use post_service::models::{NewPost, Post, User};
use post_service::{PostLimits, PostService};
use std::sync::Arc;

pub struct Fixture {
    pub store: InMemoryStore,
    pub service: Arc<PostService>,
    pub alice: User,
    pub john: User,
    pub jane: User,
    pub bob: User,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_limits(PostLimits::default()).await
    }

    pub async fn with_limits(limits: PostLimits) -> Self {
        let store = InMemoryStore::new();
        let alice = store.insert_user("alice_johnson").await;
        let john = store.insert_user("john_doe").await;
        let jane = store.insert_user("jane_smith").await;
        let bob = store.insert_user("bob_wilson").await;

        let service = Arc::new(PostService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            limits,
        ));

        Self {
            store,
            service,
            alice,
            john,
            jane,
            bob,
        }
    }

    /// Store an original post at a chosen time, bypassing quota.
    pub async fn original_at(&self, author: &User, content: &str, at: DateTime<Utc>) -> Post {
        let post = NewPost::original(author.id, content.to_string(), at).into_post();
        self.store.insert_post(post.clone()).await;
        post
    }

    /// Store a repost at a chosen time, bypassing every rule.
    pub async fn repost_at(&self, author: &User, original: &Post, at: DateTime<Utc>) -> Post {
        let post = NewPost::repost_of(author.id, original, at).into_post();
        self.store.insert_post(post.clone()).await;
        post
    }

    /// An extra user beyond the demo four.
    pub async fn user(&self, username: &str) -> User {
        self.store.insert_user(username).await
    }
}
