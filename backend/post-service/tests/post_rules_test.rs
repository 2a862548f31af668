//! Integration Tests: posting and reposting rules
//!
//! Coverage:
//! - Content validation and the daily limit
//! - Repost legality (repost of a repost, own post, duplicates)
//! - Precedence between rules when several are violated at once
//! - Concurrent reposts of the same post by the same user

mod common;

use chrono::{Duration, Utc};
use common::fixture::Fixture;
use post_service::db::start_of_utc_day;
use post_service::models::ListPostsRequest;
use post_service::PostError;
use uuid::Uuid;

#[tokio::test]
async fn test_hello_post_appears_in_feed() {
    let fx = Fixture::new().await;

    let created = fx.service.create_post(fx.alice.id, "hello").await.unwrap();

    assert_eq!(created.content, "hello");
    assert_eq!(created.author_id, fx.alice.id);
    assert_eq!(created.repost_count, 0);
    assert!(created.repostable);

    let page = fx
        .service
        .list_posts(&ListPostsRequest::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, created.id);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_sixth_post_of_the_day_is_rejected() {
    let fx = Fixture::new().await;

    for i in 0..5 {
        fx.service
            .create_post(fx.john.id, &format!("post {}", i))
            .await
            .unwrap();
    }

    let err = fx.service.create_post(fx.john.id, "one more").await.unwrap_err();
    assert!(matches!(err, PostError::QuotaExceeded { limit: 5 }));
    assert_eq!(fx.store.post_count().await, 5);

    // Other users are unaffected
    fx.service.create_post(fx.jane.id, "still fine").await.unwrap();
}

#[tokio::test]
async fn test_reposts_count_toward_daily_limit() {
    let fx = Fixture::new().await;
    let original = fx.service.create_post(fx.alice.id, "hello").await.unwrap();

    for i in 0..4 {
        fx.service
            .create_post(fx.john.id, &format!("post {}", i))
            .await
            .unwrap();
    }
    fx.service.repost(fx.john.id, original.id).await.unwrap();

    assert!(matches!(
        fx.service.create_post(fx.john.id, "sixth").await,
        Err(PostError::QuotaExceeded { .. })
    ));
}

#[tokio::test]
async fn test_yesterdays_posts_do_not_count() {
    let fx = Fixture::new().await;
    let yesterday = start_of_utc_day(Utc::now()) - Duration::seconds(1);

    for i in 0..5 {
        fx.original_at(&fx.bob, &format!("old {}", i), yesterday).await;
    }

    fx.service.create_post(fx.bob.id, "new day").await.unwrap();
}

#[tokio::test]
async fn test_content_bounds() {
    let fx = Fixture::new().await;

    assert!(matches!(
        fx.service.create_post(fx.alice.id, "").await,
        Err(PostError::InvalidContent { .. })
    ));
    assert!(matches!(
        fx.service.create_post(fx.alice.id, &"a".repeat(778)).await,
        Err(PostError::InvalidContent { .. })
    ));

    let exact = fx
        .service
        .create_post(fx.alice.id, &format!("  {}  ", "a".repeat(777)))
        .await
        .unwrap();
    assert_eq!(exact.content.chars().count(), 777);
}

#[tokio::test]
async fn test_unknown_user_and_post() {
    let fx = Fixture::new().await;
    let stranger = Uuid::new_v4();

    assert!(matches!(
        fx.service.create_post(stranger, "hello").await,
        Err(PostError::UserNotFound)
    ));
    assert!(matches!(
        fx.service.repost(fx.alice.id, Uuid::new_v4()).await,
        Err(PostError::PostNotFound)
    ));
}

#[tokio::test]
async fn test_repost_increments_only_the_original() {
    let fx = Fixture::new().await;
    let p = fx.service.create_post(fx.alice.id, "hello").await.unwrap();
    let other = fx.service.create_post(fx.bob.id, "bystander").await.unwrap();

    let repost = fx.service.repost(fx.john.id, p.id).await.unwrap();

    assert!(repost.is_repost);
    assert!(!repost.repostable);
    assert_eq!(repost.content, "hello");
    assert_eq!(fx.store.repost_count(p.id).await, 1);
    assert_eq!(fx.store.repost_count(other.id).await, 0);
    assert_eq!(fx.store.repost_count(repost.id).await, 0);

    fx.service.repost(fx.jane.id, p.id).await.unwrap();
    assert_eq!(fx.store.repost_count(p.id).await, 2);
}

#[tokio::test]
async fn test_repost_restrictions() {
    let fx = Fixture::new().await;
    let p = fx.service.create_post(fx.alice.id, "hello").await.unwrap();
    let r = fx.service.repost(fx.john.id, p.id).await.unwrap();

    // Own post
    assert!(matches!(
        fx.service.repost(fx.alice.id, p.id).await,
        Err(PostError::SelfRepost)
    ));
    // Same original twice
    assert!(matches!(
        fx.service.repost(fx.john.id, p.id).await,
        Err(PostError::DuplicateRepost)
    ));
    // A repost, whether one's own or someone else's
    assert!(matches!(
        fx.service.repost(fx.john.id, r.id).await,
        Err(PostError::RepostOfRepost)
    ));
    assert!(matches!(
        fx.service.repost(fx.jane.id, r.id).await,
        Err(PostError::RepostOfRepost)
    ));

    assert_eq!(fx.store.repost_count(p.id).await, 1);
}

#[tokio::test]
async fn test_rule_precedence() {
    let fx = Fixture::new().await;
    let stranger = Uuid::new_v4();

    // User existence comes first
    assert!(matches!(
        fx.service.create_post(stranger, "").await,
        Err(PostError::UserNotFound)
    ));
    assert!(matches!(
        fx.service.repost(stranger, Uuid::new_v4()).await,
        Err(PostError::UserNotFound)
    ));

    // Exhaust alice's and john's quota, leaving posts to repost
    let now = Utc::now();
    let p = fx.original_at(&fx.bob, "hello", now).await;
    for i in 0..5 {
        fx.original_at(&fx.alice, &format!("a{}", i), now).await;
    }
    let own = fx.original_at(&fx.john, "mine", now).await;
    fx.repost_at(&fx.john, &p, now).await;
    for i in 0..3 {
        fx.original_at(&fx.john, &format!("j{}", i), now).await;
    }
    let r = fx.repost_at(&fx.jane, &p, now).await;

    // Content is checked before the quota
    assert!(matches!(
        fx.service.create_post(fx.alice.id, "   ").await,
        Err(PostError::InvalidContent { .. })
    ));
    assert!(matches!(
        fx.service.create_post(fx.alice.id, "valid").await,
        Err(PostError::QuotaExceeded { .. })
    ));

    // Structural repost rules are checked before the quota
    assert!(matches!(
        fx.service.repost(fx.john.id, r.id).await,
        Err(PostError::RepostOfRepost)
    ));
    assert!(matches!(
        fx.service.repost(fx.john.id, own.id).await,
        Err(PostError::SelfRepost)
    ));
    assert!(matches!(
        fx.service.repost(fx.john.id, p.id).await,
        Err(PostError::DuplicateRepost)
    ));
    let fresh = fx.original_at(&fx.bob, "fresh", now).await;
    assert!(matches!(
        fx.service.repost(fx.john.id, fresh.id).await,
        Err(PostError::QuotaExceeded { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reposts_yield_one() {
    let fx = Fixture::new().await;
    let p = fx.service.create_post(fx.alice.id, "hello").await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = fx.service.clone();
        let (user_id, post_id) = (fx.john.id, p.id);
        tasks.push(tokio::spawn(
            async move { service.repost(user_id, post_id).await },
        ));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(PostError::DuplicateRepost) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(fx.store.repost_count(p.id).await, 1);
}
