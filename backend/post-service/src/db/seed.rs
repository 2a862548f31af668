use anyhow::Context;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Accounts created on first start so the feed can be exercised without a
/// user service.
pub const DEMO_USERNAMES: [&str; 4] = ["alice_johnson", "john_doe", "jane_smith", "bob_wilson"];

/// Insert the demo users if the users table is empty. Returns how many were
/// inserted.
pub async fn seed_demo_users(pool: &PgPool) -> anyhow::Result<usize> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("failed to count users")?;

    if existing > 0 {
        tracing::debug!(existing, "users table already populated, skipping seed");
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("failed to open seed transaction")?;
    let now = Utc::now();
    let mut inserted = 0usize;

    for username in DEMO_USERNAMES {
        let result = sqlx::query(
            "INSERT INTO users (id, username, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT users_username_key DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert demo user {}", username))?;
        // Zero when a concurrent starter already took the username
        inserted += result.rows_affected() as usize;
    }

    tx.commit().await.context("failed to commit seed transaction")?;

    tracing::info!(count = inserted, "Seeded demo users");
    Ok(inserted)
}
