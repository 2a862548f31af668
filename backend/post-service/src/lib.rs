/// Post Service Library
///
/// Posts, reposts and the paginated feed for Posterr. Each user may author a
/// bounded number of posts per UTC day; reposts copy the original's content
/// and are limited to one per user and original.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: stored posts, feed items and response shapes
/// - `services`: `PostService`, where the posting rules live
/// - `db`: repository traits with PostgreSQL and in-memory implementations
/// - `middleware`: the `X-User-ID` extractor
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;

pub use config::{Config, PostLimits};
pub use error::{AppError, PostError, Result};
pub use services::PostService;
