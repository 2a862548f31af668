/// HTTP handlers for post-service
///
/// - Posts: feed listing, posting and reposting
/// - Users: the accounts that can act through `X-User-ID`
/// - Health: liveness and readiness checks
pub mod health;
pub mod posts;
pub mod users;

pub use health::HealthState;
pub use posts::{create_post, list_posts, repost};
pub use users::list_users;

use crate::error::AppError;
use actix_web::web;

/// Register the `/api` routes along with extractor configs that render
/// malformed input as the JSON error body.
///
/// Expects `web::Data<PostService>` and `web::Data<HealthState>` to be
/// registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_summary))
            .route("/health/ready", web::get().to(health::readiness_summary))
            .route("/health/live", web::get().to(health::liveness_check))
            .service(
                web::resource("/posts")
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .route("/posts/{post_id}/repost", web::post().to(repost))
            .route("/users", web::get().to(list_users)),
    );
}
