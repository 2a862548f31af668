use crate::error::{AppError, ErrorBody};
use crate::models::User;
use crate::services::PostService;
use actix_web::{web, HttpResponse};

/// List users who can post, ordered by username
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_users(service: web::Data<PostService>) -> Result<HttpResponse, AppError> {
    let users = service.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}
