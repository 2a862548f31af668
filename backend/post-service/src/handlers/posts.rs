/// Post handlers - HTTP endpoints for the feed, posting and reposting
use crate::error::{AppError, ErrorBody};
use crate::middleware::UserId;
use crate::models::{CreatePostRequest, FeedPage, ListPostsRequest, PostView};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// List posts, newest or most reposted first
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsRequest),
    responses(
        (status = 200, description = "One page of the feed", body = FeedPage),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_posts(
    service: web::Data<PostService>,
    query: web::Query<ListPostsRequest>,
) -> Result<HttpResponse, AppError> {
    let page = service.list_posts(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Create a post
#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    params(
        ("X-User-ID" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Post created", body = PostView),
        (status = 400, description = "Missing user header or invalid content", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Daily limit reached", body = ErrorBody)
    )
)]
pub async fn create_post(
    service: web::Data<PostService>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let post = service.create_post(user_id.0, &req.content).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Repost an existing post
#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/repost",
    tag = "posts",
    params(
        ("post_id" = Uuid, Path, description = "Post to repost"),
        ("X-User-ID" = Uuid, Header, description = "Acting user")
    ),
    responses(
        (status = 201, description = "Repost created", body = PostView),
        (status = 400, description = "Missing user header", body = ErrorBody),
        (status = 404, description = "User or post not found", body = ErrorBody),
        (status = 409, description = "Repost not allowed or daily limit reached", body = ErrorBody)
    )
)]
pub async fn repost(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let post = service.repost(user_id.0, post_id.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}
