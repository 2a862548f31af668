/// OpenAPI documentation for Posterr Post Service
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::models::{CreatePostRequest, FeedPage, OriginalPostView, PostView, RepostAttribution, User};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Posterr Post Service API",
        version = "1.0.0",
        description = "Posting, reposting and the paginated feed. The acting user is passed in the X-User-ID header. Each user may author a limited number of posts and reposts per UTC day.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        crate::handlers::posts::list_posts,
        crate::handlers::posts::create_post,
        crate::handlers::posts::repost,
        crate::handlers::users::list_users,
    ),
    components(schemas(
        CreatePostRequest,
        PostView,
        OriginalPostView,
        RepostAttribution,
        FeedPage,
        User,
        ErrorBody,
    )),
    tags(
        (name = "posts", description = "Feed, posting and reposting"),
        (name = "users", description = "Users available as X-User-ID"),
    ),
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/openapi.json"
    }
}
