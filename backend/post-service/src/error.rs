/// Error types for Post Service
///
/// Three layers:
/// - `StoreError`: failures reported by a repository implementation
/// - `PostError`: typed outcomes of the post rules, returned by `PostService`
/// - `AppError`: HTTP-facing error rendered by the actix handlers
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, PostError>;

/// Result type for repository operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Repository failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Write rejected by the one-repost-per-user constraint
    #[error("repost already exists for this author and post")]
    DuplicateRepost,

    /// The backing store could not serve the request
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// Stored data breaks a relationship the store relies on, such as a
    /// repost whose original is gone
    #[error("store integrity violation: {0}")]
    Integrity(String),
}

/// Coarse classification used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unavailable,
}

/// Outcomes of post rules that are reported to the caller
#[derive(Error, Debug)]
pub enum PostError {
    #[error("User not found.")]
    UserNotFound,

    #[error("Post not found.")]
    PostNotFound,

    #[error("Post content cannot be empty or exceed {max_length} characters.")]
    InvalidContent { max_length: usize },

    #[error("You have reached the daily limit of {limit} posts.")]
    QuotaExceeded { limit: u32 },

    #[error("Cannot repost a repost.")]
    RepostOfRepost,

    #[error("Cannot repost your own post.")]
    SelfRepost,

    #[error("You have already reposted this post.")]
    DuplicateRepost,

    #[error("Post store unavailable: {0}")]
    Store(#[source] sqlx::Error),

    #[error("Post store is inconsistent: {0}")]
    Inconsistent(String),
}

impl PostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostError::UserNotFound | PostError::PostNotFound => ErrorKind::NotFound,
            PostError::InvalidContent { .. } => ErrorKind::Validation,
            PostError::QuotaExceeded { .. }
            | PostError::RepostOfRepost
            | PostError::SelfRepost
            | PostError::DuplicateRepost => ErrorKind::Conflict,
            PostError::Store(_) | PostError::Inconsistent(_) => ErrorKind::Unavailable,
        }
    }

    /// Stable label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            PostError::UserNotFound => "user_not_found",
            PostError::PostNotFound => "post_not_found",
            PostError::InvalidContent { .. } => "invalid_content",
            PostError::QuotaExceeded { .. } => "quota_exceeded",
            PostError::RepostOfRepost => "repost_of_repost",
            PostError::SelfRepost => "self_repost",
            PostError::DuplicateRepost => "duplicate_repost",
            PostError::Store(_) => "store_unavailable",
            PostError::Inconsistent(_) => "store_inconsistent",
        }
    }
}

impl From<StoreError> for PostError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateRepost => PostError::DuplicateRepost,
            StoreError::Unavailable(e) => PostError::Store(e),
            StoreError::Integrity(msg) => PostError::Inconsistent(msg),
        }
    }
}

/// JSON body returned for every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

/// HTTP-facing error
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Post(#[from] PostError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Post(err.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Post(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Store and internal failures are logged in full but not echoed back.
        let error = match self {
            AppError::Post(PostError::Store(e)) => {
                tracing::error!(error = %e, "post store failure");
                "Post store is temporarily unavailable.".to_string()
            }
            AppError::Post(PostError::Inconsistent(msg)) => {
                tracing::error!(error = %msg, "post store integrity violation");
                "Post store is temporarily unavailable.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorBody {
            error,
            status: status.as_u16(),
        })
    }
}
