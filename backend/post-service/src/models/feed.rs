use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::PostLimits;
use crate::models::post::{AuthoredPost, Post};

/// A post as it appears in the feed, resolved once at the store boundary.
///
/// Reposts carry their original so that display fields never have to be
/// looked up through an optional reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Original {
        post: AuthoredPost,
        repost_count: i64,
    },
    Repost {
        repost: AuthoredPost,
        original: AuthoredPost,
        repost_count: i64,
    },
}

impl FeedItem {
    /// The stored post this item wraps (the repost itself for reposts).
    pub fn post(&self) -> &Post {
        match self {
            FeedItem::Original { post, .. } => &post.post,
            FeedItem::Repost { repost, .. } => &repost.post,
        }
    }

    pub fn id(&self) -> Uuid {
        self.post().id
    }

    pub fn repost_count(&self) -> i64 {
        match self {
            FeedItem::Original { repost_count, .. } | FeedItem::Repost { repost_count, .. } => {
                *repost_count
            }
        }
    }

    pub fn is_repost(&self) -> bool {
        matches!(self, FeedItem::Repost { .. })
    }
}

/// Feed ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest first
    #[default]
    Latest,
    /// Most reposted first, newest first among equals
    Trending,
}

impl SortMode {
    /// Parse a client-supplied sort value; anything unrecognized is `Latest`.
    pub fn parse_or_latest(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("trending") => SortMode::Trending,
            _ => SortMode::Latest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Latest => "latest",
            SortMode::Trending => "trending",
        }
    }
}

/// Raw list parameters as received from a client
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsRequest {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size (default 15, max 100)
    pub limit: Option<i64>,
    /// `latest` or `trending`; other values fall back to `latest`
    pub sort: Option<String>,
    /// Exact content to match against non-repost posts
    pub search: Option<String>,
}

/// Normalized list query handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: SortMode,
    pub search: Option<String>,
}

impl FeedQuery {
    /// Apply the paging policy: page >= 1, limit within `1..=max_page_size`
    /// (default when absent or non-positive), search trimmed and capped.
    pub fn normalize(request: &ListPostsRequest, limits: &PostLimits) -> Self {
        let page = request
            .page
            .unwrap_or(1)
            .clamp(1, i64::from(u32::MAX)) as u32;

        let limit = match request.limit {
            Some(limit) if limit >= 1 => limit.min(i64::from(limits.max_page_size)) as u32,
            _ => limits.default_page_size,
        };

        let search = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| term.chars().take(limits.max_search_length).collect::<String>());

        Self {
            page,
            limit,
            sort: SortMode::parse_or_latest(request.sort.as_deref()),
            search,
        }
    }

    /// Number of matching posts that precede this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// One page of feed items read from the store
#[derive(Debug, Clone, Default)]
pub struct FeedSlice {
    pub items: Vec<FeedItem>,
    /// True iff another matching item exists past this page
    pub has_more: bool,
}
