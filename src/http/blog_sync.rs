//! Blog cache endpoints.
//!
//! `POST` and `DELETE` on `/api/blog/sync` require
//! `Authorization: Bearer <REVALIDATE_SECRET>` when a secret is configured;
//! without one they are open.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::blog::{CacheStatus, Post};
use crate::http::request::request_id;
use crate::http::response::unauthorized;
use crate::http::server::AppState;
use crate::security::secure_link_rel;

/// Fixed text reported when an upstream refresh fails.
pub const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh blog posts from upstream";

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: CacheStatus,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRefreshResponse {
    pub success: bool,
    pub posts_found: usize,
    pub new_posts: usize,
    pub last_sync: DateTime<Utc>,
    pub revalidated: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SyncClearResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<PostView>,
    pub degraded: bool,
}

/// `GET /api/blog/sync`
pub async fn sync_status(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    Json(SyncStatusResponse {
        success: true,
        status: state.blog.status().await,
        message: "Cache status retrieved",
    })
}

/// `POST /api/blog/sync`
pub async fn sync_refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let config = state.config();
    let secret = configured_secret(config.security.revalidate_secret.as_deref());
    if !is_authorized(&headers, secret) {
        tracing::warn!(request_id = %request_id(&headers), "Rejected blog sync: bad credentials");
        return unauthorized();
    }

    let outcome = state.blog.refresh().await;
    let revalidated = if outcome.success {
        state.revalidator.revalidate(secret).await
    } else {
        false
    };

    tracing::info!(
        request_id = %request_id(&headers),
        success = outcome.success,
        posts_found = outcome.posts_found,
        new_posts = outcome.new_posts,
        revalidated,
        "Manual blog sync finished"
    );

    Json(SyncRefreshResponse {
        success: outcome.success,
        posts_found: outcome.posts_found,
        new_posts: outcome.new_posts,
        last_sync: outcome.last_sync,
        revalidated,
        timestamp: Utc::now(),
        error: outcome.error.map(|_| REFRESH_FAILED_MESSAGE),
    })
    .into_response()
}

/// `DELETE /api/blog/sync`
pub async fn sync_clear(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let config = state.config();
    let secret = configured_secret(config.security.revalidate_secret.as_deref());
    if !is_authorized(&headers, secret) {
        tracing::warn!(request_id = %request_id(&headers), "Rejected blog cache clear: bad credentials");
        return unauthorized();
    }

    state.blog.clear().await;
    Json(SyncClearResponse {
        success: true,
        message: "Blog cache cleared",
        timestamp: Utc::now(),
    })
    .into_response()
}

/// `GET /api/blog/posts`
pub async fn list_posts(State(state): State<AppState>) -> Json<PostListResponse> {
    let config = state.config();
    let cached = state.blog.get_posts().await;

    let posts = cached
        .posts
        .into_iter()
        .map(|post| {
            let rel = secure_link_rel(&post.link, &config.security.site_url);
            PostView {
                post,
                external: rel.is_some(),
                rel,
            }
        })
        .collect();

    Json(PostListResponse {
        success: true,
        posts,
        degraded: cached.degraded,
    })
}

fn configured_secret(secret: Option<&str>) -> Option<&str> {
    secret.filter(|s| !s.is_empty())
}

fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();

    bool::from(provided.as_bytes().ct_eq(secret.as_bytes()))
}
