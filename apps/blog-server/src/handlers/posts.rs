//! Post endpoints: listing, detail, comments, sharing and search.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::forms::{CommentForm, EmailPostForm, SearchForm};
use quill_shared::dto::{
    CommentCreatedResponse, PostDetailResponse, PostListResponse, SearchResponse, ShareResponse,
};

use super::present;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Kept as text so a malformed number falls back to page 1.
    pub page: Option<String>,
    pub tag: Option<String>,
}

/// Scheme and host the request came in on, e.g. `https://blog.example.com`.
pub(crate) fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// List published posts, newest first.
///
/// GET /api/blog/posts?page=&tag=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let listing = state
        .blog
        .list_posts(query.tag.as_deref(), query.page.as_deref())
        .await?;

    let response = PostListResponse {
        posts: present::post_summaries(&listing.posts.items),
        page: present::page_meta(&listing.posts),
        tag: listing.tag.as_ref().map(present::tag),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Single published post with its active comments and similar posts.
///
/// GET /api/blog/posts/{year}/{month}/{day}/{slug}
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let detail = state.blog.post_detail(year, month, day, &slug).await?;

    let response = PostDetailResponse {
        post: present::post(&detail.post),
        comments: detail.comments.iter().map(present::comment).collect(),
        similar_posts: present::post_summaries(&detail.similar_posts),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Submit a comment on a published post.
///
/// POST /api/blog/posts/{post_id}/comments
pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post, comment) = state
        .blog
        .add_comment(path.into_inner(), form.into_inner())
        .await?;

    let response = CommentCreatedResponse {
        post: present::post_summary(&post),
        comment: present::comment(&comment),
    };

    Ok(HttpResponse::Created().json(response))
}

/// Recommend a published post by e-mail.
///
/// POST /api/blog/posts/{post_id}/share
pub async fn share_post(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<EmailPostForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .share_post(path.into_inner(), form.into_inner(), &base_url(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ShareResponse {
        post: present::post_summary(&outcome.post),
        sent: outcome.sent,
    }))
}

/// Full-text search over published posts.
///
/// GET /api/blog/search?query=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchForm>,
) -> AppResult<HttpResponse> {
    let form = query.into_inner();
    let results = state.blog.search(&form).await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: form.query().map(str::to_string),
        results: present::post_summaries(&results),
    }))
}
