//! Domain-to-DTO conversions for responses.

use quill_core::domain::{Comment, Post, Tag};
use quill_core::pagination::Page;
use quill_shared::dto::{CommentResponse, PageMeta, PostResponse, PostSummary, TagDto};

pub fn tag(tag: &Tag) -> TagDto {
    TagDto {
        name: tag.name.clone(),
        slug: tag.slug.clone(),
    }
}

pub fn post_summary(post: &Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: post.absolute_url(),
        author_id: post.author_id,
        publish: post.publish.to_rfc3339(),
        tags: post.tags.iter().map(tag).collect(),
    }
}

pub fn post_summaries(posts: &[Post]) -> Vec<PostSummary> {
    posts.iter().map(post_summary).collect()
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        summary: post_summary(post),
        body: post.body.clone(),
        status: post.status.code().to_string(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

/// E-mail addresses stay server-side.
pub fn comment(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        name: comment.name.clone(),
        body: comment.body.clone(),
        created_at: comment.created_at.to_rfc3339(),
    }
}

pub fn page_meta<T>(page: &Page<T>) -> PageMeta {
    PageMeta {
        number: page.number,
        size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    }
}
