//! Ranking and matching rules shared by the repository backends that
//! evaluate them in process.

use std::cmp::Reverse;

use crate::domain::Post;

/// Rank `candidates` by similarity to `post`.
///
/// Only published posts sharing at least one tag with `post` qualify, and
/// `post` itself never does. Ordered by shared tag count, then publish
/// time, both descending.
pub fn rank_similar<I>(post: &Post, candidates: I, limit: usize) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    if post.tags.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, Post)> = candidates
        .into_iter()
        .filter(|c| c.is_published() && c.id != post.id)
        .map(|c| (post.shared_tag_count(&c), c))
        .filter(|(shared, _)| *shared > 0)
        .collect();

    scored.sort_by_key(|(shared, c)| (Reverse(*shared), Reverse(c.publish)));
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

/// Case-insensitive match of `query` against title or body.
pub fn matches_query(post: &Post, query: &str) -> bool {
    let needle = query.to_lowercase();
    post.title.to_lowercase().contains(&needle) || post.body.to_lowercase().contains(&needle)
}
