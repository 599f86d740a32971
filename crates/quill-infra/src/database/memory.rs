//! In-memory storage backend - used when no database is configured.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::discovery::{matches_query, rank_similar};
use quill_core::domain::{Author, Comment, Post, Tag};
use quill_core::error::RepoError;
use quill_core::pagination::{Page, PageRequest};
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostFilter, PostRepository,
    TagRepository,
};

#[derive(Default)]
struct Tables {
    authors: HashMap<Uuid, Author>,
    posts: HashMap<Uuid, Post>,
    tags: HashMap<Uuid, Tag>,
    comments: Vec<Comment>,
}

impl Tables {
    /// Published posts, newest first.
    fn published(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.publish.cmp(&a.publish).then(a.id.cmp(&b.id)));
        posts
    }
}

/// Every table behind one async RwLock. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn insert(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.authors.values().any(|a| a.username == author.username) {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                author.username
            )));
        }
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .find(|a| a.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn insert(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.tags.values().any(|t| t.slug == tag.slug) {
            return Err(RepoError::Constraint(format!("tag {} already exists", tag.slug)));
        }
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.save(post).await
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let clash = tables.posts.values().any(|p| {
            p.id != post.id && p.slug == post.slug && p.publish_date() == post.publish_date()
        });
        if clash {
            return Err(RepoError::Constraint(format!(
                "slug {} already used on {}",
                post.slug,
                post.publish_date()
            )));
        }
        tables.posts.insert(post.id, post.clone());
        tracing::debug!(post_id = %post.id, tags = post.tags.len(), "Post saved");
        Ok(post)
    }

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).filter(|p| p.is_published()).cloned())
    }

    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .published()
            .into_iter()
            .find(|p| p.slug == slug && p.publish_date() == date))
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        let matching: Vec<Post> = tables
            .published()
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        Ok(Page::from_vec(matching, page))
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.tables.read().await.published())
    }

    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(rank_similar(post, tables.published(), limit as usize))
    }

    async fn search_published(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .published()
            .into_iter()
            .filter(|p| matches_query(p, query))
            .collect())
    }
}
