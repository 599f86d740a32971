use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Author, Comment, Post, Tag};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};

/// Generic repository trait defining the shared read/write operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// Narrowing applied on top of the published-posts query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub tag_id: Option<Uuid>,
}

impl PostFilter {
    pub fn tagged(tag: &Tag) -> Self {
        Self {
            tag_id: Some(tag.id),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.tag_id.is_none_or(|id| post.has_tag(id))
    }
}

/// Post repository. Every `*_published` method only ever yields posts with
/// status `Published`; `find_by_id` and `save` see all posts.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert or update a post and replace its tag set.
    async fn save(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Published post with `slug` whose publish timestamp falls on `date` (UTC).
    async fn find_published_by_date_slug(
        &self,
        date: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Published posts, newest first, one page at a time.
    async fn list_published(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Every published post, newest first.
    async fn all_published(&self) -> Result<Vec<Post>, RepoError>;

    /// Published posts sharing at least one tag with `post`, ranked by the
    /// number of shared tags then by publish time, both descending.
    async fn find_similar(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Published posts whose title or body match `query`.
    async fn search_published(&self, query: &str) -> Result<Vec<Post>, RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Author>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments on a post, oldest first.
    async fn find_active_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
