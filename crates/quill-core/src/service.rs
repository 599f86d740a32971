//! Blog service - listing, detail, discovery and reader actions.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Author, Comment, Post, Tag};
use crate::error::DomainError;
use crate::forms::{CommentForm, EmailPostForm, SearchForm};
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
use crate::ports::{
    AuthorRepository, CommentRepository, Mailer, OutgoingMail, PostFilter, PostRepository,
    TagRepository,
};

/// Tunables for the blog service.
#[derive(Debug, Clone)]
pub struct BlogConfig {
    pub posts_per_page: u64,
    pub similar_posts_limit: u64,
    /// Sender address used for share notifications.
    pub mail_from: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_PAGE_SIZE,
            similar_posts_limit: 4,
            mail_from: "noreply@quill.local".to_string(),
        }
    }
}

/// A page of posts, optionally narrowed to one tag.
#[derive(Debug, Clone)]
pub struct PostListing {
    pub posts: Page<Post>,
    pub tag: Option<Tag>,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub similar_posts: Vec<Post>,
}

#[derive(Debug, Clone)]
pub struct ShareOutcome {
    pub post: Post,
    pub sent: bool,
}

/// One `<url>` of the sitemap.
#[derive(Debug, Clone, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// The storage ports the service reads and writes through.
#[derive(Clone)]
pub struct Repositories {
    pub authors: Arc<dyn AuthorRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Application service over the repositories and the mailer.
pub struct BlogService {
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    mailer: Arc<dyn Mailer>,
    config: BlogConfig,
}

impl BlogService {
    pub fn new(repos: Repositories, mailer: Arc<dyn Mailer>, config: BlogConfig) -> Self {
        Self {
            authors: repos.authors,
            posts: repos.posts,
            tags: repos.tags,
            comments: repos.comments,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    fn page_request(&self, page: Option<&str>) -> PageRequest {
        PageRequest::parse(page, self.config.posts_per_page)
    }

    /// Published posts, newest first. Bad or out-of-range page numbers are
    /// clamped rather than rejected.
    pub async fn list_published(&self, page: Option<&str>) -> Result<Page<Post>, DomainError> {
        let request = self.page_request(page);
        Ok(self
            .posts
            .list_published(&PostFilter::default(), request)
            .await?)
    }

    /// Published posts carrying the tag identified by `tag_slug`.
    pub async fn filter_by_tag(
        &self,
        tag_slug: &str,
        page: Option<&str>,
    ) -> Result<PostListing, DomainError> {
        let tag = self.tag_by_slug(tag_slug).await?;
        let posts = self
            .posts
            .list_published(&PostFilter::tagged(&tag), self.page_request(page))
            .await?;

        Ok(PostListing {
            posts,
            tag: Some(tag),
        })
    }

    pub async fn list_posts(
        &self,
        tag_slug: Option<&str>,
        page: Option<&str>,
    ) -> Result<PostListing, DomainError> {
        match tag_slug {
            Some(slug) => self.filter_by_tag(slug, page).await,
            None => Ok(PostListing {
                posts: self.list_published(page).await?,
                tag: None,
            }),
        }
    }

    pub async fn tag_by_slug(&self, slug: &str) -> Result<Tag, DomainError> {
        self.tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Tag", slug))
    }

    pub async fn get_published(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_published_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn get_published_by_date_slug(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<Post, DomainError> {
        let key = format!("{}/{}/{}/{}", year, month, day, slug);
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DomainError::not_found("Post", &key))?;

        self.posts
            .find_published_by_date_slug(date, slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", key))
    }

    pub async fn get_active_comments(&self, post: &Post) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.find_active_by_post(post.id).await?)
    }

    /// Up to `similar_posts_limit` published posts ranked by shared tags.
    pub async fn similar_posts(&self, post: &Post) -> Result<Vec<Post>, DomainError> {
        if post.tags.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .posts
            .find_similar(post, self.config.similar_posts_limit)
            .await?)
    }

    pub async fn post_detail(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<PostDetail, DomainError> {
        let post = self.get_published_by_date_slug(year, month, day, slug).await?;
        let comments = self.get_active_comments(&post).await?;
        let similar_posts = self.similar_posts(&post).await?;

        tracing::debug!(
            post_id = %post.id,
            comments = comments.len(),
            similar = similar_posts.len(),
            "Loaded post detail"
        );

        Ok(PostDetail {
            post,
            comments,
            similar_posts,
        })
    }

    /// Validate and persist a comment. Nothing is written when the form is
    /// invalid.
    pub async fn create_comment(
        &self,
        post: &Post,
        form: CommentForm,
    ) -> Result<Comment, DomainError> {
        if !post.is_published() {
            return Err(DomainError::not_found("Post", post.id));
        }
        let form = form.clean().map_err(DomainError::Validation)?;
        let comment = Comment::new(post.id, form.name, form.email, form.body);
        let saved = self.comments.insert(comment).await?;

        tracing::info!(post_id = %post.id, comment_id = %saved.id, "Comment created");
        Ok(saved)
    }

    /// Comment on the published post `post_id`.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        form: CommentForm,
    ) -> Result<(Post, Comment), DomainError> {
        let post = self.get_published(post_id).await?;
        let comment = self.create_comment(&post, form).await?;
        Ok((post, comment))
    }

    /// Published posts matching the query; blank or absent queries match
    /// nothing.
    pub async fn search(&self, form: &SearchForm) -> Result<Vec<Post>, DomainError> {
        let Some(query) = form.query() else {
            return Ok(Vec::new());
        };
        let results = self.posts.search_published(query).await?;
        tracing::debug!(query, results = results.len(), "Search executed");
        Ok(results)
    }

    /// Recommend a post by e-mail. `base_url` is the scheme and host the
    /// post URL is built on. Delivery is fire-and-forget: a transport
    /// failure is logged and the outcome still reports `sent`.
    pub async fn share_post(
        &self,
        post_id: Uuid,
        form: EmailPostForm,
        base_url: &str,
    ) -> Result<ShareOutcome, DomainError> {
        let post = self.get_published(post_id).await?;
        let form = form.clean().map_err(DomainError::Validation)?;

        let post_url = format!("{}{}", base_url.trim_end_matches('/'), post.absolute_url());
        let mail = compose_share_mail(&post, &form, &post_url, &self.config.mail_from);

        if let Err(e) = self.mailer.send(mail).await {
            tracing::error!(post_id = %post.id, error = %e, "Failed to send share mail");
        }

        Ok(ShareOutcome { post, sent: true })
    }

    pub async fn get_or_create_author(&self, username: &str) -> Result<Author, DomainError> {
        if let Some(existing) = self.authors.find_by_username(username).await? {
            return Ok(existing);
        }
        Ok(self.authors.insert(Author::new(username.to_string())).await?)
    }

    /// Create a draft post, attaching tags by name (created when unknown).
    pub async fn create_post(
        &self,
        author: &Author,
        title: String,
        body: String,
        tag_names: &[String],
    ) -> Result<Post, DomainError> {
        let mut tags = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let tag = self.get_or_create_tag(name).await?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let post = Post::new(author.id, title, body).with_tags(tags);
        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Draft created");
        Ok(saved)
    }

    /// `Draft -> Published`. Publishing a published post changes nothing.
    pub async fn publish_post(&self, id: Uuid) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;

        if !post.publish() {
            return Ok(post);
        }
        let saved = self.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, "Post published");
        Ok(saved)
    }

    pub async fn get_or_create_tag(&self, name: &str) -> Result<Tag, DomainError> {
        let tag = Tag::new(name.trim());
        if let Some(existing) = self.tags.find_by_slug(&tag.slug).await? {
            return Ok(existing);
        }
        Ok(self.tags.insert(tag).await?)
    }

    pub async fn sitemap(&self, base_url: &str) -> Result<Vec<SitemapEntry>, DomainError> {
        let base = base_url.trim_end_matches('/');
        let posts = self.posts.all_published().await?;

        Ok(posts
            .into_iter()
            .map(|post| SitemapEntry {
                loc: format!("{}{}", base, post.absolute_url()),
                lastmod: post.updated_at,
                changefreq: "weekly",
                priority: 0.9,
            })
            .collect())
    }
}

/// Build the share notification for `post`.
pub fn compose_share_mail(
    post: &Post,
    form: &EmailPostForm,
    post_url: &str,
    from: &str,
) -> OutgoingMail {
    let subject = format!("{} recommends you read {}", form.name, post.title);
    let body = format!(
        "Read {} at {}\n\n{}'s comments: {}",
        post.title,
        post_url,
        form.name,
        form.comments.as_deref().unwrap_or("")
    );

    OutgoingMail {
        subject,
        body,
        from: from.to_string(),
        to: vec![form.to.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_share_mail() {
        let post = Post::new(Uuid::new_v4(), "Hello World".into(), "Body".into());
        let form = EmailPostForm {
            name: "Bob".into(),
            email: "bob@example.com".into(),
            to: "carol@example.com".into(),
            comments: Some("Worth a look".into()),
        };

        let mail = compose_share_mail(&post, &form, "http://blog.test/p/", "noreply@quill.local");

        assert_eq!(mail.subject, "Bob recommends you read Hello World");
        assert_eq!(
            mail.body,
            "Read Hello World at http://blog.test/p/\n\nBob's comments: Worth a look"
        );
        assert_eq!(mail.from, "noreply@quill.local");
        assert_eq!(mail.to, vec!["carol@example.com".to_string()]);
    }

    #[test]
    fn test_default_config() {
        let config = BlogConfig::default();
        assert_eq!(config.posts_per_page, 4);
        assert_eq!(config.similar_posts_limit, 4);
    }
}
