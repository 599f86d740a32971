use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// Publication status of a post.
///
/// The only transition is `Draft -> Published`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    /// Two-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            PostStatus::Draft => "DF",
            PostStatus::Published => "PB",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DF" => Some(PostStatus::Draft),
            "PB" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: PostStatus,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Create a new draft post. The slug is derived from the title and the
    /// publish timestamp defaults to now.
    pub fn new(author_id: Uuid, title: String, body: String) -> Self {
        let now = Utc::now();
        let slug = slug::slugify(&title);
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body,
            status: PostStatus::Draft,
            publish: now,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Move the post to `Published`. Returns false if it already was.
    pub fn publish(&mut self) -> bool {
        if self.is_published() {
            return false;
        }
        self.status = PostStatus::Published;
        self.updated_at = Utc::now();
        true
    }

    /// UTC calendar day the post is published on; slugs are unique per day.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Canonical path, e.g. `/blog/2024/03/09/hello-world/`.
    pub fn absolute_url(&self) -> String {
        let date = self.publish_date();
        format!(
            "/blog/{}/{:02}/{:02}/{}/",
            date.year(),
            date.month(),
            date.day(),
            self.slug
        )
    }

    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    /// Number of tags this post shares with `other`.
    pub fn shared_tag_count(&self, other: &Post) -> usize {
        self.tags.iter().filter(|t| other.has_tag(t.id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_post_is_draft_with_slug() {
        let post = Post::new(Uuid::new_v4(), "Hello World".into(), "Body".into());
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.slug, "hello-world");
        assert!(!post.is_published());
    }

    #[test]
    fn test_publish_is_one_way() {
        let mut post = Post::new(Uuid::new_v4(), "Title".into(), "Body".into());
        assert!(post.publish());
        assert!(post.is_published());
        assert!(!post.publish());
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn test_absolute_url_pads_month_and_day() {
        let mut post = Post::new(Uuid::new_v4(), "Hello World".into(), "Body".into());
        post.publish = Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(post.absolute_url(), "/blog/2024/03/09/hello-world/");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PostStatus::from_code("PB"), Some(PostStatus::Published));
        assert_eq!(PostStatus::from_code(PostStatus::Draft.code()), Some(PostStatus::Draft));
        assert_eq!(PostStatus::from_code("XX"), None);
    }

    #[test]
    fn test_shared_tag_count() {
        let x = Tag::new("x");
        let y = Tag::new("y");
        let z = Tag::new("z");
        let a = Post::new(Uuid::new_v4(), "A".into(), "".into())
            .with_tags(vec![x.clone(), y.clone()]);
        let b = Post::new(Uuid::new_v4(), "B".into(), "".into()).with_tags(vec![x, z]);
        assert_eq!(a.shared_tag_count(&b), 1);
    }
}
