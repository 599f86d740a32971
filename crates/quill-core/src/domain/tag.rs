use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag entity - shared vocabulary attached to posts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    /// Create a tag whose slug is derived from its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slug::slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_derived_from_name() {
        let tag = Tag::new("Rust Programming");
        assert_eq!(tag.slug, "rust-programming");
        assert_eq!(tag.name, "Rust Programming");
    }
}
