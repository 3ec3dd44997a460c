use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

use super::user::User;

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 200;
/// Minimum content length in characters.
pub const CONTENT_MIN_LEN: usize = 10;

/// Publication status. Transitions (draft -> published and back) are
/// always explicit writes by the author or an admin; there is no
/// automatic transition and no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "draft" => PostStatus::Draft,
            _ => PostStatus::Published,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - a blog article owned by exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub views: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. The author id comes from the verified request
    /// identity, never from client input.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        status: PostStatus,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: title.trim().to_string(),
            content,
            status,
            views: 0,
            tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Ownership gate: mutation is allowed for the author or any admin.
    pub fn can_be_modified_by(&self, user: &User) -> bool {
        self.author_id == user.id || user.is_admin()
    }
}

/// Title must be present and within the length bound.
pub fn validate_title(title: &str) -> Result<(), DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Title is required".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "Title cannot exceed {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Content must be present and at least `CONTENT_MIN_LEN` characters.
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.chars().count() < CONTENT_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "Content must be at least {CONTENT_MIN_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn user(role: Role) -> User {
        User::new(
            "reader".to_string(),
            "reader@example.com".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn author_and_admin_pass_ownership_gate() {
        let author = user(Role::User);
        let admin = user(Role::Admin);
        let stranger = user(Role::User);

        let post = Post::new(
            author.id,
            "Hello".to_string(),
            "World world world".to_string(),
            PostStatus::Published,
            vec![],
        );

        assert!(post.can_be_modified_by(&author));
        assert!(post.can_be_modified_by(&admin));
        assert!(!post.can_be_modified_by(&stranger));
    }

    #[test]
    fn title_validation_bounds() {
        assert!(validate_title("Hello").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(TITLE_MAX_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(TITLE_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn content_requires_minimum_length() {
        assert!(validate_content("short").is_err());
        assert!(validate_content("long enough content").is_ok());
    }
}
