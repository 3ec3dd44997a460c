//! Data Transfer Objects - request/response types for the API.
//!
//! Wire keys are camelCase, matching the public contract
//! (`currentPage`, `totalPages`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus, Role, User};
use quill_core::ports::Page;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public projection of a user. The password hash is never part of any
/// response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Response to a successful register/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// `{ "user": ... }` envelope for profile reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// `{ "message": ..., "user": ... }` envelope for user mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Author projection attached to post responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for AuthorResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// A post with its author projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub views: i64,
    pub tags: Vec<String>,
    /// None when the author row is gone (dangling reference).
    pub author: Option<AuthorResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: &Post, author: Option<&User>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            status: post.status,
            views: post.views,
            tags: post.tags.clone(),
            author: author.map(AuthorResponse::from),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Mutation response for the public post routes: the confirmation
/// message with the post fields flattened alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMutationResponse {
    pub message: String,
    #[serde(flatten)]
    pub post: PostResponse,
}

/// Mutation response for the admin post routes: message plus a nested
/// post document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminPostResponse {
    pub message: String,
    pub post: PostResponse,
}

/// Paginated post listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_more: bool,
}

impl PostListResponse {
    pub fn new(posts: Vec<PostResponse>, page: &Page<Post>) -> Self {
        Self {
            posts,
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_posts: page.total,
            has_more: page.current_page < page.total_pages,
        }
    }
}

/// Paginated user listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

impl From<&Page<User>> for UserListResponse {
    fn from(page: &Page<User>) -> Self {
        Self {
            users: page.items.iter().map(UserResponse::from).collect(),
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_users: page.total,
        }
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Partial update: absent fields preserve their prior value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Admin request to flip a post's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PostStatus,
}

/// Admin request to change a user's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
}

/// User counters by role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total: u64,
    pub admins: u64,
    pub users: u64,
}

/// Post counters by status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostStats {
    pub total: u64,
    pub published: u64,
    pub drafts: u64,
}
