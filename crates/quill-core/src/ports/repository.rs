use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostStatus, Role, User};
use crate::error::RepoError;

/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// A pagination request. Page numbers are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Build a request from raw query values, clamping page to >= 1 and
    /// limit to 1..=MAX_PAGE_LIMIT.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results plus the pagination envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            current_page: request.page,
            total_pages: total.div_ceil(request.limit),
            total,
        }
    }
}

/// Filter for post listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Self::default()
        }
    }

    pub fn drafts() -> Self {
        Self {
            status: Some(PostStatus::Draft),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }
}

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup used to attach author projections to post listings.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn update(&self, user: User) -> Result<User, RepoError>;

    /// Paginated listing, newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, RepoError>;

    /// Cascade delete: remove the user's posts, then the user, as one
    /// atomic unit. Partial failure must leave both collections intact.
    async fn delete_with_posts(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Paginated listing, newest first, optionally filtered by status
    /// and/or author.
    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError>;

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    /// Atomic `views = views + 1`. The database serializes concurrent
    /// increments at document granularity; no read-modify-write here.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;
}
