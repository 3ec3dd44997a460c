//! In-memory repository implementations - used when `DATABASE_URL` is
//! unset and as the backing store for handler tests.
//!
//! Both repositories share one `MemoryStore` so the cascade delete can
//! touch users and posts under a single write lock. Data is lost on
//! process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{Page, PageRequest, PostFilter, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
}

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn matches_filter(post: &Post, filter: &PostFilter) -> bool {
    if let Some(status) = filter.status
        && post.status != status
    {
        return false;
    }
    if let Some(author_id) = filter.author_id
        && post.author_id != author_id
    {
        return false;
    }
    true
}

/// Newest first; id breaks creation-time ties so ordering is stable.
fn sort_newest_first<T, F: Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid)>(
    items: &mut [T],
    key: F,
) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let slice = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(slice, page, total)
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().find(|u| u.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;

        // Same uniqueness guarantees the Postgres indexes provide.
        if tables
            .users
            .values()
            .any(|u| u.email == user.email || u.name == user.name)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && (u.email == user.email || u.name == user.name))
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        sort_newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(paginate(users, page))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.len() as u64)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.values().filter(|u| u.role == role).count() as u64)
    }

    async fn delete_with_posts(&self, id: Uuid) -> Result<(), RepoError> {
        // One write lock across both steps keeps the cascade atomic.
        let mut tables = self.store.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.posts.retain(|_, post| post.author_id != id);

        Ok(())
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;

        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }

        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;

        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| matches_filter(p, &filter))
            .cloned()
            .collect();
        sort_newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(paginate(posts, page))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| matches_filter(p, &filter))
            .count() as u64)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;

        match tables.posts.get_mut(&id) {
            Some(post) => {
                post.views += 1;
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::PostStatus;

    fn make_user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
            Role::User,
        )
    }

    fn make_post(author: &User, n: usize) -> Post {
        Post::new(
            author.id,
            format!("Post {n}"),
            "content long enough".to_string(),
            PostStatus::Published,
            vec![],
        )
    }

    #[tokio::test]
    async fn pagination_over_25_posts() {
        let store = MemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let author = users.insert(make_user("author")).await.unwrap();
        for n in 0..25 {
            posts.insert(make_post(&author, n)).await.unwrap();
        }

        let page = posts
            .list(PostFilter::default(), PageRequest::new(2, 10))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryStore::new();
        let users = InMemoryUserRepository::new(store);

        users.insert(make_user("ada")).await.unwrap();

        let mut dup = make_user("grace");
        dup.email = "ada@example.com".to_string();
        assert!(matches!(
            users.insert(dup).await.unwrap_err(),
            RepoError::Constraint(_)
        ));
    }

    #[tokio::test]
    async fn increment_views_is_per_call() {
        let store = MemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let author = users.insert(make_user("author")).await.unwrap();
        let post = posts.insert(make_post(&author, 0)).await.unwrap();

        posts.increment_views(post.id).await.unwrap();
        posts.increment_views(post.id).await.unwrap();

        let found = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found.views, 2);
    }

    #[tokio::test]
    async fn cascade_delete_removes_user_and_posts() {
        let store = MemoryStore::new();
        let users = InMemoryUserRepository::new(store.clone());
        let posts = InMemoryPostRepository::new(store);

        let author = users.insert(make_user("author")).await.unwrap();
        let other = users.insert(make_user("other")).await.unwrap();
        let doomed = posts.insert(make_post(&author, 0)).await.unwrap();
        let kept = posts.insert(make_post(&other, 1)).await.unwrap();

        users.delete_with_posts(author.id).await.unwrap();

        assert!(users.find_by_id(author.id).await.unwrap().is_none());
        assert!(posts.find_by_id(doomed.id).await.unwrap().is_none());
        assert!(posts.find_by_id(kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let users = InMemoryUserRepository::new(store);

        assert!(matches!(
            users.delete_with_posts(Uuid::new_v4()).await.unwrap_err(),
            RepoError::NotFound
        ));
    }
}
