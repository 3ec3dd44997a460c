//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Post, Role, User};
use quill_core::error::RepoError;
use quill_core::ports::{Page, PageRequest, PostFilter, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository. The pool handle is shared, not cloned:
/// `DatabaseConnection` is not `Clone` under every feature set.
pub struct PostgresUserRepository {
    db: Arc<DbConn>,
}

impl PostgresUserRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    fn filtered(filter: PostFilter) -> Select<PostEntity> {
        let mut query = PostEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(post::Column::Status.eq(status.as_str()));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        query
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.find('@') {
            Some(at_pos) => {
                let (local, domain) = email.split_at(at_pos);
                if local.len() > 1 {
                    format!("{}***{}", &local[..1], domain)
                } else {
                    format!("***{domain}")
                }
            }
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(entity)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(entity)
            .update(self.db.as_ref())
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepoError::NotFound,
                other => map_db_err(other),
            })?;

        Ok(model.into())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RepoError> {
        let query = UserEntity::find().order_by_desc(user::Column::CreatedAt);

        let total = query.clone().count(self.db.as_ref()).await.map_err(map_db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(self.db.as_ref()).await.map_err(map_db_err)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepoError> {
        UserEntity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn delete_with_posts(&self, id: Uuid) -> Result<(), RepoError> {
        // Posts first, then the user, all-or-nothing. A failure at any
        // point rolls back both steps so no orphaned posts can exist.
        let result = self
            .db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    PostEntity::delete_many()
                        .filter(post::Column::AuthorId.eq(id))
                        .exec(txn)
                        .await?;

                    let deleted = UserEntity::delete_by_id(id).exec(txn).await?;
                    if deleted.rows_affected == 0 {
                        return Err(DbErr::RecordNotFound("user".to_string()));
                    }

                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Connection(e)) => Err(map_db_err(e)),
            Err(TransactionError::Transaction(DbErr::RecordNotFound(_))) => {
                Err(RepoError::NotFound)
            }
            Err(TransactionError::Transaction(e)) => Err(map_db_err(e)),
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .update(self.db.as_ref())
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepoError::NotFound,
                other => map_db_err(other),
            })?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, filter: PostFilter, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let query = Self::filtered(filter).order_by_desc(post::Column::CreatedAt);

        let total = query.clone().count(self.db.as_ref()).await.map_err(map_db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        // Single atomic UPDATE; the database serializes concurrent
        // increments on the row.
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::Views,
                Expr::col(post::Column::Views).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
