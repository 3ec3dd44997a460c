//! Admin handlers - bearer + admin role required on every route.
//!
//! The role gate lives in the `AdminIdentity` extractor, so a handler
//! in this module never runs for a non-admin caller.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Role;
use quill_core::ports::{PageRequest, PostFilter};
use quill_shared::MessageBody;
use quill_shared::dto::{
    AdminPostResponse, CreatePostRequest, DashboardStats, PageQuery, PostListResponse,
    PostResponse, PostStats, UpdatePostRequest, UpdateRoleRequest, UpdateStatusRequest,
    UserListResponse, UserResponse, UserStats, UserUpdatedResponse,
};

use crate::handlers::posts::{apply_update, build_post, with_authors};
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ADMIN_DEFAULT_LIMIT: u64 = 20;

fn admin_page(query: &PageQuery) -> PageRequest {
    PageRequest::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(ADMIN_DEFAULT_LIMIT),
    )
}

/// GET /api/admin/stats/dashboard
pub async fn dashboard_stats(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    // Each counter is its own query; deriving one from another by
    // subtraction can underflow when writes land between the counts.
    let total_users = state.users.count().await?;
    let total_posts = state.posts.count(PostFilter::default()).await?;
    let published_posts = state.posts.count(PostFilter::published()).await?;
    let draft_posts = state.posts.count(PostFilter::drafts()).await?;

    Ok(HttpResponse::Ok().json(DashboardStats {
        total_users,
        total_posts,
        published_posts,
        draft_posts,
    }))
}

/// GET /api/admin/stats/users
pub async fn user_stats(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let total = state.users.count().await?;
    let admins = state.users.count_by_role(Role::Admin).await?;
    let users = state.users.count_by_role(Role::User).await?;

    Ok(HttpResponse::Ok().json(UserStats {
        total,
        admins,
        users,
    }))
}

/// GET /api/admin/stats/posts
pub async fn post_stats(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
) -> AppResult<HttpResponse> {
    let total = state.posts.count(PostFilter::default()).await?;
    let published = state.posts.count(PostFilter::published()).await?;
    let drafts = state.posts.count(PostFilter::drafts()).await?;

    Ok(HttpResponse::Ok().json(PostStats {
        total,
        published,
        drafts,
    }))
}

/// GET /api/admin/users - paginated, newest first.
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.users.list(admin_page(&query)).await?;

    Ok(HttpResponse::Ok().json(UserListResponse::from(&page)))
}

/// PUT /api/admin/users/{id}/role
pub async fn update_user_role(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRoleRequest>,
) -> AppResult<HttpResponse> {
    let mut user = state
        .users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user.role = body.role;
    user.updated_at = chrono::Utc::now();
    let user = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(UserUpdatedResponse {
        message: "User role updated successfully".to_string(),
        user: UserResponse::from(&user),
    }))
}

/// DELETE /api/admin/users/{id}
///
/// Self-deletion is refused; otherwise the user's posts and the user
/// are removed as one atomic unit.
pub async fn delete_user(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if id == admin.id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if state.users.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    state.users.delete_with_posts(id).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new(
        "User and associated posts deleted successfully",
    )))
}

/// GET /api/admin/posts - all statuses, paginated.
pub async fn list_posts(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list(PostFilter::default(), admin_page(&query))
        .await?;

    let posts = with_authors(&state, &page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse::new(posts, &page)))
}

/// POST /api/admin/posts - authored by the admin itself.
pub async fn create_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .insert(build_post(admin.id, body.into_inner())?)
        .await?;

    Ok(HttpResponse::Created().json(AdminPostResponse {
        message: "Post created successfully".to_string(),
        post: PostResponse::new(&post, Some(&admin.0)),
    }))
}

/// PUT /api/admin/posts/{id} - admins may edit any post.
pub async fn update_post(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    apply_update(&mut post, body.into_inner())?;
    let post = state.posts.update(post).await?;

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(AdminPostResponse {
        message: "Post updated successfully".to_string(),
        post: PostResponse::new(&post, author.as_ref()),
    }))
}

/// PUT /api/admin/posts/{id}/status - explicit draft/published flip.
pub async fn update_post_status(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    post.status = body.status;
    post.updated_at = chrono::Utc::now();
    let post = state.posts.update(post).await?;

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(AdminPostResponse {
        message: "Post status updated successfully".to_string(),
        post: PostResponse::new(&post, author.as_ref()),
    }))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    _admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if state.posts.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Post deleted successfully")))
}
