//! Post handlers: public listing/read, authenticated create, and
//! ownership-gated update/delete.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus, User, validate_content, validate_title};
use quill_core::ports::{Page, PageRequest, PostFilter};
use quill_shared::MessageBody;
use quill_shared::dto::{
    CreatePostRequest, PageQuery, PostListResponse, PostMutationResponse, PostResponse,
    UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_LIMIT: u64 = 10;

pub(crate) fn page_request(query: &PageQuery, default_limit: u64) -> PageRequest {
    PageRequest::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(default_limit),
    )
}

/// Attach author projections to one page of posts with a single batch
/// lookup instead of a query per post.
pub(crate) async fn with_authors(
    state: &AppState,
    page: &Page<Post>,
) -> Result<Vec<PostResponse>, AppError> {
    let mut ids: Vec<Uuid> = page.items.iter().map(|p| p.author_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let authors: HashMap<Uuid, User> = state
        .users
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(page
        .items
        .iter()
        .map(|p| PostResponse::new(p, authors.get(&p.author_id)))
        .collect())
}

/// Partial update semantics: only fields present in the request are
/// applied; bounded fields are re-validated.
pub(crate) fn apply_update(post: &mut Post, req: UpdatePostRequest) -> Result<(), AppError> {
    if let Some(title) = req.title {
        validate_title(&title)?;
        post.title = title.trim().to_string();
    }
    if let Some(content) = req.content {
        validate_content(&content)?;
        post.content = content;
    }
    if let Some(status) = req.status {
        post.status = status;
    }
    if let Some(tags) = req.tags {
        post.tags = tags;
    }
    post.updated_at = chrono::Utc::now();
    Ok(())
}

pub(crate) fn build_post(author_id: Uuid, req: CreatePostRequest) -> Result<Post, AppError> {
    validate_title(&req.title)?;
    validate_content(&req.content)?;

    Ok(Post::new(
        author_id,
        req.title,
        req.content,
        req.status.unwrap_or(PostStatus::Published),
        req.tags.unwrap_or_default(),
    ))
}

/// GET /api/posts - public, published posts only.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list(PostFilter::published(), page_request(&query, DEFAULT_LIMIT))
        .await?;

    let posts = with_authors(&state, &page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse::new(posts, &page)))
}

/// GET /api/posts/my-posts - bearer required, scoped to the caller.
pub async fn my_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list(
            PostFilter::by_author(identity.id),
            page_request(&query, DEFAULT_LIMIT),
        )
        .await?;

    let posts = with_authors(&state, &page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse::new(posts, &page)))
}

/// GET /api/posts/{id} - public.
///
/// Reading a post bumps its view counter as an observable side effect;
/// the returned document carries the pre-increment count.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Atomic increment; a concurrent delete between the read and the
    // increment is not an error for the reader.
    match state.posts.increment_views(id).await {
        Ok(()) | Err(quill_core::error::RepoError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(PostResponse::new(&post, author.as_ref())))
}

/// POST /api/posts - bearer required. The author is always the verified
/// identity; client-supplied authorship is ignored.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .insert(build_post(identity.id, body.into_inner())?)
        .await?;

    Ok(HttpResponse::Created().json(PostMutationResponse {
        message: "Post created successfully".to_string(),
        post: PostResponse::new(&post, Some(&identity.0)),
    }))
}

/// PUT /api/posts/{id} - bearer required, ownership-gated.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.can_be_modified_by(&identity) {
        return Err(AppError::Forbidden(
            "Not authorized to update this post".to_string(),
        ));
    }

    apply_update(&mut post, body.into_inner())?;
    let post = state.posts.update(post).await?;

    let author = state.users.find_by_id(post.author_id).await?;

    Ok(HttpResponse::Ok().json(PostMutationResponse {
        message: "Post updated successfully".to_string(),
        post: PostResponse::new(&post, author.as_ref()),
    }))
}

/// DELETE /api/posts/{id} - bearer required, ownership-gated.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.can_be_modified_by(&identity) {
        return Err(AppError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Post deleted successfully")))
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use quill_core::domain::{PostStatus, Role};
    use quill_core::ports::PostFilter;
    use serde_json::json;

    use crate::handlers::test_util::{authed, seed_post, seed_user, test_app, test_state};

    #[actix_web::test]
    async fn pagination_envelope_over_25_posts() {
        let state = test_state();
        let (author, _) =
            seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        for n in 0..25 {
            seed_post(&state, &author, &format!("Post {n}"), PostStatus::Published).await;
        }
        let app = test_app!(state);

        let req = test::TestRequest::get()
            .uri("/api/posts?page=2&limit=10")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["posts"].as_array().unwrap().len(), 10);
        assert_eq!(body["currentPage"], 2);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["totalPosts"], 25);
        assert_eq!(body["hasMore"], true);
    }

    #[actix_web::test]
    async fn public_listing_excludes_drafts() {
        let state = test_state();
        let (author, _) =
            seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        seed_post(&state, &author, "Published", PostStatus::Published).await;
        seed_post(&state, &author, "Draft", PostStatus::Draft).await;
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let res = test::call_service(&app, req).await;

        let body: serde_json::Value = test::read_body_json(res).await;
        let posts = body["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "Published");
        assert_eq!(posts[0]["author"]["email"], "ada@example.com");
    }

    #[actix_web::test]
    async fn reading_a_post_increments_views_but_not_post_count() {
        let state = test_state();
        let (author, _) =
            seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        let post = seed_post(&state, &author, "Hello", PostStatus::Published).await;
        let app = test_app!(state);

        let uri = format!("/api/posts/{}", post.id);

        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["views"], 0);

        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["views"], 1);

        let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 2);
        assert_eq!(state.posts.count(PostFilter::default()).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn missing_post_is_404() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 404);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Post not found");
    }

    #[actix_web::test]
    async fn create_post_sets_author_from_identity() {
        let state = test_state();
        let (_, token) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let app = test_app!(state);

        let req = authed!(
            test::TestRequest::post().uri("/api/posts").set_json(json!({
                "title": "Hello",
                "content": "World world world"
            })),
            token
        )
        .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 201);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["author"]["email"], "a@x.com");
        assert_eq!(body["status"], "published");
        assert_eq!(body["message"], "Post created successfully");
    }

    #[actix_web::test]
    async fn create_post_requires_token_and_valid_fields() {
        let state = test_state();
        let (_, token) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let app = test_app!(state);

        let anonymous = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({"title": "Hello", "content": "World world world"}))
            .to_request();
        assert_eq!(test::call_service(&app, anonymous).await.status(), 401);

        let short_content = authed!(
            test::TestRequest::post()
                .uri("/api/posts")
                .set_json(json!({"title": "Hello", "content": "short"})),
            token
        )
        .to_request();
        assert_eq!(test::call_service(&app, short_content).await.status(), 400);

        let long_title = authed!(
            test::TestRequest::post().uri("/api/posts").set_json(json!({
                "title": "x".repeat(201),
                "content": "World world world"
            })),
            token
        )
        .to_request();
        assert_eq!(test::call_service(&app, long_title).await.status(), 400);
    }

    #[actix_web::test]
    async fn non_owner_mutation_is_forbidden_and_post_unchanged() {
        let state = test_state();
        let (author, _) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let (_, other_token) = seed_user(&state, "B", "b@x.com", "secret123", Role::User).await;
        let post = seed_post(&state, &author, "Hello", PostStatus::Published).await;
        let app = test_app!(state);

        let uri = format!("/api/posts/{}", post.id);

        let update = authed!(
            test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({"title": "Hijacked"})),
            other_token
        )
        .to_request();
        let res = test::call_service(&app, update).await;
        assert_eq!(res.status(), 403);

        let delete = authed!(test::TestRequest::delete().uri(&uri), other_token).to_request();
        let res = test::call_service(&app, delete).await;
        assert_eq!(res.status(), 403);

        let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Hello");
    }

    #[actix_web::test]
    async fn partial_update_preserves_absent_fields() {
        let state = test_state();
        let (author, token) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let post = seed_post(&state, &author, "Hello", PostStatus::Published).await;
        let app = test_app!(state);

        let req = authed!(
            test::TestRequest::put()
                .uri(&format!("/api/posts/{}", post.id))
                .set_json(json!({"status": "draft"})),
            token
        )
        .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "draft");
        assert_eq!(body["title"], "Hello");
        assert_eq!(body["content"], "content that is long enough");
    }

    #[actix_web::test]
    async fn author_can_delete_own_post() {
        let state = test_state();
        let (author, token) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let post = seed_post(&state, &author, "Hello", PostStatus::Published).await;
        let app = test_app!(state);

        let req = authed!(
            test::TestRequest::delete().uri(&format!("/api/posts/{}", post.id)),
            token
        )
        .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Post deleted successfully");
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn my_posts_is_scoped_to_caller() {
        let state = test_state();
        let (a, token_a) = seed_user(&state, "A", "a@x.com", "secret123", Role::User).await;
        let (b, _) = seed_user(&state, "B", "b@x.com", "secret123", Role::User).await;
        seed_post(&state, &a, "Mine", PostStatus::Draft).await;
        seed_post(&state, &b, "Theirs", PostStatus::Published).await;
        let app = test_app!(state);

        let req = authed!(test::TestRequest::get().uri("/api/posts/my-posts"), token_a)
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        let posts = body["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "Mine");
    }
}
