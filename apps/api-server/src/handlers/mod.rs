//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod users;

use actix_web::{HttpRequest, HttpResponse, web};
use quill_shared::ErrorBody;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes (my-posts before {id} so it is not swallowed)
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/my-posts", web::get().to(posts::my_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            // Profile routes
            .service(
                web::scope("/users")
                    .route("/profile", web::get().to(users::get_profile))
                    .route("/profile", web::put().to(users::update_profile))
                    .route("/change-password", web::put().to(users::change_password)),
            )
            // Admin routes (role-gated via AdminIdentity)
            .service(
                web::scope("/admin")
                    .route("/stats/dashboard", web::get().to(admin::dashboard_stats))
                    .route("/stats/users", web::get().to(admin::user_stats))
                    .route("/stats/posts", web::get().to(admin::post_stats))
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}/role", web::put().to(admin::update_user_role))
                    .route("/users/{id}", web::delete().to(admin::delete_user))
                    .route("/posts", web::get().to(admin::list_posts))
                    .route("/posts", web::post().to(admin::create_post))
                    .route("/posts/{id}/status", web::put().to(admin::update_post_status))
                    .route("/posts/{id}", web::put().to(admin::update_post))
                    .route("/posts/{id}", web::delete().to(admin::delete_post)),
            ),
    )
    .default_service(web::route().to(route_not_found));
}

/// Fallback for unmatched routes.
async fn route_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(format!("Route {} not found", req.path())))
}
