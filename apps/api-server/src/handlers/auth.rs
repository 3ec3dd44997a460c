//! Authentication handlers: register, login, me.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Role, User};
use quill_core::ports::AuthError;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserEnvelope, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const PASSWORD_MIN_LEN: usize = 6;

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    validate_password(&req.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(
            "User already exists with this email".to_string(),
        ));
    }
    if state.users.find_by_name(name).await?.is_some() {
        return Err(AppError::BadRequest(
            "User already exists with this name".to_string(),
        ));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state
        .users
        .insert(User::new(name.to_string(), email, password_hash, Role::User))
        .await?;

    let token = state.tokens.issue(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User created successfully".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let email = req.email.trim().to_lowercase();

    // Uniform rejection: a missing account and a wrong password produce
    // the identical response, so the endpoint cannot be used to probe
    // which emails are registered.
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        return Err(AuthError::AccountDeactivated.into());
    }

    let token = state.tokens.issue(user.id)?;

    let message = if user.is_admin() {
        "Admin login successful"
    } else {
        "Login successful"
    };

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: message.to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// GET /api/auth/me - bearer required.
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserEnvelope {
        user: UserResponse::from(&identity.0),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use quill_core::domain::Role;
    use serde_json::json;

    use crate::handlers::test_util::{authed, seed_user, test_app, test_state};

    #[actix_web::test]
    async fn register_returns_token_and_hides_password() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Ada",
                "email": "Ada@Example.com",
                "password": "secret123"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 201);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["email"], "ada@example.com");
        assert_eq!(body["user"]["role"], "user");
        assert!(body["token"].is_string());
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());

        // The stored credential is a hash, not the plaintext.
        let stored = state
            .users
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret123");
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let state = test_state();
        seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Other",
                "email": "ada@example.com",
                "password": "secret123"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 400);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "User already exists with this email");
    }

    #[actix_web::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let state = test_state();
        seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        let app = test_app!(state);

        let wrong_password = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "nope-nope"}))
            .to_request();
        let res1 = test::call_service(&app, wrong_password).await;
        assert_eq!(res1.status(), 401);
        let body1: serde_json::Value = test::read_body_json(res1).await;

        let unknown_email = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ghost@example.com", "password": "nope-nope"}))
            .to_request();
        let res2 = test::call_service(&app, unknown_email).await;
        assert_eq!(res2.status(), 401);
        let body2: serde_json::Value = test::read_body_json(res2).await;

        assert_eq!(body1["message"], body2["message"]);
        assert_eq!(body1["message"], "Invalid email or password");
    }

    #[actix_web::test]
    async fn deactivated_account_gets_distinct_message() {
        let state = test_state();
        let (mut user, _) =
            seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        user.is_active = false;
        state.users.update(user).await.unwrap();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "secret123"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 401);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Account is deactivated");
    }

    #[actix_web::test]
    async fn admin_login_message() {
        let state = test_state();
        seed_user(&state, "Root", "root@example.com", "secret123", Role::Admin).await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "root@example.com", "password": "secret123"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Admin login successful");
        assert_eq!(body["user"]["role"], "admin");
    }

    #[actix_web::test]
    async fn me_requires_token_and_reflects_fresh_state() {
        let state = test_state();
        let (user, token) =
            seed_user(&state, "Ada", "ada@example.com", "secret123", Role::User).await;
        let app = test_app!(state);

        let no_token = test::TestRequest::get().uri("/api/auth/me").to_request();
        let res = test::call_service(&app, no_token).await;
        assert_eq!(res.status(), 401);

        let req = authed!(test::TestRequest::get().uri("/api/auth/me"), token).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["user"]["id"], user.id.to_string());

        // Deactivate; the same token must stop working immediately.
        let mut deactivated = user.clone();
        deactivated.is_active = false;
        state.users.update(deactivated).await.unwrap();

        let req = authed!(test::TestRequest::get().uri("/api/auth/me"), token).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);
    }
}
