//! Profile handlers: read/update own profile, change password.

use actix_web::{HttpResponse, web};

use quill_shared::MessageBody;
use quill_shared::dto::{
    ChangePasswordRequest, UpdateProfileRequest, UserEnvelope, UserResponse, UserUpdatedResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/profile
pub async fn get_profile(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserEnvelope {
        user: UserResponse::from(&identity.0),
    }))
}

/// PUT /api/users/profile - partial update; absent fields keep their
/// prior value. Uniqueness of name and email is re-checked.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = identity.0;

    if let Some(email) = req.email {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if email != user.email {
            if state.users.find_by_email(&email).await?.is_some() {
                return Err(AppError::BadRequest("Email is already taken".to_string()));
            }
            user.email = email;
        }
    }

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
        if name != user.name {
            if state.users.find_by_name(&name).await?.is_some() {
                return Err(AppError::BadRequest("Name is already taken".to_string()));
            }
            user.name = name;
        }
    }

    user.updated_at = chrono::Utc::now();
    let user = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(UserUpdatedResponse {
        message: "Profile updated successfully".to_string(),
        user: UserResponse::from(&user),
    }))
}

/// PUT /api/users/change-password
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = identity.0;

    if !state
        .passwords
        .verify(&req.current_password, &user.password_hash)?
    {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    if req.new_password.chars().count() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    user.password_hash = state.passwords.hash(&req.new_password)?;
    user.updated_at = chrono::Utc::now();
    state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Password changed successfully")))
}
