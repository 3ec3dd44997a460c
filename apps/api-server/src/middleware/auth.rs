//! Identity extractors - the token verifier and the role gate.
//!
//! `Identity` decodes the bearer token and then loads the user fresh
//! from the repository, so role changes and deactivations take effect
//! on the very next request instead of living on in old tokens.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use std::ops::Deref;

use quill_core::domain::User;
use quill_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub User);

impl Deref for Identity {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = header_value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

async fn authenticate(req: HttpRequest) -> Result<Identity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState not found in app data");
            AppError::Internal("Server configuration error".to_string())
        })?
        .clone();

    let token = bearer_token(&req)?;
    let claims = state.tokens.verify(&token)?;

    // Load afresh so a stale token cannot outlive a role change or a
    // deactivation.
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.is_active {
        return Err(AuthError::AccountDeactivated.into());
    }

    Ok(Identity(user))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(authenticate(req))
    }
}

/// Role gate: like `Identity`, but rejects non-admins with 403.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub User);

impl Deref for AdminIdentity {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AdminIdentity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let identity = authenticate(req).await?;

            if !identity.is_admin() {
                return Err(AppError::Forbidden(
                    "Access denied. Admin privileges required.".to_string(),
                ));
            }

            Ok(AdminIdentity(identity.0))
        })
    }
}
