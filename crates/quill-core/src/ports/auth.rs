//! Authentication ports.

use uuid::Uuid;

/// Claims carried in a bearer token.
///
/// Only the subject id is embedded. Role and active flag are loaded
/// fresh from the repository on every verification, so privilege
/// changes take effect immediately instead of living on in old tokens.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub exp: i64,
}

/// Token service - issues and verifies bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue a signed token for a user id.
    fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Verify a token and decode its claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    Hashing(String),
}
