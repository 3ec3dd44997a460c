//! Startup seeding: create the first admin account if none exists.

use quill_core::domain::{Role, User};

use crate::config::AdminBootstrap;
use crate::state::AppState;

/// Ensure at least one admin account exists. Failures are logged and
/// non-fatal; the server still starts without a seeded admin.
pub async fn ensure_admin(state: &AppState, admin: &AdminBootstrap) {
    match state.users.count_by_role(Role::Admin).await {
        Ok(0) => {}
        Ok(_) => {
            tracing::info!("Admin user already exists");
            return;
        }
        Err(e) => {
            tracing::error!("Failed to check for existing admin: {}", e);
            return;
        }
    }

    let password_hash = match state.passwords.hash(&admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    let user = User::new(
        admin.name.clone(),
        admin.email.clone(),
        password_hash,
        Role::Admin,
    );

    match state.users.insert(user).await {
        Ok(created) => tracing::info!(email = %created.email, "Default admin user created"),
        Err(e) => tracing::error!("Failed to create default admin: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_infra::JwtConfig;

    fn test_admin() -> AdminBootstrap {
        AdminBootstrap {
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        }
    }

    #[actix_web::test]
    async fn seeds_admin_once() {
        let state = AppState::in_memory(JwtConfig::default());

        ensure_admin(&state, &test_admin()).await;
        ensure_admin(&state, &test_admin()).await;

        assert_eq!(state.users.count_by_role(Role::Admin).await.unwrap(), 1);

        let admin = state
            .users
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert_ne!(admin.password_hash, "admin123");
    }
}
