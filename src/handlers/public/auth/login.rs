// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, password, Claims};
use crate::database::models::User;
use crate::database::{DatabaseManager, UserRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl LoginRequest {
    /// Both credentials, or `None` when either is missing or blank
    fn credentials(&self) -> Option<(&str, &str)> {
        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((email, password))
    }
}

/// POST /api/auth/login - Exchange admin credentials for a JWT
///
/// Unknown emails and wrong passwords both answer 401 with the same message;
/// accounts that exist but are not active admins answer 403.
pub async fn login_post(payload: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let (email, password) = request
        .credentials()
        .ok_or_else(|| ApiError::bad_request("Email and password are required"))?;

    let repo = UserRepository::new(DatabaseManager::pool().await?);
    let user = repo.find_by_email(email).await?.ok_or_else(|| {
        tracing::warn!("Login failed: no account for {}", email);
        ApiError::unauthorized("Invalid credentials")
    })?;

    check_access(&user)?;

    // Keep argon2 off the async workers
    let password = password.to_string();
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("Internal server error")
        })??;

    if !verified {
        tracing::warn!("Login failed: wrong password for {}", user.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = Claims::new(user.id, user.email.clone(), Role::Admin);
    let token = auth::generate_jwt(&claims)?;

    tracing::info!("Admin {} logged in", user.email);
    Ok(ApiResponse::success(LoginResponse {
        token,
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            role: Role::Admin,
        },
    }))
}

/// Only active admin accounts may sign in
fn check_access(user: &User) -> Result<(), ApiError> {
    if user.role() != Role::Admin {
        tracing::warn!("Login refused: {} is not an admin", user.email);
        return Err(ApiError::forbidden("Access denied. Admin only."));
    }
    if !user.is_active {
        tracing::warn!("Login refused: {} is deactivated", user.email);
        return Err(ApiError::forbidden("Account is disabled"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, password: Option<&str>) -> LoginRequest {
        LoginRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn requires_both_credentials() {
        assert!(request(None, Some("pw")).credentials().is_none());
        assert!(request(Some("a@b.c"), None).credentials().is_none());
        assert!(request(Some("   "), Some("pw")).credentials().is_none());
        assert!(request(Some("a@b.c"), Some("")).credentials().is_none());
    }

    #[test]
    fn trims_email() {
        let req = request(Some(" Admin@Example.com "), Some("pw"));
        assert_eq!(req.credentials(), Some(("Admin@Example.com", "pw")));
    }

    fn account(role: Role, is_active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            role: role.as_str().to_string(),
            is_active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn active_admins_may_sign_in() {
        assert!(check_access(&account(Role::Admin, true)).is_ok());
    }

    #[test]
    fn refuses_non_admins_and_disabled_accounts() {
        let err = check_access(&account(Role::User, true)).unwrap_err();
        assert_eq!(err.message(), "Access denied. Admin only.");

        let err = check_access(&account(Role::Admin, false)).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Account is disabled");
    }
}
