use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use lexdesk_shared::{User, UserRole};

use super::jwt;
use crate::error::{ApiError, ApiResult, AppError};
use crate::AppState;

/// Authenticated user extractor
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    /// Admins and managers only.
    pub fn require_staff(&self) -> ApiResult<()> {
        if self.0.role.is_staff_manager() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator or manager role required"))
        }
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        if self.0.role == UserRole::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Administrator role required"))
        }
    }

    /// Staff, or the user identified by `user_id` acting on their own data.
    pub fn require_self_or_staff(&self, user_id: Uuid) -> ApiResult<()> {
        if self.0.id == user_id {
            return Ok(());
        }
        self.require_staff()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract Bearer token from Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()).into_response())?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()).into_response())?;

        let token_data = jwt::verify_jwt(token, &state.jwt_secret)
            .map_err(|e| AppError::from(e).into_response())?;

        let user = state
            .store
            .get_user(token_data.claims.sub)
            .await
            .map_err(|e| AppError::from(e).into_response())?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()).into_response())?;

        // A role change invalidates tokens issued under the old role
        if user.role != token_data.claims.role {
            return Err(AppError::Unauthorized("Token role is out of date".to_string()).into_response());
        }

        Ok(AuthUser(user))
    }
}
