use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::domain::user::Viewer;
use crate::http::AppError;
use crate::AppState;

/// Authenticated caller, resolved from a `Bearer` access token. The
/// privileged flag comes from the user record, not the token, so demoting
/// an admin takes effect immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub privileged: bool,
}

impl AuthUser {
    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: Some(self.user_id),
            privileged: self.privileged,
        }
    }
}

/// Anonymous access is a first-class viewer; handlers that accept it take
/// `Option<AuthUser>` and go through this.
pub fn viewer_from(auth: Option<&AuthUser>) -> Viewer {
    auth.map(AuthUser::viewer).unwrap_or_else(Viewer::anonymous)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let session = state
            .tokens
            .authenticate(token)
            .map_err(|_| AppError::internal("failed to authenticate"))?
            .ok_or_else(|| AppError::unauthorized("invalid token"))?;

        let user = state
            .store
            .find_user(session.user_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to resolve session user");
                AppError::internal("failed to authenticate")
            })?
            .ok_or_else(|| AppError::unauthorized("invalid token"))?;

        Ok(AuthUser {
            user_id: user.id,
            privileged: user.is_admin,
        })
    }
}
