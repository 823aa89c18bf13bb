use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::repo_types::{Role, Status, User};
use crate::auth::session::{Session, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the session cookie to a live user row, or `None` for a missing,
/// garbage, or expired token. Never rejects with 401: "not logged in" is a
/// value here, not an error. The user is re-read from the database on every
/// request, so admin role/status changes apply immediately.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        let Ok(token) = Uuid::parse_str(cookie.value()) else {
            return Ok(Self(None));
        };
        let Some(session) = Session::lookup(&state.db, token).await? else {
            return Ok(Self(None));
        };
        let user = User::find_by_id(&state.db, session.user_id).await?;
        Ok(Self(user))
    }
}

/// Authenticated user required. Rejects with 401 when the session does not
/// resolve, and with 403 when the account has since been banned or
/// suspended, so stale sessions cannot keep acting.
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        let user = user.ok_or(ApiError::Unauthorized)?;
        match user.status {
            Status::Banned => {
                warn!(user_id = %user.id, "banned account with live session");
                Err(ApiError::Forbidden("your account has been banned".into()))
            }
            Status::Suspended => {
                warn!(user_id = %user.id, "suspended account with live session");
                Err(ApiError::Forbidden("your account has been suspended".into()))
            }
            _ => Ok(Self(user)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn parts(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/auth/me");
        if let Some(value) = cookie {
            builder = builder.header(header::COOKIE, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_cookie_resolves_to_no_user() {
        let state = AppState::fake();
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts(None), &state)
            .await
            .expect("no cookie is not an error");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn garbage_token_resolves_to_no_user() {
        let state = AppState::fake();
        let CurrentUser(user) =
            CurrentUser::from_request_parts(&mut parts(Some("session=not-a-uuid")), &state)
                .await
                .expect("garbage token is not an error");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn unrelated_cookie_resolves_to_no_user() {
        let state = AppState::fake();
        let CurrentUser(user) =
            CurrentUser::from_request_parts(&mut parts(Some("theme=dark")), &state)
                .await
                .expect("unrelated cookie is not an error");
        assert!(user.is_none());
    }
}

/// Admin role required; absence or role mismatch both yield 401.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        match user {
            Some(user) if user.role == Role::Admin => Ok(Self(user)),
            Some(user) => {
                warn!(user_id = %user.id, role = ?user.role, "admin route denied");
                Err(ApiError::Unauthorized)
            }
            None => Err(ApiError::Unauthorized),
        }
    }
}
