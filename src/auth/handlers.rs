use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use rand::Rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            normalize_email, AuthResponse, LoginRequest, LogoutResponse, MeResponse, PublicUser,
            RegisterRequest, VerifyRequest,
        },
        extractors::{CurrentUser, RequireUser},
        password::{hash_password, verify_password},
        repo_types::{NewUser, Status, User},
        session::{removal_cookie, Session, SESSION_COOKIE},
    },
    error::{is_unique_violation, ApiError, FieldError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/verify", post(verify))
        .route("/auth/logout", post(logout))
}

/// 6-digit code, logged rather than emailed; see the `Mailer` collaborator.
fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000u32..=999_999).to_string()
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.validate().map_err(ApiError::Validation)?;

    // Pre-check for a friendly conflict; the unique index stays authoritative.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(
            "an account with this email already exists".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let code = generate_verification_code();
    let display_name = format!("{} {}", payload.first_name.trim(), payload.last_name.trim());

    let new = NewUser {
        email: payload.email.clone(),
        password_hash,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        display_name,
        nationality: payload.nationality,
        current_location: payload.current_location,
        profession: payload.profession,
        company: payload.company,
        years_abroad: payload.years_abroad,
        verification_code: code.clone(),
    };

    let user = match User::create(&state.db, new).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "registration race lost to unique index");
            return Err(ApiError::Conflict(
                "an account with this email already exists".into(),
            ));
        }
        Err(e) => return Err(ApiError::Internal(e)),
    };

    if let Err(e) = state
        .mailer
        .send_verification_email(&user.email, &user.display_name, &code)
        .await
    {
        // Registration still succeeds; the code stays on the row.
        warn!(error = %e, user_id = %user.id, "verification email failed");
    }

    let session = Session::create(&state.db, user.id, state.config.session_ttl_days).await?;
    let jar = jar.add(session.cookie(state.config.cookie_secure()));

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    payload.email = normalize_email(&payload.email);

    // Unknown email and wrong password collapse to the same response.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Auth);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth);
    }

    match user.status {
        Status::Banned => {
            warn!(user_id = %user.id, "login attempt by banned account");
            return Err(ApiError::Forbidden(
                "your account has been banned, please contact support".into(),
            ));
        }
        Status::Suspended => {
            warn!(user_id = %user.id, "login attempt by suspended account");
            return Err(ApiError::Forbidden(
                "your account has been suspended, please contact support".into(),
            ));
        }
        _ => {}
    }

    let session = Session::create(&state.db, user.id, state.config.session_ttl_days).await?;
    User::record_login(&state.db, user.id).await?;
    let jar = jar.add(session.cookie(state.config.cookie_secure()));

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(current))]
pub async fn me(current: CurrentUser) -> Result<Json<MeResponse>, ApiError> {
    let CurrentUser(user) = current;
    Ok(Json(MeResponse {
        is_authenticated: user.is_some(),
        user: user.as_ref().map(PublicUser::from),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let matches = user
        .verification_code
        .as_deref()
        .map(|c| c == payload.code.trim())
        .unwrap_or(false);
    if !matches {
        warn!(user_id = %user.id, "wrong verification code");
        return Err(ApiError::Validation(vec![FieldError::new(
            "code",
            "invalid verification code",
        )]));
    }

    let user = User::mark_verified(&state.db, user.id).await?;
    info!(user_id = %user.id, "email verified");
    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = Uuid::parse_str(cookie.value()) {
            Session::delete(&state.db, token).await?;
        }
    }
    // Idempotent: clearing an absent cookie is fine.
    let jar = jar.remove(removal_cookie());
    Ok((jar, Json(LogoutResponse { success: true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_is_six_digits() {
        for _ in 0..200 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn me_response_serializes_unauthenticated_shape() {
        let response = MeResponse {
            user: None,
            is_authenticated: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user"], serde_json::Value::Null);
        assert_eq!(json["isAuthenticated"], serde_json::Value::Bool(false));
    }
}
