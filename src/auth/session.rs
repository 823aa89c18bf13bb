use axum_extra::extract::cookie::{Cookie, SameSite};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Server-side session row. The token is the primary key and the literal
/// cookie value: possession of the token is possession of the session.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl Session {
    /// Valid iff `expires_at` is strictly in the future at check time.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Create a session with a fixed lifetime. Multiple sessions per user
    /// coexist; nothing invalidates earlier ones.
    pub async fn create(db: &PgPool, user_id: Uuid, ttl_days: i64) -> anyhow::Result<Session> {
        let token = Uuid::new_v4();
        let expires_at = OffsetDateTime::now_utc() + Duration::days(ttl_days);
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expires_at, created_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Resolve a token. Expired rows are treated as absent but left in
    /// place; there is no background sweep, so expiry is enforced here by
    /// comparison rather than by row deletion.
    pub async fn lookup(db: &PgPool, token: Uuid) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, expires_at, created_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(session.filter(|s| !s.is_expired(OffsetDateTime::now_utc())))
    }

    /// Best-effort removal; deleting a missing token is not an error.
    pub async fn delete(db: &PgPool, token: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count_active(db: &PgPool) -> anyhow::Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE expires_at > now()")
                .fetch_one(db)
                .await?;
        Ok(count)
    }

    /// Cookie carrying the raw token: HttpOnly, SameSite=Lax, path `/`,
    /// Secure only in production, expiry matching the session row.
    pub fn cookie(&self, secure: bool) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, self.token.to_string());
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(secure);
        cookie.set_path("/");
        cookie.set_expires(self.expires_at);
        cookie
    }
}

/// Removal cookie for logout; path must match the original for browsers
/// to drop it.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: OffsetDateTime) -> Session {
        Session {
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            expires_at,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn session_expiry_is_strict() {
        let now = OffsetDateTime::now_utc();
        assert!(session(now).is_expired(now));
        assert!(session(now - Duration::seconds(1)).is_expired(now));
        assert!(!session(now + Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn cookie_carries_token_and_flags() {
        let s = session(OffsetDateTime::now_utc() + Duration::days(30));
        let cookie = s.cookie(false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), s.token.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.expires().is_some());
    }

    #[test]
    fn cookie_secure_flag_follows_environment() {
        let s = session(OffsetDateTime::now_utc() + Duration::days(30));
        assert_eq!(s.cookie(true).secure(), Some(true));
    }

    #[test]
    fn removal_cookie_matches_path() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
    }
}
