use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Authorization level. Admins get the moderation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Member,
    Moderator,
    Admin,
}

/// Account lifecycle state. `pending` until verified or activated by an
/// admin; `banned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum Status {
    Pending,
    Active,
    Suspended,
    Banned,
}

impl Status {
    /// Login is allowed for pending and active accounts only.
    pub fn can_login(self) -> bool {
        matches!(self, Status::Pending | Status::Active)
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub nationality: Option<String>,
    pub current_location: Option<String>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub years_abroad: Option<i32>,
    pub avatar: Option<String>,
    pub role: Role,
    pub status: Status,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields needed to insert a user row; everything else takes its default.
#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub nationality: Option<String>,
    pub current_location: Option<String>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub years_abroad: Option<i32>,
    pub verification_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_status_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Status::Suspended).unwrap(),
            "\"suspended\""
        );
    }

    #[test]
    fn login_eligibility_follows_status() {
        assert!(Status::Pending.can_login());
        assert!(Status::Active.can_login());
        assert!(!Status::Suspended.can_login());
        assert!(!Status::Banned.can_login());
    }
}
