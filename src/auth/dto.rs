use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, Status, User};
use crate::error::FieldError;

/// Emails are stored and looked up lowercase; uniqueness is
/// case-insensitive.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub nationality: Option<String>,
    pub current_location: Option<String>,
    pub profession: Option<String>,
    pub company: Option<String>,
    pub years_abroad: Option<i32>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.first_name.trim().chars().count() < 2 {
            errors.push(FieldError::new(
                "firstName",
                "first name must be at least 2 characters",
            ));
        }
        if self.last_name.trim().chars().count() < 2 {
            errors.push(FieldError::new(
                "lastName",
                "last name must be at least 2 characters",
            ));
        }
        if !is_valid_email(&self.email) {
            errors.push(FieldError::new("email", "invalid email address"));
        }
        if self.password.len() < 8 {
            errors.push(FieldError::new(
                "password",
                "password must be at least 8 characters",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for self-service email verification.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// The one redacted projection of a user returned to clients. Password hash
/// and verification code never cross this boundary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            display_name: user.display_name.clone(),
            nationality: user.nationality.clone(),
            current_location: user.current_location.clone(),
            profession: user.profession.clone(),
            company: user.company.clone(),
            years_abroad: user.years_abroad,
            avatar: user.avatar.clone(),
            role: user.role,
            status: user.status,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

/// Response for login and register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}

/// Response for `GET /auth/me`; never an error for "not logged in".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: Option<PublicUser>,
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Jo".into(),
            last_name: "Do".into(),
            email: "jo@x.com".into(),
            password: "password1".into(),
            nationality: None,
            current_location: None,
            profession: None,
            company: None,
            years_abroad: None,
        }
    }

    #[test]
    fn emails_normalize_to_lowercase() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        // Addresses differing only by case collapse to the same key,
        // so the second registration hits the existing row.
        assert_eq!(normalize_email("A@x.com"), normalize_email("a@x.com"));
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn validation_reports_each_bad_field() {
        let mut req = request();
        req.first_name = "J".into();
        req.email = "not-an-email".into();
        req.password = "short".into();
        let errors = req.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["firstName", "email", "password"]);
    }

    #[test]
    fn register_request_uses_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Jo","lastName":"Do","email":"jo@x.com",
                "password":"password1","currentLocation":"Muscat","yearsAbroad":3}"#,
        )
        .unwrap();
        assert_eq!(req.current_location.as_deref(), Some("Muscat"));
        assert_eq!(req.years_abroad, Some(3));
    }

    #[test]
    fn public_user_omits_sensitive_fields() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: "jo@x.com".into(),
            password_hash: "argon2-hash".into(),
            first_name: "Jo".into(),
            last_name: "Do".into(),
            display_name: "Jo Do".into(),
            nationality: None,
            current_location: None,
            profession: None,
            company: None,
            years_abroad: None,
            avatar: None,
            role: Role::Member,
            status: Status::Pending,
            email_verified: false,
            verification_code: Some("123456".into()),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("123456"));
        assert!(json.contains("\"emailVerified\":false"));
    }

    #[test]
    fn email_regex_accepts_and_rejects() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email(""));
    }
}
