use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::PublicUser;

/// Moderation verbs accepted by `PATCH /admin/users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminAction {
    Activate,
    Suspend,
    Ban,
    Verify,
    MakeAdmin,
    MakeModerator,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    pub action: AdminAction,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub pending_users: i64,
    pub new_users_this_week: i64,
    pub active_sessions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_deserialize_camel_case() {
        let req: UpdateUserRequest = serde_json::from_str(&format!(
            r#"{{"userId":"{}","action":"makeModerator"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.action, AdminAction::MakeModerator);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let result: Result<AdminAction, _> = serde_json::from_str("\"unban\"");
        assert!(result.is_err());
    }

    #[test]
    fn pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);
    }
}
