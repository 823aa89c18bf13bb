use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::{
    admin::dto::{AdminAction, AdminStats, Pagination, UpdateUserRequest, UserListResponse},
    auth::{
        dto::PublicUser,
        extractors::AdminUser,
        repo_types::{Role, Status, User},
        session::Session,
    },
    error::ApiError,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).patch(update_user))
        .route("/admin/stats", get(stats))
}

/// What a moderation verb does to a user row.
enum Mutation {
    SetStatus(Status),
    SetRole(Role),
    SetVerified,
}

/// Transition check for the status machine. Banned is terminal: only
/// role/verification changes are still possible on a banned account, and
/// nothing moves it back out.
fn plan_action(user: &User, action: AdminAction) -> Result<Mutation, ApiError> {
    match action {
        AdminAction::Activate | AdminAction::Suspend if user.status == Status::Banned => {
            Err(ApiError::Conflict("account is banned".into()))
        }
        AdminAction::Activate => Ok(Mutation::SetStatus(Status::Active)),
        AdminAction::Suspend => Ok(Mutation::SetStatus(Status::Suspended)),
        AdminAction::Ban => Ok(Mutation::SetStatus(Status::Banned)),
        AdminAction::Verify => Ok(Mutation::SetVerified),
        AdminAction::MakeAdmin => Ok(Mutation::SetRole(Role::Admin)),
        AdminAction::MakeModerator => Ok(Mutation::SetRole(Role::Moderator)),
    }
}

#[instrument(skip(state, admin, page))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<UserListResponse>, ApiError> {
    let limit = page.limit.clamp(1, 200);
    let users = User::list(&state.db, limit, page.offset.max(0)).await?;
    info!(admin_id = %admin.id, count = users.len(), "admin listed users");
    Ok(Json(UserListResponse {
        users: users.iter().map(PublicUser::from).collect(),
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, payload.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let updated = match plan_action(&user, payload.action) {
        Ok(Mutation::SetStatus(status)) => User::set_status(&state.db, user.id, status).await?,
        Ok(Mutation::SetRole(role)) => User::set_role(&state.db, user.id, role).await?,
        Ok(Mutation::SetVerified) => User::set_email_verified(&state.db, user.id).await?,
        Err(e) => {
            warn!(admin_id = %admin.id, user_id = %user.id, action = ?payload.action,
                "admin action rejected");
            return Err(e);
        }
    };

    info!(admin_id = %admin.id, user_id = %updated.id, action = ?payload.action,
        "admin updated user");
    Ok(Json(PublicUser::from(&updated)))
}

#[instrument(skip(state, admin))]
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    let week_ago = OffsetDateTime::now_utc() - Duration::days(7);
    let stats = AdminStats {
        total_users: User::count_all(&state.db).await?,
        active_users: User::count_by_status(&state.db, Status::Active).await?,
        pending_users: User::count_by_status(&state.db, Status::Pending).await?,
        new_users_this_week: User::count_created_since(&state.db, week_ago).await?,
        active_sessions: Session::count_active(&state.db).await?,
    };
    info!(admin_id = %admin.id, "admin fetched stats");
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(status: Status, role: Role) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "jo@x.com".into(),
            password_hash: "hash".into(),
            first_name: "Jo".into(),
            last_name: "Do".into(),
            display_name: "Jo Do".into(),
            nationality: None,
            current_location: None,
            profession: None,
            company: None,
            years_abroad: None,
            avatar: None,
            role,
            status,
            email_verified: false,
            verification_code: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn activate_moves_pending_and_suspended_to_active() {
        for status in [Status::Pending, Status::Suspended] {
            let plan = plan_action(&user(status, Role::Member), AdminAction::Activate);
            assert!(matches!(plan, Ok(Mutation::SetStatus(Status::Active))));
        }
    }

    #[test]
    fn ban_is_allowed_from_any_state() {
        for status in [
            Status::Pending,
            Status::Active,
            Status::Suspended,
            Status::Banned,
        ] {
            let plan = plan_action(&user(status, Role::Member), AdminAction::Ban);
            assert!(matches!(plan, Ok(Mutation::SetStatus(Status::Banned))));
        }
    }

    #[test]
    fn banned_is_terminal_for_status_changes() {
        let banned = user(Status::Banned, Role::Member);
        assert!(plan_action(&banned, AdminAction::Activate).is_err());
        assert!(plan_action(&banned, AdminAction::Suspend).is_err());
    }

    #[test]
    fn role_changes_map_to_roles() {
        let member = user(Status::Active, Role::Member);
        assert!(matches!(
            plan_action(&member, AdminAction::MakeAdmin),
            Ok(Mutation::SetRole(Role::Admin))
        ));
        assert!(matches!(
            plan_action(&member, AdminAction::MakeModerator),
            Ok(Mutation::SetRole(Role::Moderator))
        ));
    }
}
