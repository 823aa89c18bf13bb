use crate::state::AppState;
use axum::Router;

pub(crate) mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::admin_routes()
}
