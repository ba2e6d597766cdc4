use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/scope", get(handlers::get_scope).post(handlers::switch_scope))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/habits", post(handlers::add_habit))
        .route("/api/habits/reorder", post(handlers::reorder))
        .route(
            "/api/habits/:index",
            patch(handlers::patch_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:index/days/:day", post(handlers::set_day))
        .with_state(state)
}
