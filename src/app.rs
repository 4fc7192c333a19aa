use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health/", get(handlers::health))
        .route("/api/stats/", get(handlers::get_stats))
        .route(
            "/api/actions/",
            get(handlers::list_actions).post(handlers::create_action),
        )
        .route(
            "/api/actions/:id/",
            get(handlers::get_action)
                .put(handlers::replace_action)
                .patch(handlers::merge_action)
                .delete(handlers::delete_action),
        )
        .with_state(state)
}
