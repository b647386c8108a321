use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any visitor with a resolved identity, regardless of privilege.
///
/// Access Control Strategy:
/// The session-required layer attached in `create_router` rejects anonymous
/// sessions with 401 before these handlers run. Handlers still receive the
/// `Session` themselves for the identity value.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /me
        // The caller's own profile row, including the admin flag the
        // frontend uses to decide whether to show the admin entry point.
        .route("/me", get(handlers::get_me))
}
