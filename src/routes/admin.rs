use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Routes exclusively accessible to profiles with `is_admin = true`:
/// catalog moderation and dashboard statistics.
///
/// Access Control:
/// This entire router is nested under `/admin` and wrapped in the admin-only
/// guard layer in `create_router`. The guard resolves the session, performs
/// the single privilege lookup, and redirects everyone else to `/` — so the
/// handlers below carry no privilege checks of their own.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Core dashboard metrics (movies, genres, profiles, admins).
        .route("/stats", get(handlers::get_admin_stats))
        // GET/POST /admin/movies
        // The moderation view (every title, newest first) and title creation.
        .route(
            "/movies",
            get(handlers::get_admin_movies).post(handlers::create_movie),
        )
        // PUT/DELETE /admin/movies/{id}
        // Partial update or removal of a single title.
        .route(
            "/movies/{id}",
            put(handlers::update_movie).delete(handlers::delete_movie),
        )
        // POST /admin/genres
        // Extends the genre taxonomy.
        .route("/genres", post(handlers::create_genre))
}
