use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that are unauthenticated and accessible to any client, anonymous
/// or logged-in: the browsable catalog plus the health probe. No guard layer
/// is attached; every handler here is read-only.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /genres
        // The genre taxonomy used by the frontend to shelve the catalog.
        .route("/genres", get(handlers::get_genres))
        // GET /movies?genre=...&year=...&search=...
        // Lists movies with genre/year filtering and full-text search.
        .route("/movies", get(handlers::get_movies))
        // GET /movies/featured
        // The top 5 titles ranked by rating, for the landing-page rail.
        .route("/movies/featured", get(handlers::get_featured_movies))
        // GET /movies/{id}
        // Detailed view of a single title.
        .route("/movies/{id}", get(handlers::get_movie_details))
}
