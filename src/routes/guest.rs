use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Guest Router Module
///
/// Routes that only make sense for unauthenticated visitors: the entry points
/// into the external auth provider's identity flow.
///
/// Access Control:
/// This router is wrapped in the guest-only guard layer in `create_router`.
/// A visitor who already holds a session is redirected to `/` before any
/// handler here runs; an anonymous visitor proceeds.
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        // POST /register
        // Signup through the external provider, then mirror the new identity
        // into public.profiles.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Password grant against the external provider; relays its token pair.
        .route("/login", post(handlers::login_user))
}
