use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Guest, Authenticated, Admin).
pub mod routes;
use guard::{GuardOutcome, Session};
use routes::{admin, authenticated, guest, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application, aggregating every handler decorated with `#[utoipa::path]`
/// and every schema decorated with `ToSchema`. Served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_genres, handlers::get_movies, handlers::get_featured_movies,
        handlers::get_movie_details, handlers::get_me, handlers::register_user,
        handlers::login_user, handlers::get_admin_movies, handlers::get_admin_stats,
        handlers::create_movie, handlers::update_movie, handlers::delete_movie,
        handlers::create_genre
    ),
    components(
        schemas(
            models::Movie, models::Genre, models::Profile, models::CreateMovieRequest,
            models::UpdateMovieRequest, models::CreateGenreRequest, models::RegisterRequest,
            models::LoginRequest, models::SessionTokens, models::CatalogStats,
        )
    ),
    tags(
        (name = "myflix", description = "Movie catalog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding the application's
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: database access behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors and middleware to selectively pull components from the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

// --- Guard Middleware ---

/// Maps a guard outcome onto the HTTP layer: `Proceed` runs the rest of the
/// navigation, `Redirect` ends it with a redirect response.
async fn apply_outcome(outcome: GuardOutcome, request: Request, next: Next) -> Response {
    match outcome {
        GuardOutcome::Proceed => next.run(request).await,
        GuardOutcome::Redirect(to) => Redirect::to(to).into_response(),
    }
}

/// guest_guard_middleware
///
/// Pre-navigation hook for the guest router. The `Session` extractor resolves
/// the visitor's identity (infallibly), and `guard::guest_only` decides;
/// a logged-in visitor never reaches a login or signup handler.
async fn guest_guard_middleware(session: Session, request: Request, next: Next) -> Response {
    apply_outcome(guard::guest_only(&session), request, next).await
}

/// admin_guard_middleware
///
/// Pre-navigation hook for the `/admin` router. Hands the resolved session
/// and the repository (as the guard's profile-lookup collaborator) to
/// `guard::admin_only`. This layer is the only privilege check on the admin
/// routes, so each admin navigation costs exactly one profile lookup.
async fn admin_guard_middleware(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let outcome = guard::admin_only(&session, state.repo.as_ref()).await;
    apply_outcome(outcome, request, next).await
}

/// session_middleware
///
/// Enforces a resolved identity for the `authenticated_routes`. Unlike the
/// guards, which redirect page navigations, this rejects with 401: these are
/// data endpoints consumed by the frontend, not destinations a visitor lands
/// on.
async fn session_middleware(session: Session, request: Request, next: Next) -> Response {
    if session.identity.is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no guard applied.
        .merge(public::public_routes())
        // Guest routes: guest-only guard, evaluated once per navigation.
        .merge(guest::guest_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            guest_guard_middleware,
        )))
        // Authenticated routes: require a resolved identity.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        // Admin routes: nested under '/admin', wrapped in the admin-only
        // guard layer. Handlers inside carry no further privilege checks.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_guard_middleware,
            )),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span: includes the `x-request-id` header (if
/// present) in the structured logging metadata alongside method and URI, so
/// every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
