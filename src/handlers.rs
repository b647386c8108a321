use crate::{
    AppState,
    guard::{ProfileLookup, Session},
    models::{
        self, CatalogStats, CreateGenreRequest, CreateMovieRequest, Genre, LoginRequest, Movie,
        Profile, RegisterRequest, SessionTokens, UpdateMovieRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// MovieFilter
///
/// Accepted query parameters for the public movie listing (GET /movies).
/// Bound by Axum's Query extractor for filtering and search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct MovieFilter {
    /// Optional genre ID; matches movies whose associations include it.
    pub genre: Option<Uuid>,
    /// Optional release-year filter.
    pub year: Option<i32>,
    /// Optional case-insensitive search over title and description.
    pub search: Option<String>,
}

/// SupabaseAuthResponse
///
/// Minimal struct to deserialize the response from the external auth
/// provider's /auth/v1/signup endpoint, capturing the new user's UUID.
#[derive(Deserialize)]
struct SupabaseAuthResponse {
    id: Uuid,
}

/// SupabaseTokenResponse
///
/// Minimal struct for the provider's password-grant token response.
#[derive(Deserialize)]
struct SupabaseTokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
}

// --- Public Catalog Handlers ---

/// get_genres
///
/// [Public Route] Lists the genre taxonomy used to shelve the catalog.
#[utoipa::path(
    get,
    path = "/genres",
    responses((status = 200, description = "All genres", body = [Genre]))
)]
pub async fn get_genres(State(state): State<AppState>) -> Json<Vec<models::Genre>> {
    let genres = state.repo.get_genres().await;
    Json(genres)
}

/// get_movies
///
/// [Public Route] Lists movies with genre, year, and search filtering.
#[utoipa::path(
    get,
    path = "/movies",
    params(MovieFilter),
    responses((status = 200, description = "List filtered movies", body = [Movie]))
)]
pub async fn get_movies(
    State(state): State<AppState>,
    Query(filter): Query<MovieFilter>,
) -> Json<Vec<models::Movie>> {
    let movies = state
        .repo
        .get_movies(filter.genre, filter.year, filter.search)
        .await;
    Json(movies)
}

/// get_featured_movies
///
/// [Public Route] Retrieves a small list of the highest-rated titles for the
/// landing page rail. The `limit` (5) is fixed at the call site.
#[utoipa::path(
    get,
    path = "/movies/featured",
    responses((status = 200, description = "Top-rated movies", body = [Movie]))
)]
pub async fn get_featured_movies(State(state): State<AppState>) -> Json<Vec<models::Movie>> {
    let featured = state.repo.get_top_movies(5).await;
    Json(featured)
}

/// get_movie_details
///
/// [Public Route] Retrieves a single movie by ID.
#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(("id" = Uuid, Path, description = "Movie ID")),
    responses((status = 200, description = "Found", body = Movie))
)]
pub async fn get_movie_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::Movie>, StatusCode> {
    match state.repo.get_movie(id).await {
        Some(movie) => Ok(Json(movie)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

// --- Session Handlers ---

/// get_me
///
/// [Authenticated Route] Returns the caller's own profile row. The route
/// layer already rejects anonymous sessions; the identity check here keeps
/// the handler total.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = Profile))
)]
pub async fn get_me(
    session: Session,
    State(state): State<AppState>,
) -> Result<Json<Profile>, StatusCode> {
    let Some(identity) = session.identity else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    match state.repo.profile_by_identity(identity).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        // A valid session whose profile row is gone reads as "no profile".
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// register_user
///
/// [Guest Route] Handles signup via the external auth provider.
///
/// *Flow*: Calls the provider's signup endpoint, retrieves the canonical user
/// UUID, and creates the corresponding record in `public.profiles`. New
/// accounts are never admins; privilege is granted out of band.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses((status = 200, description = "Registered", body = Profile))
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Profile>, StatusCode> {
    let client = reqwest::Client::new();
    let auth_url = format!("{}/auth/v1/signup", state.config.supabase_url);

    let response = client
        .post(auth_url)
        .header("apikey", &state.config.supabase_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !response.status().is_success() {
        // The provider rejected the signup (existing email, weak password).
        return Err(StatusCode::BAD_REQUEST);
    }

    let supabase_user = response
        .json::<SupabaseAuthResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Mirror the provider-issued identity into our local profiles table.
    let new_profile = Profile {
        id: supabase_user.id,
        email: Some(payload.email),
        is_admin: false,
    };

    match state.repo.create_profile(new_profile).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// login_user
///
/// [Guest Route] Exchanges credentials for a session token pair via the
/// provider's password grant. The tokens are relayed unchanged; this service
/// never mints its own.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionTokens),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionTokens>, StatusCode> {
    let client = reqwest::Client::new();
    let token_url = format!(
        "{}/auth/v1/token?grant_type=password",
        state.config.supabase_url
    );

    let response = client
        .post(token_url)
        .header("apikey", &state.config.supabase_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !response.status().is_success() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let tokens = response
        .json::<SupabaseTokenResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(SessionTokens {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }))
}

// --- Admin Handlers ---
//
// The /admin route layer has already evaluated the admin guard by the time
// these run; none of them re-check privilege, keeping the guard the single
// lookup per navigation.

/// get_admin_movies
///
/// [Admin Route] The moderation view: every movie, newest first, unfiltered.
#[utoipa::path(
    get,
    path = "/admin/movies",
    responses((status = 200, description = "All movies", body = [Movie]))
)]
pub async fn get_admin_movies(State(state): State<AppState>) -> Json<Vec<models::Movie>> {
    Json(state.repo.get_movies(None, None, None).await)
}

/// get_admin_stats
///
/// [Admin Route] Core catalog statistics for the dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = CatalogStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<CatalogStats> {
    Json(state.repo.get_stats().await)
}

/// create_movie
///
/// [Admin Route] Adds a title to the catalog.
#[utoipa::path(
    post,
    path = "/admin/movies",
    request_body = CreateMovieRequest,
    responses((status = 200, description = "Created", body = Movie))
)]
pub async fn create_movie(
    State(state): State<AppState>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<Json<models::Movie>, StatusCode> {
    match state.repo.create_movie(payload).await {
        Some(movie) => Ok(Json(movie)),
        None => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// update_movie
///
/// [Admin Route] Partially updates a title; absent fields keep their values.
#[utoipa::path(
    put,
    path = "/admin/movies/{id}",
    params(("id" = Uuid, Path, description = "Movie ID")),
    request_body = UpdateMovieRequest,
    responses((status = 200, description = "Updated", body = Movie))
)]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<Json<models::Movie>, StatusCode> {
    match state.repo.update_movie(id, payload).await {
        Some(movie) => Ok(Json(movie)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_movie
///
/// [Admin Route] Removes a title from the catalog.
#[utoipa::path(
    delete,
    path = "/admin/movies/{id}",
    params(("id" = Uuid, Path, description = "Movie ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_movie(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_movie(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// create_genre
///
/// [Admin Route] Adds a genre to the taxonomy.
#[utoipa::path(
    post,
    path = "/admin/genres",
    request_body = CreateGenreRequest,
    responses((status = 200, description = "Created", body = Genre))
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Json(payload): Json<CreateGenreRequest>,
) -> Result<Json<models::Genre>, StatusCode> {
    match state.repo.create_genre(payload.name).await {
        Some(genre) => Ok(Json(genre)),
        None => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
