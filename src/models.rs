use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Profile
///
/// Mirrors a row of the `public.profiles` table: the privilege record keyed by
/// the external auth identity (`auth.users.id`). The `is_admin` column is
/// nullable in the hosted schema; the repository normalizes it to a plain
/// bool on the way out, so "absent", "null", and "false" are one value here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    // Primary key, also the FK to the external auth.users table.
    pub id: Uuid,
    pub email: Option<String>,
    // Catalog-administration privilege. Read by the admin guard on every
    // navigation to an /admin route.
    pub is_admin: bool,
}

/// Genre
///
/// Mirrors a row of the `public.genres` table. `name` is nullable in the
/// source schema, so it stays optional here rather than being papered over.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Genre {
    pub id: Uuid,
    pub name: Option<String>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Movie
///
/// Mirrors a row of the `public.movies` table: the primary catalog entity.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    // External media references (hosted elsewhere, stored as URLs).
    pub trailer_url: Option<String>,
    pub thumbnail_url: Option<String>,

    pub release_year: i32,
    // Editorial rating on a 0.0–10.0 scale.
    pub rating: Option<f64>,

    /// Associated genres as a `uuid[]` column. Referential integrity against
    /// `genres.id` is enforced by the database, not by this application.
    pub genre_ids: Vec<Uuid>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateMovieRequest
///
/// Input payload for adding a movie to the catalog (POST /admin/movies).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: Option<String>,
    pub trailer_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub release_year: i32,
    pub rating: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
}

/// UpdateMovieRequest
///
/// Partial update payload for an existing movie (PUT /admin/movies/{id}).
/// Every field is optional; only provided fields are written, and `None`
/// fields are omitted from the serialized payload entirely.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateMovieRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<Uuid>>,
}

/// CreateGenreRequest
///
/// Input payload for adding a genre (POST /admin/genres). Matches the Insert
/// shape of the hosted `genres` table, where only the name is supplied.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateGenreRequest {
    pub name: String,
}

/// RegisterRequest
///
/// Input payload for the public signup endpoint (POST /register). The
/// password is passed through to the external auth provider and never
/// persisted or logged by this application.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for the password-grant login endpoint (POST /login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// SessionTokens
///
/// Output of a successful login: the token pair issued by the external auth
/// provider, relayed to the client unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

// --- Dashboard Schemas (Output) ---

/// CatalogStats
///
/// Output schema for the administrative dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CatalogStats {
    pub total_movies: i64,
    pub total_genres: i64,
    pub total_profiles: i64,
    /// Profiles with `is_admin = true`.
    pub total_admins: i64,
}
