use crate::guard::{LookupError, ProfileLookup};
use crate::models::{CatalogStats, CreateMovieRequest, Genre, Movie, Profile, UpdateMovieRequest};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

const MOVIE_COLUMNS: &str = "id, title, description, trailer_url, thumbnail_url, release_year, rating, genre_ids, created_at";

/// Repository
///
/// Abstract contract for all persistence operations, so handlers and guards
/// interact with the data layer without knowing the implementation (Postgres,
/// mock, etc.). `ProfileLookup` is a supertrait: whoever holds the repository
/// can hand it to the admin guard as its lookup collaborator.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: ProfileLookup + Send + Sync {
    // --- Catalog Retrieval ---
    // Public listing with genre/year filtering and text search.
    async fn get_movies(
        &self,
        genre: Option<Uuid>,
        year: Option<i32>,
        search: Option<String>,
    ) -> Vec<Movie>;
    // Retrieves top movies ranked by rating.
    async fn get_top_movies(&self, limit: i64) -> Vec<Movie>;
    async fn get_movie(&self, id: Uuid) -> Option<Movie>;
    async fn get_genres(&self) -> Vec<Genre>;

    // --- Catalog Administration ---
    async fn create_movie(&self, req: CreateMovieRequest) -> Option<Movie>;
    // Partial update: uses COALESCE so only provided fields are written.
    async fn update_movie(&self, id: Uuid, req: UpdateMovieRequest) -> Option<Movie>;
    // Returns true if a row was deleted.
    async fn delete_movie(&self, id: Uuid) -> bool;
    async fn create_genre(&self, name: String) -> Option<Genre>;

    // --- Profiles & Dashboard ---
    // Creates the mirroring profile record after external auth signup.
    async fn create_profile(&self, profile: Profile) -> Option<Profile>;
    async fn get_stats(&self) -> CatalogStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileLookup for PostgresRepository {
    /// profile_by_identity
    ///
    /// Fetches the single `profiles` row for an identity. The nullable
    /// `is_admin` column collapses to false here, at the lookup boundary, so
    /// callers only ever see a plain bool. A transport failure is logged and
    /// surfaced as `LookupError`; the admin guard decides what to do with it.
    async fn profile_by_identity(&self, identity: Uuid) -> Result<Option<Profile>, LookupError> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, email, COALESCE(is_admin, false) AS is_admin FROM profiles WHERE id = $1",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("profile_by_identity error: {:?}", e);
            LookupError::from(e)
        })
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_movies
    ///
    /// Implements flexible filtering using QueryBuilder for safe
    /// parameterization. The genre filter matches against the `uuid[]`
    /// association column; the search is case-insensitive across title and
    /// description.
    async fn get_movies(
        &self,
        genre: Option<Uuid>,
        year: Option<i32>,
        search: Option<String>,
    ) -> Vec<Movie> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE true"
        ));

        if let Some(g) = genre {
            builder.push(" AND ");
            builder.push_bind(g);
            builder.push(" = ANY(genre_ids)");
        }

        if let Some(y) = year {
            builder.push(" AND release_year = ");
            builder.push_bind(y);
        }

        if let Some(s) = search {
            let search_pattern = format!("%{}%", s);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(search_pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(search_pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let query = builder.build_query_as::<Movie>();

        match query.fetch_all(&self.pool).await {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("get_movies error: {:?}", e);
                vec![]
            }
        }
    }

    /// get_top_movies
    ///
    /// Retrieves the highest-rated movies. Unrated titles sort last.
    async fn get_top_movies(&self, limit: i64) -> Vec<Movie> {
        match sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY rating DESC NULLS LAST, created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("get_top_movies error: {:?}", e);
                vec![]
            }
        }
    }

    /// get_movie
    ///
    /// Retrieval of a single movie by ID.
    async fn get_movie(&self, id: Uuid) -> Option<Movie> {
        sqlx::query_as::<_, Movie>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_movie error: {:?}", e);
                None
            })
    }

    /// get_genres
    ///
    /// Lists the full genre taxonomy, alphabetically; unnamed rows sort last.
    async fn get_genres(&self) -> Vec<Genre> {
        match sqlx::query_as::<_, Genre>(
            "SELECT id, name, created_at FROM genres ORDER BY name ASC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(g) => g,
            Err(e) => {
                tracing::error!("get_genres error: {:?}", e);
                vec![]
            }
        }
    }

    /// create_movie
    ///
    /// Inserts a new catalog entry and returns the stored row.
    async fn create_movie(&self, req: CreateMovieRequest) -> Option<Movie> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies (id, title, description, trailer_url, thumbnail_url, release_year, rating, genre_ids, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(new_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.trailer_url)
        .bind(req.thumbnail_url)
        .bind(req.release_year)
        .bind(req.rating)
        .bind(req.genre_ids)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_movie error: {:?}", e);
            None
        })
    }

    /// update_movie
    ///
    /// Updates a movie using COALESCE for `Option<T>` fields, only writing a
    /// column when the corresponding request field is `Some`.
    async fn update_movie(&self, id: Uuid, req: UpdateMovieRequest) -> Option<Movie> {
        sqlx::query_as::<_, Movie>(&format!(
            "UPDATE movies \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 trailer_url = COALESCE($4, trailer_url), \
                 thumbnail_url = COALESCE($5, thumbnail_url), \
                 release_year = COALESCE($6, release_year), \
                 rating = COALESCE($7, rating), \
                 genre_ids = COALESCE($8, genre_ids) \
             WHERE id = $1 \
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.trailer_url)
        .bind(req.thumbnail_url)
        .bind(req.release_year)
        .bind(req.rating)
        .bind(req.genre_ids)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_movie error: {:?}", e);
            None
        })
    }

    /// delete_movie
    ///
    /// Removes a catalog entry. Returns false when no row matched.
    async fn delete_movie(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_movie error: {:?}", e);
                false
            }
        }
    }

    /// create_genre
    ///
    /// Inserts a genre row. Matches the hosted schema's Insert shape, where
    /// only the name is client-supplied.
    async fn create_genre(&self, name: String) -> Option<Genre> {
        sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name, created_at) VALUES ($1, $2, NOW()) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_genre error: {:?}", e);
            None
        })
    }

    /// create_profile
    ///
    /// Creates the mirroring record in `public.profiles` after external auth
    /// success, keyed by the provider-issued user ID.
    async fn create_profile(&self, profile: Profile) -> Option<Profile> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (id, email, is_admin) VALUES ($1, $2, $3) \
             RETURNING id, email, COALESCE(is_admin, false) AS is_admin",
        )
        .bind(profile.id)
        .bind(profile.email)
        .bind(profile.is_admin)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_profile error: {:?}", e);
            None
        })
    }

    /// get_stats
    ///
    /// Compiles the counters for the administrative dashboard in one call.
    async fn get_stats(&self) -> CatalogStats {
        let total_movies = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_genres = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_profiles = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_admins =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE is_admin = true")
                .fetch_one(&self.pool)
                .await
                .unwrap_or(0);
        CatalogStats {
            total_movies,
            total_genres,
            total_profiles,
            total_admins,
        }
    }
}
