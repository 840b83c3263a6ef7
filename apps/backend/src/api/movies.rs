//! Movies API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde_json::Value;

use super::{reshape_credits, reshape_galleries, PageQuery, TrendingQuery, RELATED_CAP};
use crate::error::{AppError, Result};
use crate::response::{CachePolicy, Cached};
use crate::services::images::{ImageKind, ImageUrls};
use crate::services::tmdb::{MediaType, Paginated};
use crate::AppState;

// =============================================================================
// Router
// =============================================================================

/// Creates the movies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/popular", get(popular_movies))
        .route("/trending", get(trending_movies))
        .route("/:id", get(get_movie))
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/movies/:id
///
/// Movie details with credits, videos, galleries, keywords, external ids,
/// reviews, recommendations and similar titles.
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Cached<Value>> {
    let tmdb = state.tmdb()?;

    let mut movie = tmdb
        .movie_details(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch movie details"))?;

    reshape_title_details(&mut movie, state.images());

    Ok(Cached::new(CachePolicy::DETAIL, movie))
}

/// GET /api/movies/popular
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Cached<Paginated>> {
    let tmdb = state.tmdb()?;

    let mut list = tmdb
        .popular_movies(query.page())
        .await
        .map_err(AppError::upstream("Failed to fetch popular movies"))?;

    state.images().listing().titles(&mut list.results);

    Ok(Cached::new(CachePolicy::DETAIL, list))
}

/// GET /api/movies/trending
pub async fn trending_movies(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Cached<Paginated>> {
    let tmdb = state.tmdb()?;

    let mut list = tmdb
        .trending(MediaType::Movie, query.time_window(), None)
        .await
        .map_err(AppError::upstream("Failed to fetch trending movies"))?;

    state.images().card().titles(&mut list.results);

    tracing::debug!(
        time_window = %query.time_window(),
        results = list.results.len(),
        "Trending movies"
    );

    Ok(Cached::new(CachePolicy::TRENDING, list))
}

// =============================================================================
// Reshaping
// =============================================================================

/// Reshape a movie or series detail document in place.
///
/// Header artwork uses card sizes, galleries keep ten backdrops and ten
/// posters, related-title lists keep twenty entries.
pub(crate) fn reshape_title_details(details: &mut Value, images: &ImageUrls) {
    let Some(obj) = details.as_object_mut() else {
        return;
    };
    let card = images.card();

    card.fields(obj, &[ImageKind::Poster, ImageKind::Backdrop]);
    reshape_galleries(
        &images.gallery(),
        obj,
        &[("backdrops", ImageKind::Backdrop), ("posters", ImageKind::Poster)],
    );
    card.results_in(obj, "recommendations", RELATED_CAP);
    card.results_in(obj, "similar", RELATED_CAP);
    reshape_credits(&card, obj, "credits");
    card.each_in(obj, "production_companies");
}
