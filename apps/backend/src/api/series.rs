//! Series (TV) API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde_json::Value;

use super::movies::reshape_title_details;
use super::{reshape_credits, reshape_galleries, PageQuery, TrendingQuery};
use crate::error::{AppError, Result};
use crate::response::{CachePolicy, Cached};
use crate::services::images::{ImageKind, ImageUrls};
use crate::services::tmdb::{MediaType, Paginated};
use crate::AppState;

/// Creates the series router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/popular", get(popular_series))
        .route("/trending", get(trending_series))
        .route("/:id", get(get_series))
        .route("/:id/seasons/:season_number", get(get_season))
}

/// GET /api/series/:id
pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Cached<Value>> {
    let tmdb = state.tmdb()?;

    let mut series = tmdb
        .tv_details(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch series details"))?;

    reshape_series_details(&mut series, state.images());

    Ok(Cached::new(CachePolicy::DETAIL, series))
}

/// GET /api/series/:id/seasons/:season_number
pub async fn get_season(
    State(state): State<AppState>,
    Path((id, season_number)): Path<(String, String)>,
) -> Result<Cached<Value>> {
    let tmdb = state.tmdb()?;

    let mut season = tmdb
        .season_details(&id, &season_number)
        .await
        .map_err(AppError::upstream("Failed to fetch season details"))?;

    reshape_season(&mut season, state.images());

    Ok(Cached::new(CachePolicy::DETAIL, season))
}

/// GET /api/series/popular
pub async fn popular_series(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Cached<Paginated>> {
    let tmdb = state.tmdb()?;

    let mut list = tmdb
        .popular_tv(query.page())
        .await
        .map_err(AppError::upstream("Failed to fetch popular series"))?;

    state.images().listing().titles(&mut list.results);

    Ok(Cached::new(CachePolicy::DETAIL, list))
}

/// GET /api/series/trending
pub async fn trending_series(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Cached<Paginated>> {
    let tmdb = state.tmdb()?;

    let mut list = tmdb
        .trending(MediaType::Tv, query.time_window(), Some(query.page()))
        .await
        .map_err(AppError::upstream("Failed to fetch trending series"))?;

    state.images().card().titles(&mut list.results);

    Ok(Cached::new(CachePolicy::TRENDING, list))
}

fn reshape_series_details(details: &mut Value, images: &ImageUrls) {
    reshape_title_details(details, images);

    let Some(obj) = details.as_object_mut() else {
        return;
    };
    let card = images.card();
    card.each_in(obj, "seasons");
    card.each_in(obj, "created_by");
    card.each_in(obj, "networks");
}

fn reshape_season(season: &mut Value, images: &ImageUrls) {
    let Some(obj) = season.as_object_mut() else {
        return;
    };
    let card = images.card();

    card.fields(obj, &[ImageKind::Poster]);
    reshape_galleries(&images.gallery(), obj, &[("posters", ImageKind::Poster)]);
    card.each_in(obj, "episodes");
    reshape_credits(&card, obj, "credits");
}
