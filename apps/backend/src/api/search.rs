//! Search API endpoint.

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use super::{param_or, DEFAULT_PAGE};
use crate::error::{AppError, Result};
use crate::response::{CachePolicy, Cached};
use crate::services::tmdb::{MediaType, MultiSearch, Paginated};
use crate::AppState;

const DEFAULT_INCLUDE_ADULT: &str = "false";
const DEFAULT_LANGUAGE: &str = "en-US";

/// Query parameters for search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Search query string (required).
    pub q: Option<String>,
    /// Page number (default: 1).
    pub page: Option<String>,
    /// Forwarded to TMDB (default: false).
    pub include_adult: Option<String>,
    /// Result language (default: en-US).
    pub language: Option<String>,
}

/// GET /api/search
///
/// Multi search restricted to movies and series. `total_results` counts the
/// results left after people and other types are dropped.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Cached<Paginated>> {
    let search_term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;

    let tmdb = state.tmdb()?;

    let upstream = tmdb
        .search_multi(&MultiSearch {
            query: search_term,
            page: param_or(&query.page, DEFAULT_PAGE),
            include_adult: param_or(&query.include_adult, DEFAULT_INCLUDE_ADULT),
            language: param_or(&query.language, DEFAULT_LANGUAGE),
        })
        .await
        .map_err(AppError::upstream("Failed to perform search"))?;

    let mut results = titles_only(upstream.results);
    state.images().card().titles(&mut results);

    tracing::debug!(
        query = %search_term,
        results = results.len(),
        "TMDB multi search"
    );

    Ok(Cached::new(
        CachePolicy::TRENDING,
        Paginated {
            page: upstream.page,
            total_pages: upstream.total_pages,
            total_results: results.len() as u32,
            results,
        },
    ))
}

/// Keep only movie and series results.
fn titles_only(results: Vec<Value>) -> Vec<Value> {
    results
        .into_iter()
        .filter(|item| MediaType::of(item).is_some_and(|t| t.is_title()))
        .collect()
}
