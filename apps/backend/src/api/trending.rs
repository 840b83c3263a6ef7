//! Combined trending endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde_json::Value;

use super::TrendingQuery;
use crate::error::{AppError, Result};
use crate::response::{CachePolicy, Cached};
use crate::services::images::Reshaper;
use crate::services::tmdb::{MediaType, Paginated};
use crate::AppState;

/// Creates the trending router.
pub fn router() -> Router<AppState> {
    Router::new().route("/all", get(trending_all))
}

/// GET /api/trending/all
///
/// Fetches trending movies and series concurrently and alternates them,
/// movie first. The result is always a single page.
pub async fn trending_all(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Cached<Paginated>> {
    let tmdb = state.tmdb()?;
    let time_window = query.time_window();

    let (movies, series) = tokio::try_join!(
        tmdb.trending(MediaType::Movie, time_window, None),
        tmdb.trending(MediaType::Tv, time_window, None),
    )
    .map_err(AppError::upstream("Failed to fetch trending data"))?;

    let card = state.images().card();
    let movies = tag(movies.results, MediaType::Movie, &card);
    let series = tag(series.results, MediaType::Tv, &card);

    let combined = interleave(movies, series);

    tracing::debug!(
        time_window = %time_window,
        results = combined.len(),
        "Trending movies and series"
    );

    Ok(Cached::new(CachePolicy::TRENDING, Paginated::single(combined)))
}

/// Stamp `media_type` on each result and rewrite its artwork.
fn tag(mut results: Vec<Value>, media_type: MediaType, card: &Reshaper<'_>) -> Vec<Value> {
    for item in &mut results {
        if let Some(obj) = item.as_object_mut() {
            obj.insert(
                "media_type".to_string(),
                Value::String(media_type.as_str().to_string()),
            );
        }
    }
    card.titles(&mut results);
    results
}

/// Round-robin merge: `first[0], second[0], first[1], second[1], ...`.
///
/// Once the shorter list runs out the rest of the longer one follows in order.
pub fn interleave<T>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();

    loop {
        let a = first.next();
        let b = second.next();
        if a.is_none() && b.is_none() {
            break;
        }
        merged.extend(a);
        merged.extend(b);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::images::ImageUrls;
    use serde_json::json;

    #[test]
    fn test_interleave_longer_second() {
        let merged = interleave(vec!["m0", "m1"], vec!["s0", "s1", "s2"]);
        assert_eq!(merged, vec!["m0", "s0", "m1", "s1", "s2"]);
    }

    #[test]
    fn test_interleave_longer_first() {
        let merged = interleave(vec![1, 3, 5, 6], vec![2, 4]);
        assert_eq!(merged, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_interleave_empty_sides() {
        assert_eq!(interleave(Vec::<u8>::new(), vec![1, 2]), vec![1, 2]);
        assert_eq!(interleave(vec![1, 2], Vec::new()), vec![1, 2]);
        assert!(interleave(Vec::<u8>::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_tag_sets_media_type() {
        let images = ImageUrls::new("https://image.tmdb.org/t/p");
        let tagged = tag(
            vec![json!({ "id": 1, "poster_path": "/a.jpg" })],
            MediaType::Tv,
            &images.card(),
        );

        assert_eq!(tagged[0]["media_type"], "tv");
        assert_eq!(tagged[0]["poster_path"], "https://image.tmdb.org/t/p/w185/a.jpg");
        assert!(tagged[0]["backdrop_path"].is_null());
    }
}
