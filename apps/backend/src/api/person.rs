//! Person API endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde_json::Value;

use super::{reshape_credits, reshape_galleries};
use crate::error::{AppError, Result};
use crate::response::{CachePolicy, Cached};
use crate::services::images::{ImageKind, ImageUrls};
use crate::AppState;

/// Creates the person router.
pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_person))
}

/// GET /api/person/:id
///
/// Person details with combined movie and TV credits, profile gallery and
/// external ids.
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Cached<Value>> {
    let tmdb = state.tmdb()?;

    let mut person = tmdb
        .person_details(&id)
        .await
        .map_err(AppError::upstream("Failed to fetch person details"))?;

    reshape_person(&mut person, state.images());

    Ok(Cached::new(CachePolicy::DETAIL, person))
}

fn reshape_person(person: &mut Value, images: &ImageUrls) {
    let Some(obj) = person.as_object_mut() else {
        return;
    };
    let card = images.card();

    card.fields(obj, &[ImageKind::Profile]);
    reshape_galleries(&images.gallery(), obj, &[("profiles", ImageKind::Profile)]);
    reshape_credits(&card, obj, "combined_credits");
}
