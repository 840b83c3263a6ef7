//! API endpoint handlers for the Moovi backend.
//!
//! Every handler proxies one or two TMDB requests and reshapes the response
//! before returning it with cache headers.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::services::images::{ImageKind, Reshaper};

pub mod movies;
pub mod person;
pub mod search;
pub mod series;
pub mod trending;

/// Maximum entries kept per `images.*` gallery.
pub const GALLERY_CAP: usize = 10;
/// Maximum entries kept in recommendation and similar-title lists.
pub const RELATED_CAP: usize = 20;

const DEFAULT_PAGE: &str = "1";
const DEFAULT_TIME_WINDOW: &str = "day";

// =============================================================================
// Request Types
// =============================================================================

/// Query parameters for paginated listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number, forwarded verbatim (default: 1).
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> &str {
        param_or(&self.page, DEFAULT_PAGE)
    }
}

/// Query parameters for trending lists.
#[derive(Debug, Default, Deserialize)]
pub struct TrendingQuery {
    /// `day` or `week`, forwarded verbatim (default: day).
    pub time_window: Option<String>,
    /// Page number, only honoured by the series list (default: 1).
    pub page: Option<String>,
}

impl TrendingQuery {
    pub fn time_window(&self) -> &str {
        param_or(&self.time_window, DEFAULT_TIME_WINDOW)
    }

    pub fn page(&self) -> &str {
        param_or(&self.page, DEFAULT_PAGE)
    }
}

/// Value of an optional query parameter, with empty strings treated as absent.
pub(crate) fn param_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

// =============================================================================
// Shared reshaping
// =============================================================================

/// Rewrite images on the `cast` and `crew` arrays of `parent[key]`.
pub(crate) fn reshape_credits(card: &Reshaper<'_>, parent: &mut Map<String, Value>, key: &str) {
    if let Some(Value::Object(credits)) = parent.get_mut(key) {
        card.each_in(credits, "cast");
        card.each_in(credits, "crew");
    }
}

/// Replace `images` with the given galleries built from the upstream collections.
pub(crate) fn reshape_galleries(
    gallery: &Reshaper<'_>,
    obj: &mut Map<String, Value>,
    collections: &[(&str, ImageKind)],
) {
    let raw = obj.remove("images");
    let mut images = Map::new();
    for &(name, kind) in collections {
        let source = raw.as_ref().and_then(|r| r.get(name));
        images.insert(name.to_string(), gallery.gallery(source, kind, GALLERY_CAP));
    }
    obj.insert("images".to_string(), Value::Object(images));
}
