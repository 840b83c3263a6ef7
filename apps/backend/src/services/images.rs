//! Image path reshaping.
//!
//! TMDB returns images as relative paths (`/abc123.jpg`). Every response the
//! proxy serves rewrites them into absolute CDN URLs carrying a size bucket,
//! `https://image.tmdb.org/t/p/w185/abc123.jpg`. Which bucket is used depends
//! on the kind of image and on a [`SizeTable`] chosen per endpoint.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::ImagesConfig;

/// Size bucket understood by the TMDB image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W45,
    W92,
    W154,
    W185,
    W300,
    W342,
    W500,
    W780,
    W1280,
    H632,
    Original,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W45 => "w45",
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W300 => "w300",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::H632 => "h632",
            ImageSize::Original => "original",
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an image path depicts. Determines which column of a [`SizeTable`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Poster,
    Backdrop,
    Profile,
    Still,
    Logo,
}

impl ImageKind {
    /// All kinds, in the order their fields are rewritten.
    pub const ALL: [ImageKind; 5] = [
        ImageKind::Poster,
        ImageKind::Backdrop,
        ImageKind::Profile,
        ImageKind::Still,
        ImageKind::Logo,
    ];

    /// The JSON field TMDB uses for this kind on media objects.
    pub fn field(&self) -> &'static str {
        match self {
            ImageKind::Poster => "poster_path",
            ImageKind::Backdrop => "backdrop_path",
            ImageKind::Profile => "profile_path",
            ImageKind::Still => "still_path",
            ImageKind::Logo => "logo_path",
        }
    }
}

/// One size per image kind.
///
/// Fields left out of a configured table take the card sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default = "SizeTable::card")]
pub struct SizeTable {
    pub poster: ImageSize,
    pub backdrop: ImageSize,
    pub profile: ImageSize,
    pub still: ImageSize,
    pub logo: ImageSize,
}

impl SizeTable {
    /// Large artwork for paginated popular listings.
    pub fn listing() -> Self {
        Self {
            poster: ImageSize::W500,
            backdrop: ImageSize::W1280,
            ..Self::card()
        }
    }

    /// Small artwork for cards and detail headers.
    pub fn card() -> Self {
        Self {
            poster: ImageSize::W185,
            backdrop: ImageSize::W780,
            profile: ImageSize::W185,
            still: ImageSize::W300,
            logo: ImageSize::W92,
        }
    }

    /// Thumbnails for image galleries.
    pub fn gallery() -> Self {
        Self {
            backdrop: ImageSize::W300,
            ..Self::card()
        }
    }

    pub fn size_for(&self, kind: ImageKind) -> ImageSize {
        match kind {
            ImageKind::Poster => self.poster,
            ImageKind::Backdrop => self.backdrop,
            ImageKind::Profile => self.profile,
            ImageKind::Still => self.still,
            ImageKind::Logo => self.logo,
        }
    }
}

/// Builds absolute image URLs and hands out reshapers for each size table.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
    listing: SizeTable,
    card: SizeTable,
    gallery: SizeTable,
}

impl ImageUrls {
    /// Create with the given CDN base URL and the built-in size tables.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(&ImagesConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &ImagesConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            listing: config.listing,
            card: config.card,
            gallery: config.gallery,
        }
    }

    /// Absolute URL for a relative image path.
    pub fn url(&self, size: ImageSize, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            size,
            path.trim_start_matches('/')
        )
    }

    pub fn listing(&self) -> Reshaper<'_> {
        self.with(self.listing)
    }

    pub fn card(&self) -> Reshaper<'_> {
        self.with(self.card)
    }

    pub fn gallery(&self) -> Reshaper<'_> {
        self.with(self.gallery)
    }

    pub fn with(&self, sizes: SizeTable) -> Reshaper<'_> {
        Reshaper { urls: self, sizes }
    }
}

/// Rewrites image fields in upstream JSON using one size table.
#[derive(Debug, Clone, Copy)]
pub struct Reshaper<'a> {
    urls: &'a ImageUrls,
    sizes: SizeTable,
}

impl Reshaper<'_> {
    /// Map a raw path value to its absolute URL.
    ///
    /// Anything other than a non-empty string (null, missing, numbers) maps to `null`.
    pub fn path(&self, kind: ImageKind, raw: Option<&Value>) -> Value {
        match raw.and_then(Value::as_str) {
            Some(path) if !path.is_empty() => {
                Value::String(self.urls.url(self.sizes.size_for(kind), path))
            }
            _ => Value::Null,
        }
    }

    /// Rewrite every image field already present on a JSON object.
    ///
    /// Non-objects are left untouched.
    pub fn object(&self, value: &mut Value) {
        let Some(obj) = value.as_object_mut() else {
            return;
        };
        for kind in ImageKind::ALL {
            if let Some(slot) = obj.get_mut(kind.field()) {
                let reshaped = self.path(kind, Some(&*slot));
                *slot = reshaped;
            }
        }
    }

    /// Rewrite the given kinds on an object, inserting `null` where the field is absent.
    pub fn fields(&self, obj: &mut Map<String, Value>, kinds: &[ImageKind]) {
        for &kind in kinds {
            let value = self.path(kind, obj.get(kind.field()));
            obj.insert(kind.field().to_string(), value);
        }
    }

    /// Rewrite image fields on each element of an array.
    pub fn each(&self, items: &mut [Value]) {
        for item in items {
            self.object(item);
        }
    }

    /// Rewrite poster and backdrop on each title, inserting `null` where absent.
    pub fn titles(&self, items: &mut [Value]) {
        for item in items {
            if let Some(obj) = item.as_object_mut() {
                self.fields(obj, &[ImageKind::Poster, ImageKind::Backdrop]);
            }
        }
    }

    /// Rewrite image fields on each element of `parent[key]`, if it is an array.
    pub fn each_in(&self, parent: &mut Map<String, Value>, key: &str) {
        if let Some(Value::Array(items)) = parent.get_mut(key) {
            self.each(items);
        }
    }

    /// Truncate a nested `{ results: [...] }` list to `cap` and rewrite its items.
    pub fn results_in(&self, parent: &mut Map<String, Value>, key: &str, cap: usize) {
        let Some(Value::Object(list)) = parent.get_mut(key) else {
            return;
        };
        if let Some(Value::Array(results)) = list.get_mut("results") {
            results.truncate(cap);
            self.each(results);
        }
    }

    /// Take a gallery collection, keep at most `cap` entries, and rewrite each `file_path`.
    ///
    /// A missing or malformed collection yields an empty array.
    pub fn gallery(&self, raw: Option<&Value>, kind: ImageKind, cap: usize) -> Value {
        let entries = raw
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .take(cap)
                    .map(|item| {
                        let mut item = item.clone();
                        if let Some(obj) = item.as_object_mut() {
                            let file_path = self.path(kind, obj.get("file_path"));
                            obj.insert("file_path".to_string(), file_path);
                        }
                        item
                    })
                    .collect()
            })
            .unwrap_or_default();
        Value::Array(entries)
    }
}
