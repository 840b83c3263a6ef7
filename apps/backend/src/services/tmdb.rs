//! TMDB (The Movie Database) service client.
//!
//! Thin bearer-authenticated client over the v3 API. Detail endpoints return
//! the raw JSON document so every upstream field is forwarded; list endpoints
//! decode into [`Paginated`].

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Sub-resources appended to movie and series detail requests.
const TITLE_APPENDS: &str =
    "credits,videos,images,keywords,external_ids,reviews,recommendations,similar";
const SEASON_APPENDS: &str = "credits,videos,images,external_ids";
const PERSON_APPENDS: &str = "combined_credits,images,external_ids";

/// Language requested for trending lists.
const TRENDING_LANGUAGE: &str = "en-US";

/// Errors talking to TMDB. Never shown to API clients.
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("request to TMDB failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("TMDB {path} returned {status}")]
    Status { path: String, status: StatusCode },

    #[error("failed to decode TMDB response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type TmdbResult<T> = std::result::Result<T, TmdbError>;

/// Media type tag used by multi-type TMDB responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Person,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Person => "person",
        }
    }

    /// Read the `media_type` tag of a result item. Unknown tags yield `None`.
    pub fn of(item: &Value) -> Option<Self> {
        match item.get("media_type")?.as_str()? {
            "movie" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Tv),
            "person" => Some(MediaType::Person),
            _ => None,
        }
    }

    /// Whether this is a title (movie or series), as opposed to a person.
    pub fn is_title(&self) -> bool {
        matches!(self, MediaType::Movie | MediaType::Tv)
    }
}

/// Paginated list envelope shared by TMDB and the proxy's list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T = Value> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Paginated<T> {
    /// A single page holding every result.
    pub fn single(results: Vec<T>) -> Self {
        Self {
            page: 1,
            total_pages: 1,
            total_results: results.len() as u32,
            results,
        }
    }
}

/// Parameters of a multi search.
#[derive(Debug, Clone)]
pub struct MultiSearch<'a> {
    pub query: &'a str,
    pub page: &'a str,
    pub include_adult: &'a str,
    pub language: &'a str,
}

/// TMDB API client for fetching movie, TV and person metadata.
pub struct TmdbClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    /// Create a client against the given API root.
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(
        access_token: String,
        base_url: String,
        timeout: Duration,
    ) -> TmdbResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Create a new TMDB client wrapped in Arc for shared access.
    pub fn new_shared(
        access_token: String,
        base_url: String,
        timeout: Duration,
    ) -> TmdbResult<Arc<Self>> {
        Ok(Arc::new(Self::with_base_url(
            access_token,
            base_url,
            timeout,
        )?))
    }

    /// Movie details with credits, media, reviews and related titles appended.
    pub async fn movie_details(&self, id: &str) -> TmdbResult<Value> {
        tracing::debug!(movie_id = %id, "Fetching TMDB movie details");

        self.get(
            &format!("/movie/{}", segment(id)),
            &[("append_to_response", TITLE_APPENDS)],
        )
        .await
    }

    pub async fn popular_movies(&self, page: &str) -> TmdbResult<Paginated> {
        tracing::debug!(page = %page, "Fetching TMDB popular movies");

        self.get("/movie/popular", &[("page", page)]).await
    }

    /// Series details with the same appended sub-resources as movies.
    pub async fn tv_details(&self, id: &str) -> TmdbResult<Value> {
        tracing::debug!(tv_id = %id, "Fetching TMDB series details");

        self.get(
            &format!("/tv/{}", segment(id)),
            &[("append_to_response", TITLE_APPENDS)],
        )
        .await
    }

    /// Season details including episodes.
    pub async fn season_details(&self, tv_id: &str, season_number: &str) -> TmdbResult<Value> {
        tracing::debug!(
            tv_id = %tv_id,
            season = %season_number,
            "Fetching TMDB season details"
        );

        self.get(
            &format!(
                "/tv/{}/season/{}",
                segment(tv_id),
                segment(season_number)
            ),
            &[("append_to_response", SEASON_APPENDS)],
        )
        .await
    }

    pub async fn popular_tv(&self, page: &str) -> TmdbResult<Paginated> {
        tracing::debug!(page = %page, "Fetching TMDB popular series");

        self.get("/tv/popular", &[("page", page)]).await
    }

    /// Trending titles of one media type for `day` or `week`.
    pub async fn trending(
        &self,
        media_type: MediaType,
        time_window: &str,
        page: Option<&str>,
    ) -> TmdbResult<Paginated> {
        tracing::debug!(
            media_type = media_type.as_str(),
            time_window = %time_window,
            page = ?page,
            "Fetching TMDB trending"
        );

        let mut params = vec![("language", TRENDING_LANGUAGE)];
        if let Some(page) = page {
            params.push(("page", page));
        }

        self.get(
            &format!("/trending/{}/{}", media_type.as_str(), segment(time_window)),
            &params,
        )
        .await
    }

    /// Person details with combined credits and images appended.
    pub async fn person_details(&self, id: &str) -> TmdbResult<Value> {
        tracing::debug!(person_id = %id, "Fetching TMDB person details");

        self.get(
            &format!("/person/{}", segment(id)),
            &[("append_to_response", PERSON_APPENDS)],
        )
        .await
    }

    /// Search movies, series and people in one request.
    pub async fn search_multi(&self, search: &MultiSearch<'_>) -> TmdbResult<Paginated> {
        tracing::debug!(query = %search.query, page = %search.page, "Searching TMDB");

        self.get(
            "/search/multi",
            &[
                ("query", search.query),
                ("include_adult", search.include_adult),
                ("language", search.language),
                ("page", search.page),
            ],
        )
        .await
    }

    /// Internal helper to perform authenticated GET requests and deserialize JSON responses.
    async fn get<T>(&self, path: &str, params: &[(&str, &str)]) -> TmdbResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status {
                path: path.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(|source| TmdbError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// Percent-encode a caller-supplied value used as a single path segment.
fn segment(raw: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(raw)
}
