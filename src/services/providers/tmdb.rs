//! TMDB metadata provider
//!
//! API Flow:
//! 1. Details: /movie/{id}?api_key=..&language=en-US → poster path, genres,
//!    overview, release date, vote average
//!
//! Responses are cached in Redis when a cache is configured.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MovieDetails, TmdbMovie},
    services::providers::MetadataProvider,
};
use chrono::{Datelike, NaiveDate};
use reqwest::Client as HttpClient;
use std::time::Duration;

const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const LANGUAGE: &str = "en-US";

pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/500x750?text=No+Image";
pub const NO_OVERVIEW: &str = "No overview available";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(
        cache: Option<Cache>,
        api_key: String,
        api_url: String,
        image_base_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base_url,
            cache,
        })
    }

    /// Fetch movie details straight from TMDB
    async fn fetch_from_api(&self, movie_id: u64) -> AppResult<MovieDetails> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let movie: TmdbMovie = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(movie_id, error = %e, "Failed to deserialize TMDB response");
            AppError::MetadataFetch {
                movie_id,
                reason: format!("Failed to parse TMDB response: {}", e),
            }
        })?;

        let details = self.convert_api_response(movie);

        tracing::debug!(
            movie_id,
            release_year = ?details.release_year,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(details)
    }

    /// Convert a raw TMDB response into display-ready details
    fn convert_api_response(&self, movie: TmdbMovie) -> MovieDetails {
        let poster_url = match movie.poster_path.as_deref() {
            Some(path) if !path.trim().is_empty() => format!(
                "{}/{}",
                self.image_base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => PLACEHOLDER_POSTER_URL.to_string(),
        };

        let overview = movie
            .overview
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| NO_OVERVIEW.to_string());

        MovieDetails {
            poster_url,
            genres: movie.genres.into_iter().map(|g| g.name).collect(),
            overview,
            release_year: movie.release_date.as_deref().and_then(parse_release_year),
            rating: movie.vote_average.as_ref().and_then(parse_rating),
        }
    }
}

/// Year of a TMDB release date (`YYYY-MM-DD`), or a bare leading year
fn parse_release_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }

    let year = date.split('-').next()?;
    if year.len() == 4 {
        year.parse().ok()
    } else {
        None
    }
}

/// A numeric rating, accepting numbers and numeric strings
fn parse_rating(value: &serde_json::Value) -> Option<f64> {
    let rating = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    rating.is_finite().then_some(rating)
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_details(&self, movie_id: u64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            self.fetch_from_api(movie_id)
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
