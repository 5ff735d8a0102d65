//! Movie metadata provider abstraction
//!
//! The recommendation engine only needs one operation from the outside world:
//! enriching a catalog id with poster, genres, overview, year and rating.
//! Providers own transport, parsing, caching and timeouts.

use crate::{error::AppResult, models::MovieDetails};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch enriched metadata for a catalog movie id
    ///
    /// Errors are per-movie: callers decide whether one failure matters.
    async fn fetch_details(&self, movie_id: u64) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
