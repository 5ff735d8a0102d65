use serde::{Deserialize, Serialize};

/// A catalog entry. `id` is the TMDB movie id, `title` is the user-facing key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Enriched metadata for one movie, produced per request by a metadata provider.
///
/// `None` for `release_year` or `rating` means the catalog service did not
/// report a usable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub poster_url: String,
    pub genres: Vec<String>,
    pub overview: String,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
}
