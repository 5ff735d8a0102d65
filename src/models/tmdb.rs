use serde::Deserialize;

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw response from TMDB `GET /movie/{id}`
///
/// Every field is optional; the provider substitutes defaults for whatever
/// TMDB leaves out.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Usually a number, but tolerated as anything
    #[serde(default)]
    pub vote_average: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}
