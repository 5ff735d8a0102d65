use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// JSON list of catalog movies (`[{"id": .., "title": ..}]`)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// JSON similarity matrix, one array per catalog row
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Plain-text favorites file, one title per line
    #[serde(default = "default_favorites_path")]
    pub favorites_path: String,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with TMDB `poster_path` values
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Per-request timeout for TMDB calls
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Redis connection URL; metadata caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Number of recommendations returned when the request has no limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Number of movies in the trending sample
    #[serde(default = "default_trending_count")]
    pub trending_count: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/movies.json".to_string()
}

fn default_similarity_path() -> String {
    "data/similarity.json".to_string()
}

fn default_favorites_path() -> String {
    "favorites.txt".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500/".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    10
}

fn default_limit() -> usize {
    10
}

fn default_trending_count() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
