use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    models::Movie,
    routes::AppState,
    services::providers::tmdb::PLACEHOLDER_POSTER_URL,
};

/// Upper bound on the trending sample; each movie costs one metadata fetch
pub const MAX_TRENDING_COUNT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    count: Option<usize>,
}

impl TrendingQuery {
    fn effective_count(&self, default_count: usize) -> usize {
        self.count.unwrap_or(default_count).min(MAX_TRENDING_COUNT)
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingMovie {
    pub id: u64,
    pub title: String,
    pub poster_url: String,
}

/// Handler listing every catalog title in catalog order
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let titles = state
        .engine
        .catalog()
        .titles()
        .map(str::to_string)
        .collect();
    Json(titles)
}

/// Handler returning a random sample of the catalog with posters
///
/// Movies whose metadata cannot be fetched keep the placeholder poster.
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendingQuery>,
) -> Json<Vec<TrendingMovie>> {
    let count = params.effective_count(state.trending_count);

    let sample: Vec<Movie> = {
        let mut rng = rand::thread_rng();
        state
            .engine
            .catalog()
            .sample(count, &mut rng)
            .into_iter()
            .cloned()
            .collect()
    };

    let mut trending = Vec::with_capacity(sample.len());
    for movie in sample {
        let poster_url = match state.metadata_provider.fetch_details(movie.id).await {
            Ok(details) => details.poster_url,
            Err(e) => {
                tracing::warn!(movie_id = movie.id, error = %e, "Poster fetch failed");
                PLACEHOLDER_POSTER_URL.to_string()
            }
        };

        trending.push(TrendingMovie {
            id: movie.id,
            title: movie.title,
            poster_url,
        });
    }

    Json(trending)
}
