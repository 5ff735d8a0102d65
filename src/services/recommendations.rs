use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::Catalog,
    error::AppResult,
    models::{Rating, Recommendation, Recommendations, YearRange},
    services::providers::MetadataProvider,
};

/// Item-to-item recommendations over the precomputed similarity matrix
///
/// Candidates are every catalog movie, the selected one included, ranked by
/// similarity to the selection. Ties keep catalog order.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog positions paired with their similarity to `index`, best first
    fn ranked_candidates(&self, index: usize) -> Vec<(usize, f32)> {
        let Some(row) = self.catalog.similarity_row(index) else {
            return Vec::new();
        };

        let mut candidates: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
        // sort_by is stable, so equal scores (0.0 and -0.0 included) stay in
        // catalog order. Scores are finite, so partial_cmp never fails.
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        candidates
    }

    /// Recommends up to `limit` movies similar to `selected_title`
    ///
    /// Metadata is fetched serially in ranking order, one candidate at a time,
    /// and only until `limit` candidates have passed the year filter. A
    /// candidate whose fetch fails is skipped and counted in `failed_fetches`.
    pub async fn recommend(
        &self,
        selected_title: &str,
        years: YearRange,
        limit: usize,
        provider: &dyn MetadataProvider,
    ) -> AppResult<Recommendations> {
        let index = self.catalog.resolve(selected_title)?;

        if limit == 0 || years.is_empty() {
            tracing::debug!(
                title = %selected_title,
                limit,
                year_from = %years.from,
                year_to = %years.to,
                "Nothing can match, skipping ranking"
            );
            return Ok(Recommendations::default());
        }

        let start = Instant::now();
        let mut recommendations = Recommendations::default();
        let mut examined = 0;

        for (candidate, score) in self.ranked_candidates(index) {
            if recommendations.results.len() >= limit {
                break;
            }

            let Some(movie) = self.catalog.item_at(candidate) else {
                continue;
            };
            examined += 1;

            let details = match provider.fetch_details(movie.id).await {
                Ok(details) => details,
                Err(e) => {
                    tracing::warn!(
                        movie_id = movie.id,
                        title = %movie.title,
                        provider = provider.name(),
                        error = %e,
                        "Metadata fetch failed, skipping candidate"
                    );
                    recommendations.failed_fetches += 1;
                    continue;
                }
            };

            if !years.contains(details.release_year) {
                continue;
            }

            recommendations.results.push(Recommendation {
                id: movie.id,
                title: movie.title.clone(),
                score,
                poster_url: details.poster_url,
                genres: details.genres,
                overview: details.overview,
                release_year: details.release_year,
                rating: Rating::from_raw(details.rating),
            });
        }

        if recommendations.failed_fetches > 0 {
            tracing::warn!(
                title = %selected_title,
                failed = recommendations.failed_fetches,
                "Partial metadata fetch failure"
            );
        }

        tracing::info!(
            title = %selected_title,
            examined,
            returned = recommendations.results.len(),
            limit,
            duration_ms = start.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        Ok(recommendations)
    }
}
