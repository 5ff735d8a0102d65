use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Recommendations, YearBound, YearRange},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
    #[serde(default)]
    pub year_from: YearBound,
    #[serde(default)]
    pub year_to: YearBound,
    /// Negative values are treated as zero
    #[serde(default)]
    pub limit: Option<i64>,
}

impl RecommendationRequest {
    fn effective_limit(&self, default_limit: usize) -> usize {
        match self.limit {
            Some(limit) => usize::try_from(limit).unwrap_or(0),
            None => default_limit,
        }
    }
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendations>> {
    let limit = request.effective_limit(state.default_limit);
    let years = YearRange::new(request.year_from, request.year_to);

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        year_from = %years.from,
        year_to = %years.to,
        limit,
        "Processing recommendation request"
    );

    let recommendations = state
        .engine
        .recommend(&request.title, years, limit, state.metadata_provider.as_ref())
        .await?;

    Ok(Json(recommendations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(limit: Option<i64>) -> RecommendationRequest {
        RecommendationRequest {
            title: "Inception".to_string(),
            year_from: YearBound::Any,
            year_to: YearBound::Any,
            limit,
        }
    }

    #[test]
    fn test_effective_limit() {
        assert_eq!(request(None).effective_limit(10), 10);
        assert_eq!(request(Some(3)).effective_limit(10), 3);
        assert_eq!(request(Some(0)).effective_limit(10), 0);
        assert_eq!(request(Some(-5)).effective_limit(10), 0);
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"title": "Heat", "year_from": "1990", "year_to": "Any"}"#;
        let request: RecommendationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.year_from, YearBound::Year(1990));
        assert_eq!(request.year_to, YearBound::Any);
        assert_eq!(request.limit, None);
    }
}
