use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    routes::{run_blocking, AppState},
};

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteAdded {
    pub title: String,
    pub added: bool,
}

#[derive(Debug, Serialize)]
pub struct FavoriteRemoved {
    pub title: String,
    pub removed: bool,
}

/// Handler listing favorites in insertion order
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<String>>> {
    let store = state.favorites.clone();
    let favorites = run_blocking(move || store.list()).await?;
    Ok(Json(favorites))
}

/// Handler adding a favorite; 201 when added, 200 when already present
pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FavoriteRequest>,
) -> AppResult<(StatusCode, Json<FavoriteAdded>)> {
    let store = state.favorites.clone();
    let title = request.title;

    let (title, added) = run_blocking(move || {
        let added = store.add(&title)?;
        Ok((title, added))
    })
    .await?;

    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(FavoriteAdded { title, added })))
}

/// Handler removing a favorite; 404 when it was not in the list
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FavoriteRequest>,
) -> AppResult<Json<FavoriteRemoved>> {
    let store = state.favorites.clone();
    let title = request.title;

    let (title, removed) = run_blocking(move || {
        let removed = store.remove(&title)?;
        Ok((title, removed))
    })
    .await?;

    if !removed {
        return Err(AppError::NotFound(format!("'{}' is not in favorites", title)));
    }

    Ok(Json(FavoriteRemoved { title, removed }))
}
