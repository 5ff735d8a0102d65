//! Movie recommendations from a precomputed similarity matrix, enriched with
//! TMDB metadata, plus a file-backed favorites list.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
