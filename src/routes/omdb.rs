use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::{extract::Query, AppState},
    services::{
        catalog,
        providers::omdb::{OmdbSearchHit, OmdbTitle},
    },
};

fn default_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct OmdbSearchQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "default_page")]
    page: u32,
}

#[derive(Debug, Deserialize)]
pub struct OmdbTitleQuery {
    imdb_id: Option<String>,
    title: Option<String>,
}

/// Handler for OMDb title search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OmdbSearchQuery>,
) -> AppResult<Json<Vec<OmdbSearchHit>>> {
    let hits = catalog::omdb_search(&state.omdb, &params.q, params.page).await?;
    Ok(Json(hits))
}

/// Handler for one OMDb record, by `imdb_id` or `title`
pub async fn title(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OmdbTitleQuery>,
) -> AppResult<Json<OmdbTitle>> {
    let record = catalog::omdb_title(
        &state.omdb,
        params.imdb_id.as_deref(),
        params.title.as_deref(),
    )
    .await?;
    Ok(Json(record))
}
