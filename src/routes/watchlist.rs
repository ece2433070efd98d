use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Watchlist, WatchlistItem},
    routes::{
        extract::{JsonBody, Path},
        session_from_headers, AppState,
    },
    services::watchlist,
};

/// Handler for the caller's watchlist
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<Watchlist>> {
    let session = session_from_headers(&headers);
    let items = watchlist::get_watchlist(&state.accounts, session.as_ref()).await?;
    Ok(Json(items))
}

/// Handler that stores a title under `id`, replacing any previous entry
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    JsonBody(item): JsonBody<WatchlistItem>,
) -> AppResult<StatusCode> {
    let session = session_from_headers(&headers);
    watchlist::add_to_watchlist(&state.accounts, session.as_ref(), &id, &item).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let session = session_from_headers(&headers);
    watchlist::remove_from_watchlist(&state.accounts, session.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_watchlist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let session = session_from_headers(&headers);
    watchlist::clear_watchlist(&state.accounts, session.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
