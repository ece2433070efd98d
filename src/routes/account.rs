use axum::{extract::State, http::{HeaderMap, StatusCode}, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AccountUpdate, Credentials, Session},
    routes::{extract::JsonBody, session_from_headers, AppState},
    services::watchlist,
};

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    name: String,
}

fn validate_credentials(credentials: &Credentials) -> AppResult<()> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::InvalidArgument(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

/// Handler for account creation; the returned session belongs to the caller
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> AppResult<(StatusCode, Json<Session>)> {
    validate_credentials(&credentials)?;
    let session = state
        .accounts
        .sign_up(credentials.email.trim(), &credentials.password)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> AppResult<Json<Session>> {
    validate_credentials(&credentials)?;
    let session = state
        .accounts
        .sign_in(credentials.email.trim(), &credentials.password)
        .await?;
    Ok(Json(session))
}

/// Handler for email/password changes
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(update): JsonBody<AccountUpdate>,
) -> AppResult<Json<Session>> {
    let session = session_from_headers(&headers);
    let updated = watchlist::update_account(&state.accounts, session.as_ref(), &update).await?;
    Ok(Json(updated))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    JsonBody(profile): JsonBody<ProfileUpdate>,
) -> AppResult<StatusCode> {
    let session = session_from_headers(&headers);
    watchlist::update_profile(&state.accounts, session.as_ref(), profile.name.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}
