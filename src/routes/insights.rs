use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::AppResult,
    routes::{extract::JsonBody, AppState},
    services::{insights, providers::perplexity::InsightOutcome},
};

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    title: String,
    #[serde(default)]
    plot: String,
}

/// Handler for AI insights
///
/// Replies `{"configured": true, "text": ..}` or, when no key is set,
/// `{"configured": false, "message": ..}`.
pub async fn insights(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<InsightRequest>,
) -> AppResult<Json<Value>> {
    let outcome = insights::movie_insights(&state.insights, &request.title, &request.plot).await?;
    let body = match outcome {
        InsightOutcome::Generated(text) => json!({ "configured": true, "text": text }),
        InsightOutcome::NotConfigured(message) => {
            json!({ "configured": false, "message": message })
        }
    };
    Ok(Json(body))
}
