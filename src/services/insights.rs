use crate::{
    error::{AppError, AppResult},
    services::providers::perplexity::{InsightOutcome, PerplexityClient},
};

/// Service function for AI insights on a title
///
/// An unconfigured client is not an error; the outcome says so instead.
pub async fn movie_insights(
    client: &PerplexityClient,
    title: &str,
    plot: &str,
) -> AppResult<InsightOutcome> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidArgument(
            "Title cannot be empty".to_string(),
        ));
    }

    client.insights(title, plot.trim()).await
}
