//! Request handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gazette_storage::ContentIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{AppState, DEFAULT_PAGE, DEFAULT_PER_PAGE};

/// Raw query parameters. Kept as strings so malformed values fall back
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ArticlesParams {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Positive integer value of `raw`, or `fallback`.
fn positive_or(raw: Option<&str>, fallback: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(fallback)
}

/// `GET /api/articles`
pub async fn articles(
    State(state): State<AppState>,
    Query(params): Query<ArticlesParams>,
) -> Response {
    let page = positive_or(params.page.as_deref(), DEFAULT_PAGE);
    let per_page = positive_or(params.per_page.as_deref(), DEFAULT_PER_PAGE);
    let query = params.q.unwrap_or_default();

    debug!(page, per_page, query = %query, "articles request");

    let index_path = state.index_path.clone();
    let result = tokio::task::spawn_blocking(move || {
        ContentIndex::read(index_path.as_path())?.query(&query, page, per_page)
    })
    .await;

    match result {
        Ok(Ok(view)) => Json(view).into_response(),
        Ok(Err(e)) => internal_error(e.to_string()),
        Err(e) => internal_error(format!("query task failed: {e}")),
    }
}

fn internal_error(message: String) -> Response {
    error!(error = %message, "articles request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: message })).into_response()
}
