//! HTTP surface: search endpoints and router assembly
//!
//! | Method | Path      | Input                             |
//! |--------|-----------|-----------------------------------|
//! | GET    | `/search` | query string, repeated keys       |
//! | POST   | `/search` | JSON [`SearchFilters`] body       |
//! | GET    | `/health` | liveness                          |
//! | GET    | `/ready`  | readiness, pings the store        |

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::request::Parts,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{Error, Result},
    health,
    search::{SearchFilters, SearchResponse},
    state::AppState,
};

/// Search request decoded from the URL query string
///
/// Unlike `axum::extract::Query`, accepts repeated keys for set-valued
/// filters (`?head_pos=NOUN&head_pos=VERB`).
#[derive(Debug, Clone)]
pub struct SearchQuery(pub SearchFilters);

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let query = parts.uri.query().unwrap_or_default();
        SearchFilters::from_query_string(query).map(SearchQuery)
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_get).post(search_post))
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .with_state(state)
}

#[instrument(skip(state))]
async fn search_get(
    State(state): State<AppState>,
    SearchQuery(filters): SearchQuery,
) -> Result<Json<SearchResponse>> {
    run_search(&state, &filters).await
}

#[instrument(skip(state))]
async fn search_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchFilters>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(filters) = payload.map_err(|rejection| Error::ValidationError(rejection.body_text()))?;
    run_search(&state, &filters).await
}

async fn run_search(state: &AppState, filters: &SearchFilters) -> Result<Json<SearchResponse>> {
    match state.search().search(filters).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            // Server-side failures are logged when the error is rendered
            if e.is_client_error() {
                tracing::debug!(error = %e, "Search request rejected");
            }
            Err(e)
        }
    }
}
