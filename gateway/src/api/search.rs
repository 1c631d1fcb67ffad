use crate::AppState;
use crate::auth::AuthUser;
use crate::errors::Result;
use axum::Json;
use axum::extract::State;
use marketplace::client::SearchFilters;
use marketplace::{FormattedProject, enrich, shape};
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct SearchRequest {
    query: Option<String>,
    #[serde(alias = "minPrice")]
    min_price: Option<f64>,
    #[serde(alias = "maxPrice")]
    max_price: Option<f64>,
    project_type: Option<String>,
}

/// Proxy a search to the marketplace and return enriched, shaped projects.
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<FormattedProject>>> {
    let filters = SearchFilters {
        query: request.query.map(|q| q.trim().to_string()),
        min_price: request.min_price,
        max_price: request.max_price,
        project_type: request.project_type,
    };

    let projects = state.marketplace.search(&filters).await?;
    tracing::debug!(user = %user.email, results = projects.len(), "search completed");

    let clients = enrich(&state.marketplace, &projects).await;
    Ok(Json(shape(&projects, &clients)))
}
