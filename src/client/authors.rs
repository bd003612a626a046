use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    errors::AppError,
    model::{AuthorsResponse, Filters},
    query::QueryParams,
    state::GlobalAppState,
    Result,
};

/// Fetch the author list for the given filters from the author list service.
pub async fn fetch(filters: &Filters, state: &GlobalAppState) -> Result<AuthorsResponse> {
    let mut url = state.service_url.join("api/authors")?;
    let query = QueryParams::from(filters).serialize();
    if !query.is_empty() {
        url.set_query(Some(&query));
    }
    debug!(%url, "Requesting author list");

    let response = state.client.get(url).send().await?;
    if response.status().is_success() {
        let body: Map<String, Value> = response.json().await?;
        AuthorsResponse::from_map(body)
    } else {
        Err(AppError::Backend {
            status_code: response.status(),
            url: response.url().clone(),
        })
    }
}
