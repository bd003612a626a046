use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use minijinja::context;

use crate::{model::Filters, query::QueryParams, state::GlobalAppState, Result};

/// Element the widget is mounted on in the demo page.
const MOUNT_ID: &str = "#authorlist";

/// Show a page that embeds one widget. Filters given as query parameters
/// are passed on to the widget.
#[tracing::instrument(skip(state))]
pub async fn show(
    Query(filters): Query<Filters>,
    State(state): State<Arc<GlobalAppState>>,
) -> Result<impl IntoResponse> {
    let mut params = QueryParams::from(&filters);
    params.push("id", MOUNT_ID);

    let html = state.templates.get_template("index.html")?.render(context! {
        element_id => MOUNT_ID.trim_start_matches('#'),
        widget_query => params.serialize(),
        version => env!("CARGO_PKG_VERSION"),
    })?;
    Ok(Html(html))
}
