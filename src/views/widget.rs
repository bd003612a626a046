use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use minijinja::context;
use percent_encoding::{utf8_percent_encode, CONTROLS};
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    client,
    model::Filters,
    state::GlobalAppState,
    widget::{self, AuthorList, FetchState, COLLAB_OPTIONS},
    Result,
};

pub fn create_routes() -> Result<Router<Arc<GlobalAppState>>> {
    let result = Router::new().route("/", get(mount).post(submit));
    Ok(result)
}

#[derive(Deserialize, Debug)]
struct MountParams {
    id: String,
    #[serde(default)]
    hash: String,
    #[serde(flatten)]
    filters: Filters,
}

#[derive(Deserialize, Debug)]
struct SubmitParams {
    instance: String,
    id: String,
    #[serde(flatten)]
    filters: Filters,
}

/// The element id without the leading `#`, or `None` if the id is invalid.
fn element_id(id: &str) -> Option<&str> {
    let element_id = id.strip_prefix('#').filter(|i| !i.is_empty());
    if element_id.is_none() {
        error!("bad id: {}", id);
    }
    element_id
}

fn render(
    state: &GlobalAppState,
    element_id: &str,
    instance: &str,
    widget: &AuthorList,
) -> Result<String> {
    let error_message = match widget.state() {
        FetchState::Failed { message } => Some(message.as_str()),
        _ => None,
    };
    let html = state.templates.get_template("widget.html")?.render(context! {
        element_id,
        instance,
        filters => widget.filters(),
        tag => widget.tag(),
        payload => widget.active_payload(),
        acknowledgements => widget.acknowledgements_text(),
        error_message,
        collab_options => COLLAB_OPTIONS,
        formatting_options => widget.formatting_options(),
    })?;
    Ok(html)
}

/// Load the initial author list and render a new widget instance.
#[tracing::instrument(skip(state))]
async fn mount(
    State(state): State<Arc<GlobalAppState>>,
    Query(params): Query<MountParams>,
) -> Result<Response> {
    let Some(element_id) = element_id(&params.id) else {
        return Ok(Html(String::new()).into_response());
    };

    let (filters, tag) =
        widget::initial_filters(&state.default_formatting, &params.filters, &params.hash);
    let response = client::authors::fetch(&filters, &state).await?;
    let widget = AuthorList::new(response, tag);
    let instance = state.register(widget.clone());

    let html = render(&state, element_id, &instance, &widget)?;
    Ok(Html(html).into_response())
}

/// Query the author list for the submitted filters and re-render the widget.
///
/// On success, the new URL fragment is sent in the `HX-Push-Url` header.
#[tracing::instrument(skip(state))]
async fn submit(
    State(state): State<Arc<GlobalAppState>>,
    Form(params): Form<SubmitParams>,
) -> Result<Response> {
    let Some(element_id) = element_id(&params.id) else {
        return Ok(Html(String::new()).into_response());
    };

    let submission = state.instances.get_mut(&params.instance).map(|mut i| {
        i.touch();
        i.widget.begin_submit(params.filters.clone())
    });

    let (instance, widget) = if let Some(submission) = submission {
        let result = client::authors::fetch(&submission.filters, &state).await;
        // The instance might have been cleaned up while waiting for the service
        match state.instances.get_mut(&params.instance) {
            Some(mut i) => {
                i.widget.finish_submit(submission.token, result);
                (params.instance.clone(), i.widget.clone())
            }
            None => {
                let widget = AuthorList::new(result?, None);
                (state.register(widget.clone()), widget)
            }
        }
    } else {
        info!(
            instance = %params.instance,
            "Unknown widget instance, mounting a new one"
        );
        let response = client::authors::fetch(&params.filters, &state).await?;
        let widget = AuthorList::new(response, None);
        (state.register(widget.clone()), widget)
    };

    let html = render(&state, element_id, &instance, &widget)?;
    let mut response = Html(html).into_response();
    if widget.state() == &FetchState::Idle {
        let location = format!("#{}", widget.location_hash());
        let location = utf8_percent_encode(&location, CONTROLS).to_string();
        response
            .headers_mut()
            .insert("HX-Push-Url", HeaderValue::from_str(&location)?);
    }
    Ok(response)
}
