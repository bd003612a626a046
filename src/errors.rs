use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{Html, IntoResponse},
};
use minijinja::context;
use thiserror::Error;
use url::Url;

use crate::state::create_templates;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error(transparent)]
    Axum(#[from] axum::http::Error),
    #[error(transparent)]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error(transparent)]
    Minijinja(#[from] minijinja::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    UrlParsing(#[from] url::ParseError),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error("Author list service at {url} returned status code {status_code}")]
    Backend { status_code: StatusCode, url: Url },
    #[error("Author list service returned no formats")]
    EmptyResponse,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::trace!("{}", &self);
        let (status, message) = match &self {
            AppError::Reqwest(e) => (StatusCode::BAD_GATEWAY, format!("{}", e)),
            AppError::Backend { .. } | AppError::EmptyResponse | AppError::SerdeJson(_) => {
                (StatusCode::BAD_GATEWAY, format!("{}", &self))
            }
            AppError::UrlParsing(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Url could not be parsed: {}", e),
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", &self)),
        };
        let templates = create_templates("/");
        let html = templates
            .get_template("error.html")
            .and_then(|t| {
                t.render(context! {
                    message,
                    status_code => status.as_u16(),
                    status_reason => status.canonical_reason().unwrap_or_default(),
                })
            })
            .unwrap_or_else(|e| format!("Error page template did not compile: {}", e));
        (status, Html(html)).into_response()
    }
}
