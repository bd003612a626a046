pub mod client;
pub mod config;
pub(crate) mod errors;
pub mod fragment;
pub mod model;
pub mod query;
pub mod state;
mod views;
pub mod widget;

use axum::{
    body::{self, Empty, Full},
    extract::Path,
    http::{header, HeaderName, HeaderValue, Method, Response, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use config::CliConfig;
use include_dir::{include_dir, Dir};
use state::GlobalAppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

pub type Result<T> = std::result::Result<T, errors::AppError>;

async fn static_file(Path(path): Path<String>) -> Result<impl IntoResponse> {
    let path = path.trim_start_matches('/');
    let mime_type = mime_guess::from_path(path).first_or_text_plain();

    let response = match STATIC_DIR.get_file(path) {
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(body::boxed(Empty::new()))?,
        Some(file) => Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_str(mime_type.as_ref())?,
            )
            .body(body::boxed(Full::from(file.contents())))?,
    };
    Ok(response)
}

/// Pages on other origins load the widget with htmx, which needs to send its
/// request headers and read the pushed URL fragment.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("hx-push-url")])
}

pub fn app(config: &CliConfig) -> Result<Router> {
    let global_state = Arc::new(GlobalAppState::new(config)?);

    let routes = Router::new()
        .route("/", get(views::index::show))
        .route("/static/*path", get(static_file))
        .nest("/widget", views::widget::create_routes()?)
        .layer(cors_layer())
        .with_state(global_state.clone());

    // Widget instances are only kept while they are in use
    let cleanup_interval = std::time::Duration::from_secs(60);
    tokio::task::spawn(async move {
        loop {
            tokio::time::sleep(cleanup_interval).await;
            global_state.cleanup().await;
        }
    });

    Ok(routes)
}
