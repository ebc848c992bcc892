use axum::Router;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

pub mod game;
pub mod health;

/// Compose all route trees, wiring in shared state, documentation and static assets.
///
/// Requests that match no route are served from the configured static directory.
pub fn router(state: SharedState) -> Router<()> {
    let static_files = ServeDir::new(state.config().static_dir());

    health::router()
        .merge(game::router())
        .merge(docs_router())
        .fallback_service(static_files)
        .with_state(state)
}

/// Serve the Swagger UI backed by the generated OpenAPI document.
fn docs_router() -> Router<SharedState> {
    SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into()
}
