mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::upload_handler,
        api::search_handler,
        api::reverse_handler,
        api::document_handler,
        api::image_handler,
    ),
    components(schemas(
        types::UploadForm,
        types::ReverseSearchForm,
        types::SearchRequest,
        types::SearchResponse,
        types::SearchHit,
        types::UploadResponse,
        types::UploadedImage,
        crate::indexer::CaptionDocument,
    ))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(api::upload_handler))
        .route("/search", post(api::search_handler))
        .route("/reverse", post(api::reverse_handler))
        .route("/document/{id}", get(api::document_handler))
        .route("/image/{id}", get(api::image_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .with_state(state)
}
