use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Single page UI
        .route("/", get(handlers::index_page))
        .route("/health", get(handlers::health))
        // Generation
        .route("/api/document-types", get(handlers::document_types))
        .route("/api/generate", post(handlers::generate_document))
        .route(
            "/api/documents/{id}/download",
            get(handlers::download_document),
        )
        // Index
        .route("/api/index", get(handlers::index_info))
        .route("/api/index/rebuild", post(handlers::rebuild_index))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(tower_http::cors::Any)
                        .allow_methods(tower_http::cors::Any)
                        .allow_headers(tower_http::cors::Any),
                ),
        )
}
