//! HTTP server implementation

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use super::handlers::{
    batch_create_handler, create_handler, delete_handler, purge_handler, read_handler,
    stats_handler, AppState,
};

/// Build the application router
pub fn router(store: AppState) -> Router {
    Router::new()
        .route("/datastore/create", post(create_handler))
        .route("/datastore/read", get(read_handler))
        .route("/datastore/delete", delete(delete_handler))
        .route("/datastore/batchCreate", post(batch_create_handler))
        .route("/datastore/purge", post(purge_handler))
        .route("/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Run the web server
pub async fn run_web_server(addr: &str, store: AppState) -> anyhow::Result<()> {
    let app = router(store);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP interface available at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
