//! REST API implementation
//!
//! HTTP front end for the chain watcher commands.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;

use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::monitor::ChainMonitor;

/// HTTP API server
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(monitor: Arc<ChainMonitor>) -> Self {
        Self {
            state: AppState { monitor },
        }
    }

    /// Bind the listening socket
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Serve on a listener returned by [`HttpServer::bind`]
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = create_router(self.state)
            .layer(TraceLayer::new_for_http())
            .layer(cors);

        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::Error::Internal(e.to_string()))?;

        Ok(())
    }
}
