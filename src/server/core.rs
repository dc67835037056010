use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server::routes::{AppState, router};

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Prepares the storage root and binds the listening socket.
    ///
    /// The root must exist before any request is served, so a failure here
    /// aborts startup.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = Arc::new(AppState::new(config));
        state.storage.ensure_root().await?;

        let addr = state.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind to {}: {}", addr, e);
            ServerError::from(e)
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until the process is stopped.
    ///
    /// Each connection runs on its own task; a failing request never takes
    /// the server down.
    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting transfer server on {} (storage root: {})",
            self.listener.local_addr()?,
            self.state.storage.root().display()
        );

        let app = router(Arc::clone(&self.state));
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}
