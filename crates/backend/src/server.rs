use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::shared::{AppState, Fixtures, RecordedRequest};

/// Stub bound to an ephemeral local port, serving until dropped
pub struct StubServer {
    addr: SocketAddr,
    state: AppState,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(fixtures: Fixtures) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let state = AppState::new(fixtures);
        let app = crate::app(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Stub server on {} stopped: {}", addr, e);
            }
        });
        tracing::info!("Stub server listening on http://{}", addr);

        Ok(Self { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }

    /// Requests received on `path`, oldest first
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
