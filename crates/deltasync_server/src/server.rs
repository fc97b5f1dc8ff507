//! The delta server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::history::HistoryRing;
use crate::http::router;
use crate::mutator::Mutator;
use crate::negotiate::{negotiate, DeltaRequest, Negotiated};
use crate::response::DeltaResponse;
use crate::store::VersionedStore;
use axum::http::HeaderMap;
use deltasync_protocol::headers::{A_IM, GET_MODIFIED_SINCE, IF_NONE_MATCH};
use deltasync_protocol::{ProtocolFlavor, Snapshot};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The delta server.
///
/// Owns the current-document store and the history ring, and answers `GET`
/// requests by negotiating between a full document, an unchanged signal and
/// a patch against a version the client already holds.
///
/// # Example
///
/// ```
/// use deltasync_server::{DeltaRequest, DeltaServer, ServerConfig};
///
/// let server = DeltaServer::new(ServerConfig::default());
/// let response = server.handle_request(&DeltaRequest::full()).unwrap();
/// assert_eq!(response.status.as_u16(), 200);
/// ```
#[derive(Debug)]
pub struct DeltaServer {
    config: ServerConfig,
    store: Arc<VersionedStore>,
    history: Arc<HistoryRing>,
}

impl DeltaServer {
    /// Creates a server with an empty store and history.
    pub fn new(config: ServerConfig) -> Self {
        let history = Arc::new(HistoryRing::new(config.max_history));
        Self {
            config,
            store: Arc::new(VersionedStore::new()),
            history,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the negotiation flavor served.
    pub fn flavor(&self) -> ProtocolFlavor {
        self.config.flavor
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<VersionedStore> {
        &self.store
    }

    /// Returns the history ring.
    pub fn history(&self) -> &Arc<HistoryRing> {
        &self.history
    }

    /// Returns the current snapshot.
    pub fn current(&self) -> Snapshot {
        self.store.get()
    }

    /// Negotiates a response to `request` without rendering it.
    pub fn negotiate(&self, request: &DeltaRequest) -> Negotiated {
        negotiate(request, &self.store, &self.history)
    }

    /// Negotiates and renders a response to `request`.
    pub fn handle_request(&self, request: &DeltaRequest) -> ServerResult<DeltaResponse> {
        let outcome = self.negotiate(request);
        debug!(
            flavor = %self.config.flavor,
            outcome = outcome.kind(),
            etag = %outcome.current().stamp,
            "negotiated"
        );
        outcome.render(self.config.flavor)
    }

    /// Extracts the baseline claim from request headers for the served
    /// flavor.
    pub fn request_from_headers(&self, headers: &HeaderMap) -> DeltaRequest {
        match self.config.flavor {
            ProtocolFlavor::Delta => DeltaRequest::from_delta_headers(
                header_values(headers, A_IM),
                header_values(headers, IF_NONE_MATCH),
            ),
            ProtocolFlavor::ModifiedSince => {
                DeltaRequest::from_get_modified_since(header_values(headers, GET_MODIFIED_SINCE).next())
            }
        }
    }

    /// Handles a request given its raw headers.
    pub fn handle_headers(&self, headers: &HeaderMap) -> ServerResult<DeltaResponse> {
        self.handle_request(&self.request_from_headers(headers))
    }

    /// Starts the background mutator on the current runtime.
    ///
    /// The delta flavor publishes a first version immediately; the since
    /// flavor waits one interval.
    pub fn spawn_mutator(&self) -> JoinHandle<()> {
        Mutator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.history),
            self.config.mutate_interval,
        )
        .with_mutate_at_start(self.config.flavor == ProtocolFlavor::Delta)
        .spawn()
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn serve(self: Arc<Self>) -> ServerResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self: Arc<Self>, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            %addr,
            flavor = %self.config.flavor,
            max_history = self.config.max_history,
            interval_ms = self.config.mutate_interval.as_millis() as u64,
            "delta server listening"
        );

        let mutator = self.spawn_mutator();
        let result = axum::serve(listener, router(Arc::clone(&self)))
            .with_graceful_shutdown(shutdown)
            .await;
        mutator.abort();

        info!("delta server stopped");
        result.map_err(Into::into)
    }
}

/// Every value of a header that is valid visible ASCII.
fn header_values<'a>(headers: &'a HeaderMap, name: &'static str) -> impl Iterator<Item = &'a str> {
    headers
        .get_all(name)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
