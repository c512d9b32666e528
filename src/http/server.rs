//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared services (scanner, codec, session cache, dispatcher)
//! - Register demo handlers for GET and POST
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and serve until Ctrl+C

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    routing::{on, MethodFilter},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::SessionCache;
use crate::codec::{ImageCodec, StandardCodec};
use crate::config::DemoConfig;
use crate::error::{DemoError, DemoResult};
use crate::input::FieldScanner;
use crate::output::{Dispatcher, RelayClient};

/// Services shared by every request.
pub struct Services {
    pub config: DemoConfig,
    pub scanner: FieldScanner,
    pub codec: Arc<dyn ImageCodec>,
    pub dispatcher: Dispatcher,
    cache: Mutex<SessionCache>,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Services>,
}

impl AppState {
    /// Build state with the `image`-crate codec.
    pub fn new(config: DemoConfig) -> DemoResult<Self> {
        Self::with_codec(config, Arc::new(StandardCodec))
    }

    pub fn with_codec(config: DemoConfig, codec: Arc<dyn ImageCodec>) -> DemoResult<Self> {
        let cache = SessionCache::new(&config.cache.root)?;
        let relay = RelayClient::from_config(&config.relay)?;
        let dispatcher = Dispatcher::new(relay, codec.clone());
        let scanner = FieldScanner::new(config.extraction.max_indexed_fields);

        tracing::info!(
            cache_dir = ?cache.cache_dir(),
            relay_target = %dispatcher.relay().target(),
            "Demo services initialized"
        );

        Ok(Self {
            inner: Arc::new(Services {
                config,
                scanner,
                codec,
                dispatcher,
                cache: Mutex::new(cache),
            }),
        })
    }

    pub fn services(&self) -> &Services {
        &self.inner
    }

    /// Exclusive access to the shared session cache.
    ///
    /// Do not hold the guard across an `.await`. A handler that panicked
    /// while holding it leaves the cache usable: its state is a directory
    /// path, an id and an atomic counter.
    pub fn cache(&self) -> MutexGuard<'_, SessionCache> {
        self.inner
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// HTTP server hosting demo handlers.
pub struct DemoServer {
    router: Router<AppState>,
    state: AppState,
}

impl DemoServer {
    /// Create a new server with the given configuration.
    pub fn new(config: DemoConfig) -> DemoResult<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            router: Router::new(),
            state,
        }
    }

    /// Register `handler` for GET and POST on `route`.
    pub fn listen<H, T>(mut self, route: &str, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        self.router = self
            .router
            .route(route, on(MethodFilter::GET.or(MethodFilter::POST), handler));
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        let config = &self.state.services().config;
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let max_body = config.listener.max_body_bytes;

        self.router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .with_state(self.state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "Demo server starting"
        );

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Demo server stopped");
        Ok(())
    }
}

/// Bind the configured listener address.
pub async fn bind(config: &DemoConfig) -> DemoResult<TcpListener> {
    let addr = &config.listener.bind_address;
    TcpListener::bind(addr)
        .await
        .map_err(|e| DemoError::Server(format!("Cannot bind {}: {}", addr, e)))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
