//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all route groups and handlers
//! - Wire the middleware pipeline per path group: rate limit → auth → proxy
//! - Spawn the background health monitor
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - The pipeline is statically ordered `from_fn` stages, composed per
//!   route group; each stage either short-circuits with a response or
//!   continues with a possibly extended request
//! - Route groups mirror the gateway's public API: /api/users,
//!   /api/products, /api/orders, plus the operator surface under /health

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{optional_auth, require_auth, TokenValidator};
use crate::config::schema::CorsConfig;
use crate::config::GatewayConfig;
use crate::health::{HealthChecker, HealthMonitor};
use crate::http::handlers;
use crate::http::proxy::proxy_handler;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::Shutdown;
use crate::registry::{RegistryError, ServiceRegistry};
use crate::routing::RouteTable;
use crate::security::headers::security_headers;
use crate::security::rate_limit::{
    auth_rate_limit, global_rate_limit, order_rate_limit, RateLimits,
};

/// Application state injected into handlers and middleware stages.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub registry: Arc<ServiceRegistry>,
    pub routes: Arc<RouteTable>,
    pub validator: Arc<TokenValidator>,
    pub limits: Arc<RateLimits>,
    pub health: Arc<HealthChecker>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_timeout: Duration,
    pub started_at: Instant,
}

/// Unrecoverable startup failures. Everything past startup is handled
/// per request.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
}

/// HTTP server for the edge gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    health: Arc<HealthChecker>,
}

impl GatewayServer {
    /// Build the full gateway from validated configuration. Registers
    /// every configured service; duplicates are a startup error.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let registry = Arc::new(ServiceRegistry::new());
        for service in &config.services {
            registry.register(&service.name, &service.url)?;
        }

        let routes = Arc::new(RouteTable::from_services(&config.services));
        let validator = Arc::new(TokenValidator::new(&config.auth));
        let limits = Arc::new(RateLimits::new(&config.rate_limit));
        let health = Arc::new(HealthChecker::new(registry.clone(), &config.health_check));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: Arc::new(config.clone()),
            registry,
            routes,
            validator,
            limits,
            health: health.clone(),
            client,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state)?;

        Ok(Self {
            router,
            config,
            health,
        })
    }

    /// Assemble route groups and the global middleware stack. Layer order
    /// is top-down: tracing and identity outermost, then the global rate
    /// limiter as the last stage before the route groups' own pipelines.
    fn build_router(config: &GatewayConfig, state: AppState) -> Result<Router, StartupError> {
        let cors = cors_layer(&config.cors)?;

        let user_prefix = state
            .routes
            .prefix_for("user")
            .unwrap_or("/api/users")
            .to_string();
        let product_prefix = state
            .routes
            .prefix_for("product")
            .unwrap_or("/api/products")
            .to_string();
        let order_prefix = state
            .routes
            .prefix_for("order")
            .unwrap_or("/api/orders")
            .to_string();

        let router = Router::new()
            .route("/", get(handlers::root_info))
            .route("/health", get(handlers::gateway_health))
            .route("/health/gateway", get(handlers::gateway_health))
            .route("/health/services", get(handlers::services_status))
            .route("/health/services/check", post(handlers::trigger_health_check))
            .route("/health/services/{name}", get(handlers::service_status))
            .nest(&user_prefix, user_routes(state.clone()))
            .nest(&product_prefix, product_routes(state.clone()))
            .nest(&order_prefix, order_routes(state.clone()))
            .fallback(handlers::not_found)
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(cors)
                    .layer(middleware::from_fn(security_headers))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(middleware::from_fn_with_state(state, global_rate_limit))
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes)),
            );

        Ok(router)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway HTTP server starting");

        // Background probe loop; its first tick fires immediately so the
        // registry reflects reality right after startup.
        let monitor = HealthMonitor::new(
            self.health.clone(),
            Duration::from_millis(self.config.health_check.interval_ms),
        );
        let monitor_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            monitor.run(monitor_shutdown).await;
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut serve_shutdown = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = serve_shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// User service group: public auth endpoints (tight rate limit), account
/// management (token required), public profiles (token optional).
fn user_routes(state: AppState) -> Router<AppState> {
    let authentication = Router::new()
        .route("/auth/register", post(proxy_handler))
        .route("/auth/login", post(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit))
        .route("/auth/refresh", post(proxy_handler));

    let account = Router::new()
        .route(
            "/profile",
            get(proxy_handler).put(proxy_handler).delete(proxy_handler),
        )
        .route("/", get(proxy_handler))
        .route("/{id}", put(proxy_handler).delete(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public_profiles = Router::new()
        .route("/{id}", get(proxy_handler))
        .route("/{id}/products", get(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state, optional_auth));

    authentication.merge(account).merge(public_profiles)
}

/// Product service group: the catalog is publicly readable, management
/// requires a token.
fn product_routes(state: AppState) -> Router<AppState> {
    let catalog = Router::new()
        .route("/", get(proxy_handler))
        .route("/search", get(proxy_handler))
        .route("/categories", get(proxy_handler))
        .route("/categories/{id}", get(proxy_handler))
        .route("/category/{category_id}", get(proxy_handler))
        .route("/{id}", get(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let management = Router::new()
        .route("/", post(proxy_handler))
        .route("/{id}", put(proxy_handler).delete(proxy_handler))
        .route("/categories", post(proxy_handler))
        .route("/categories/{id}", put(proxy_handler).delete(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    catalog.merge(management)
}

/// Order service group: everything requires a token; creation additionally
/// passes the order rate limiter, which runs before the auth stage.
fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(proxy_handler).post(proxy_handler))
        .route(
            "/{id}",
            get(proxy_handler).put(proxy_handler).delete(proxy_handler),
        )
        .route("/user/{user_id}", get(proxy_handler))
        .route("/{id}/status", patch(proxy_handler))
        .route("/{id}/cancel", patch(proxy_handler))
        .route("/{id}/items", get(proxy_handler).post(proxy_handler))
        .route("/{id}/items/{item_id}", put(proxy_handler).delete(proxy_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .route_layer(middleware::from_fn_with_state(state, order_rate_limit))
}

fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, StartupError> {
    let origin: HeaderValue = config
        .origin
        .parse()
        .map_err(|_| StartupError::InvalidCorsOrigin(config.origin.clone()))?;

    let mut layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    if config.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    Ok(layer)
}
