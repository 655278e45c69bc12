//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, headers)
//! - Own the shared state: live config, blog cache, rate limiter
//! - Run background tasks (limiter sweep, config updates) until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::handler::Handler;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::blog::{BlogCache, BlogResult, PostSource, Revalidator, RssFeedSource};
use crate::config::SiteConfig;
use crate::http::response::method_not_allowed;
use crate::http::{blog_sync, forms, telemetry};
use crate::security::{headers, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current configuration; swapped on reload.
    pub config: Arc<ArcSwap<SiteConfig>>,
    pub blog: Arc<BlogCache>,
    pub limiter: Arc<RateLimiter>,
    pub revalidator: Arc<Revalidator>,
}

impl AppState {
    pub fn config(&self) -> Arc<SiteConfig> {
        self.config.load_full()
    }
}

/// HTTP server for the site API.
pub struct SiteServer {
    router: Router,
    state: AppState,
    config: SiteConfig,
}

impl SiteServer {
    /// Create a server reading posts from the configured RSS feed.
    pub fn new(config: SiteConfig) -> BlogResult<Self> {
        let source = RssFeedSource::new(config.blog.feed_url.clone(), config.blog.fetch_timeout())?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create a server with an explicit post source.
    pub fn with_source(config: SiteConfig, source: Arc<dyn PostSource>) -> Self {
        let blog = Arc::new(BlogCache::new(
            source,
            config.blog.ttl(),
            config.blog.fetch_timeout(),
        ));
        let revalidator = Arc::new(Revalidator::new(
            config.blog.revalidate_webhook.clone(),
            config.blog.revalidate_paths.clone(),
        ));

        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(config.clone())),
            blog,
            limiter: Arc::new(RateLimiter::new()),
            revalidator,
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/healthz", get(health))
            .route(
                "/api/blog/sync",
                get(blog_sync::sync_status)
                    .post(blog_sync::sync_refresh)
                    .delete(blog_sync::sync_clear),
            )
            .route("/api/blog/posts", get(blog_sync::list_posts))
            .route("/api/contact", form_route(forms::submit_contact))
            .route("/api/home-value", form_route(forms::submit_home_value))
            .route("/api/search", form_route(forms::submit_search))
            .route("/api/csrf-token", get(forms::issue_csrf_token))
            .route("/api/web-vitals", post(telemetry::report_web_vitals))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        if config.security.enable_headers {
            headers::apply(router)
        } else {
            router
        }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Startup configuration.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Serve until `shutdown` fires. Configs received on `config_updates`
    /// replace the live configuration.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SiteConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweep_interval = Duration::from_secs(self.config.rate_limits.sweep_interval_secs.max(1));
        tokio::spawn(
            self.state
                .limiter
                .clone()
                .run_sweeper(sweep_interval, shutdown.resubscribe()),
        );

        let live_config = self.state.config.clone();
        let mut updates_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => {
                            live_config.store(Arc::new(new_config));
                            tracing::info!("Live configuration updated");
                        }
                        None => break,
                    },
                    _ = updates_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// POST handler plus JSON 405s for the other methods.
fn form_route<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    post(handler)
        .get(method_not_allowed)
        .put(method_not_allowed)
        .delete(method_not_allowed)
}

#[derive(Serialize)]
struct SystemStatus {
    version: &'static str,
    status: &'static str,
}

async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
