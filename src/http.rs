//! HTTP surface: router assembly and the serve loop.
//!
//! Every endpoint lives on one listener. `/metrics` is mounted only when
//! `server.metrics` is enabled; unknown paths get a JSON 404.

use axum::extract::{DefaultBodyLimit, MatchedPath, Request};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::{self, catalog, login, notify, webhook};
use crate::state::AppState;
use crate::telemetry::RequestTimer;

/// Multipart framing allowance on top of the PDF size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let server = &state.config.server;
    let upload_limit = server.max_upload_bytes + MULTIPART_OVERHEAD;

    let api = Router::new()
        .route(
            "/api/analyze-pdf",
            post(handlers::analyze_pdf).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/line-login",
            post(handlers::line_login).fallback(login::method_not_allowed),
        )
        .route(
            "/api/line-webhook",
            post(handlers::line_webhook).fallback(webhook::acknowledge),
        )
        .route(
            "/api/notify",
            post(handlers::notify).fallback(notify::method_not_allowed),
        )
        .route("/api/conferences", get(catalog::conferences))
        .route("/api/conferences/:id/locations", get(catalog::locations))
        .route(
            "/api/conferences/:id/presentations",
            get(catalog::presentations),
        )
        .route("/api/tags", get(catalog::tags))
        .route("/api/participants", get(catalog::participants))
        .route(
            "/api/presentations/:id/tags",
            put(catalog::set_presentation_tags),
        )
        .route("/healthz", get(healthz));

    let api = if server.metrics {
        api.route("/metrics", get(metrics_handler))
    } else {
        api
    };

    api.route_layer(middleware::from_fn(track_request))
        .fallback(not_found)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` until Ctrl+C or SIGTERM, then drain in-flight requests.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if server.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Record latency and status per matched route.
async fn track_request(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let mut timer = RequestTimer::new(route);
    let response = next.run(request).await;
    timer.finish(response.status().as_u16());
    response
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
