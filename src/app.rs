use std::net::SocketAddr;

use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, middleware::require_session};
use crate::state::AppState;

async fn index() -> Json<Value> {
    Json(json!({ "message": "Bienvenue" }))
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .route("/api/v1/status", get(status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
        // `/` can't be expressed as an exclusion pattern; keep it outside the gate
        .route("/", get(index))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
