// src/health.rs
//
// Hosting platforms probe an HTTP port to decide the process is alive.
// This listener answers them and nothing else.

use axum::{Router, routing::get};
use tracing::info;

async fn health() -> &'static str {
    "OK"
}

fn router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health listener on port {}", port);
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
