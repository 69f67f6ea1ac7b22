use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use scorecard::periods::period_router;
use scorecard::scorecards::bsc::bsc_router;
use scorecard::scorecards::mpm::mpm_router;
use serde_json::json;

pub(crate) fn with_scorecard_routes(services: Services) -> Router {
    Router::new()
        .merge(period_router(services.periods))
        .merge(bsc_router(services.bsc))
        .merge(mpm_router(services.mpm))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use scorecard::config::ScoringConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(readiness: Arc<AtomicBool>) -> Router {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness,
            metrics: Arc::new(recorder.handle()),
        };
        with_scorecard_routes(Services::in_memory(ScoringConfig::default()))
            .layer(Extension(state))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let readiness = Arc::new(AtomicBool::new(false));
        let app = app(readiness.clone());

        let response = app
            .clone()
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.store(true, Ordering::Release);
        let response = app.oneshot(get_request("/ready")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn scorecard_routes_are_mounted() {
        let app = app(Arc::new(AtomicBool::new(true)));

        let response = app
            .clone()
            .oneshot(get_request("/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_request("/api/v1/periods"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        assert_eq!(&body[..], b"[]");

        let response = app
            .oneshot(get_request("/api/v1/mpm/quarterly-summary"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
